pub mod request_id;
pub mod response;
pub mod session;

pub use request_id::request_id_middleware;
pub use response::{ApiResponse, ApiResult};
pub use session::{require_admin_middleware, require_session_middleware, validate_user_middleware};
