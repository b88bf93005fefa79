pub mod empresa;
pub mod gerencia;
pub mod hecho;
pub mod objetivo;
pub mod usuario;
pub mod variable;

pub use empresa::Empresa;
pub use gerencia::{EmpresaGerencia, Gerencia};
pub use hecho::Hecho;
pub use objetivo::Objetivo;
pub use usuario::Usuario;
pub use variable::Variable;
