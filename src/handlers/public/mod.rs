// handlers/public/mod.rs - Public handlers (no session required)
//
// Service discovery, liveness, and session acquisition/release.

pub mod auth;
pub mod system;
