// handlers/protected/mod.rs - Protected handlers (valid session required)
//
// Route Prefix: /api/*
// Middleware: require_session → validate_user
//
// Non-admin sessions only ever see their own company; see services::scope.

pub mod catalog;
pub mod empresas;
pub mod hechos;
pub mod objetivos;
pub mod session;
