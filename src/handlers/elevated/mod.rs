// handlers/elevated/mod.rs - Administrative handlers (admin session required)
//
// Route Prefix: /api/admin/*
// Middleware: require_session → require_admin → validate_user
//
// Catalog maintenance (companies, gerencias, variables), targets, and user accounts.

pub mod catalog;
pub mod hechos;
pub mod objetivos;
pub mod usuarios;
