pub mod compliance;
pub mod empresas;
pub mod gerencias;
pub mod hechos;
pub mod matrix;
pub mod objetivos;
pub mod scope;
pub mod usuarios;
pub mod validate;
pub mod variables;
