// Catalog read boundary
// Catalog CRUD lives in another service; the engine only looks entities up by id

pub mod models;
pub mod repository;

pub use models::*;
pub use repository::*;
