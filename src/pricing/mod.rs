// Region-scoped pricing
// Price matrix lookups, component assembly and price arithmetic

pub mod assembler;
pub mod calculator;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod resolver;

pub use assembler::*;
pub use calculator::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use resolver::*;
