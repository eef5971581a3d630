// Business calendar and delivery commitment

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use scheduler::*;
pub use service::*;
