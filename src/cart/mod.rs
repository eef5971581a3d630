// Cart lines and the priced cart view

pub mod aggregator;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use aggregator::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
