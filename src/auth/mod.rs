// Authentication boundary
// Verifies JWT bearer tokens issued by the account service; no sessions are created here

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use models::Role;
pub use token::{Claims, TokenService};
