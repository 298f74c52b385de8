pub mod handlers;
pub mod jwt;
pub mod store;

pub use jwt::{AuthUser, TokenService};
pub use store::{CredentialStore, MemoryCredentialStore};
