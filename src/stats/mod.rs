pub mod aggregate;
pub mod handlers;
