pub mod cache;
pub mod handlers;
pub mod parser;

pub use cache::LogCache;
pub use parser::{DiagnosticKind, ParseDiagnostic, ParsedLog};
