pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, parser_from_path, ConfigError};
pub use schema::{Metadata, ParserSection, SitterConfig, ValidationError, ValidationIssue};
