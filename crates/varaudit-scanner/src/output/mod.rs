//! Output formatters for audit reports

pub mod json;
pub mod markdown;
pub mod text;

pub use json::to_json;
pub use markdown::to_markdown;
pub use text::to_text;
