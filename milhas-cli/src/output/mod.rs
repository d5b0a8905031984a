//! Output formatting (text and JSON).

mod json;
mod text;

#[cfg(test)]
mod tests;

pub use json::JsonFormatter;
pub use text::TextFormatter;
