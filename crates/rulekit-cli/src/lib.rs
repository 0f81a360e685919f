//! Library side of `rkcli`: a stylesheet grammar built with rulekit and
//! helpers for presenting its output.

pub mod json;
pub mod stylesheet;

pub use json::to_json;
pub use stylesheet::{StylesheetParser, StylesheetStats};
