//! Helper functions for templates and content
//!
//! Date formatting, HTML escaping and URL building shared by the
//! markdown transformer, the page templates and the CLI.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
