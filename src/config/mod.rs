//! Configuration module

mod site;

pub use site::ArchiveConfig;
pub use site::MarkdownConfig;
pub use site::ServerConfig;
