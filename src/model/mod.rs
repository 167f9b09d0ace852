pub mod chord;
pub mod config;
pub mod timeline;
