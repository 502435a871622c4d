pub mod archive;
pub mod cleanup;
pub mod commands;
pub mod download;
pub mod error;
pub mod http;
pub mod install;
pub mod launcher;
pub mod runtime;
pub mod source;
pub mod store;

pub use error::LauncherError;
