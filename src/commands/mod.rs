//! Command-line workflows. Each command builds on the library core and
//! prints a short status line.

pub mod config;
mod install;
mod list;
mod manage;
mod paths;
mod progress;
mod releases;

pub use config::{Config, Options};
pub use install::{InstallArgs, install};
pub use list::list;
pub use manage::{delete, launch, open, rename};
pub use paths::default_root;
pub use progress::ProgressObserver;
pub use releases::{changelog, releases};
