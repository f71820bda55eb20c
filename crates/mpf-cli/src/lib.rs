//! MPF command-line driver
//!
//! Loads a page document against a schema registry and prints what the page
//! would show or submit.
//!
//! - [`config`]: TOML configuration and registry selection
//! - [`page`]: form tree plus change ledger, bootstrapped together
//! - [`output`]: text/JSON for each subcommand

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod output;
pub mod page;

pub use config::{CliConfig, RegistrySettings};
pub use page::{Page, PagePayload};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
