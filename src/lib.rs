pub mod build;
pub mod checkin;
pub mod cli;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod locator;
pub mod logging;
pub mod rewriter;
pub mod scm;
pub mod text;
pub mod ui;
pub mod version;
pub mod warning;

pub use error::{Result, StampError};
