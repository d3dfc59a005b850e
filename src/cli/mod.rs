//! Command line interface

pub mod cluster;
pub mod commands;
pub mod display;
pub mod session;

pub use self::commands::{CliArgs, ClusterCommands, Commands, GlobalArgs};
pub use self::session::Session;
