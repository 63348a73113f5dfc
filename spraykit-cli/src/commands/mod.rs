//! CLI subcommands.

pub mod common;
pub mod config;
pub mod encode;
pub mod formats;
pub mod size;
