//! CLI command implementations

pub mod check;
pub mod export;
pub mod list;
pub mod new;
pub mod show;
