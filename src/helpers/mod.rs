//! Helper functions shared by the loader, the collection and the commands

mod date;
mod url;

pub use date::*;
pub use url::*;
