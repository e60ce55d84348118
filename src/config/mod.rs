//! Configuration module

mod site;

pub use site::AssetPolicy;
pub use site::SiteConfig;
