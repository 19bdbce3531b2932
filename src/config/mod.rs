//! Configuration module

mod site;

pub use site::BuildConfig;
pub use site::PublishConfig;
pub use site::SiteConfig;
pub use site::StepConfig;
pub use site::CONFIG_FILE;
