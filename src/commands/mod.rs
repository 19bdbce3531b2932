//! Command implementations

pub mod build;
pub mod check;
pub mod clean;
pub mod deploy;
pub mod digest;
pub mod init;
pub mod list;
pub mod new;
pub mod publish;
