//! Command implementations that need more than the engine services.

pub mod init;
