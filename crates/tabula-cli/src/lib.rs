//! Library parts of the `tabula` command: configuration, logging and the
//! JSON-file collaborators.

pub mod config;
pub mod files;
pub mod logging;
