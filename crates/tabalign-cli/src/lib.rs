//! Library components of the `tabalign` command-line tool.

pub mod logging;
pub mod options;
