//! Library side of the `betbalance` binary: command implementations and file loading.

pub mod commands;
pub mod io;
