mod command;

pub mod commands;

pub use command::*;
