pub mod db;
pub mod option;

pub use db::{DbCommands, DbSubcommands};
pub use option::{OptionCommands, OptionSubcommands, ValueArgs};
