pub mod action;
pub mod command;

pub use action::{Action, NotifyLevel};
pub use command::{parse_command, Command, ExportTarget};
