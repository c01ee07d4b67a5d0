pub mod command;

pub use command::{
    BindingInfo, Command, DesktopInfo, Direction, PromptInfo, Response, StateInfo,
};

/// Named pipe the daemon listens on.
pub const PIPE_NAME: &str = r"\\.\pipe\heya";
