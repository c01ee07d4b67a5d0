use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Workspace switching
    Switch { name: String },
    ShiftSwitch { name: String },
    SwitchLast,
    ShiftSwitchLast,
    SwitchAdjacent { direction: Direction },
    ShiftSwitchAdjacent { direction: Direction },
    SwitchPrompt,
    ShiftSwitchPrompt,

    // Desktop operations
    Rename { name: String },
    MoveDesktop { index: usize },
    SetWallpaper { path: String },

    // Prompt
    PromptAnswer { name: String },
    PromptCancel,

    // Keybinding operations
    Bind { key: String, action: Box<Command> },
    Unbind { key: String },
    ListBindings,

    // Settings
    SetNotificationDuration { ms: u64 },
    SetPromptCommand { command: Option<String> },

    // Queries
    ListDesktops,
    GetState,

    // Control
    Quit,
}

impl Command {
    /// Render the command the way it is typed on the command line.
    pub fn describe(&self) -> String {
        match self {
            Command::Switch { name } => format!("switch {}", name),
            Command::ShiftSwitch { name } => format!("shift-switch {}", name),
            Command::SwitchLast => "switch-last".to_string(),
            Command::ShiftSwitchLast => "shift-switch-last".to_string(),
            Command::SwitchAdjacent { direction } => {
                format!("switch-adjacent {}", direction.as_str())
            }
            Command::ShiftSwitchAdjacent { direction } => {
                format!("shift-switch-adjacent {}", direction.as_str())
            }
            Command::SwitchPrompt => "switch-prompt".to_string(),
            Command::ShiftSwitchPrompt => "shift-switch-prompt".to_string(),
            Command::Rename { name } => format!("rename {}", name),
            Command::MoveDesktop { index } => format!("move-desktop {}", index),
            Command::SetWallpaper { path } => format!("set-wallpaper {}", path),
            Command::PromptAnswer { name } => format!("prompt-answer {}", name),
            Command::PromptCancel => "prompt-cancel".to_string(),
            Command::Bind { key, action } => format!("bind {} {}", key, action.describe()),
            Command::Unbind { key } => format!("unbind {}", key),
            Command::ListBindings => "list-bindings".to_string(),
            Command::SetNotificationDuration { ms } => format!("set-notification-duration {}", ms),
            Command::SetPromptCommand { command } => match command {
                Some(command) => format!("set-prompt-command {}", command),
                None => "set-prompt-command".to_string(),
            },
            Command::ListDesktops => "list-desktops".to_string(),
            Command::GetState => "get-state".to_string(),
            Command::Quit => "quit".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Error { message: String },
    Desktops { desktops: Vec<DesktopInfo> },
    State { state: StateInfo },
    Bindings { bindings: Vec<BindingInfo> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingInfo {
    pub key: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopInfo {
    pub id: String,
    pub index: usize,
    pub name: Option<String>,
    pub is_current: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInfo {
    pub platform: String,
    pub current: Option<String>,
    pub last: Option<String>,
    pub desktop_count: usize,
    pub prompt: Option<PromptInfo>,
    pub notification: Option<String>,
}
