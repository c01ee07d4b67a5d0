#![cfg_attr(not(windows), allow(dead_code))]

mod adapter;
mod app;
mod core;
mod error;
mod hotkey;
mod ipc;
mod platform;
#[cfg(windows)]
mod win32;

use anyhow::{bail, Result};
use argh::FromArgs;
use ipc::IpcClient;
use tracing_subscriber::EnvFilter;
use heya_ipc::{Command, Direction, Response};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Heya - named, dynamic virtual desktops for Windows
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Start(StartCmd),
    Version(VersionCmd),
    Switch(SwitchCmd),
    ShiftSwitch(ShiftSwitchCmd),
    SwitchLast(SwitchLastCmd),
    ShiftSwitchLast(ShiftSwitchLastCmd),
    SwitchAdjacent(SwitchAdjacentCmd),
    ShiftSwitchAdjacent(ShiftSwitchAdjacentCmd),
    SwitchPrompt(SwitchPromptCmd),
    ShiftSwitchPrompt(ShiftSwitchPromptCmd),
    Rename(RenameCmd),
    MoveDesktop(MoveDesktopCmd),
    SetWallpaper(SetWallpaperCmd),
    PromptAnswer(PromptAnswerCmd),
    PromptCancel(PromptCancelCmd),
    Bind(BindCmd),
    Unbind(UnbindCmd),
    ListBindings(ListBindingsCmd),
    SetNotificationDuration(SetNotificationDurationCmd),
    SetPromptCommand(SetPromptCommandCmd),
    ListDesktops(ListDesktopsCmd),
    GetState(GetStateCmd),
    Quit(QuitCmd),
}

/// Start the heya daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "start")]
struct StartCmd {}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

/// Switch to the named desktop, creating it if needed
#[derive(FromArgs)]
#[argh(subcommand, name = "switch")]
struct SwitchCmd {
    /// desktop name
    #[argh(positional)]
    name: String,
}

/// Move the foreground window to the named desktop and follow it
#[derive(FromArgs)]
#[argh(subcommand, name = "shift-switch")]
struct ShiftSwitchCmd {
    /// desktop name
    #[argh(positional)]
    name: String,
}

/// Switch to the previously visited desktop
#[derive(FromArgs)]
#[argh(subcommand, name = "switch-last")]
struct SwitchLastCmd {}

/// Move the foreground window to the previously visited desktop
#[derive(FromArgs)]
#[argh(subcommand, name = "shift-switch-last")]
struct ShiftSwitchLastCmd {}

/// Switch to the desktop on the left or right
#[derive(FromArgs)]
#[argh(subcommand, name = "switch-adjacent")]
struct SwitchAdjacentCmd {
    /// direction: left, right
    #[argh(positional)]
    direction: String,
}

/// Move the foreground window to the desktop on the left or right
#[derive(FromArgs)]
#[argh(subcommand, name = "shift-switch-adjacent")]
struct ShiftSwitchAdjacentCmd {
    /// direction: left, right
    #[argh(positional)]
    direction: String,
}

/// Prompt for a desktop name and switch to it
#[derive(FromArgs)]
#[argh(subcommand, name = "switch-prompt")]
struct SwitchPromptCmd {}

/// Prompt for a desktop name and move the foreground window there
#[derive(FromArgs)]
#[argh(subcommand, name = "shift-switch-prompt")]
struct ShiftSwitchPromptCmd {}

/// Rename the current desktop
#[derive(FromArgs)]
#[argh(subcommand, name = "rename")]
struct RenameCmd {
    /// new name
    #[argh(positional)]
    name: String,
}

/// Move the current desktop to a position
#[derive(FromArgs)]
#[argh(subcommand, name = "move-desktop")]
struct MoveDesktopCmd {
    /// zero-based position
    #[argh(positional)]
    index: usize,
}

/// Set the wallpaper of the current desktop
#[derive(FromArgs)]
#[argh(subcommand, name = "set-wallpaper")]
struct SetWallpaperCmd {
    /// image path
    #[argh(positional)]
    path: String,
}

/// Answer the open name prompt
#[derive(FromArgs)]
#[argh(subcommand, name = "prompt-answer")]
struct PromptAnswerCmd {
    /// desktop name
    #[argh(positional)]
    name: String,
}

/// Dismiss the open name prompt
#[derive(FromArgs)]
#[argh(subcommand, name = "prompt-cancel")]
struct PromptCancelCmd {}

/// Bind a hotkey to a command
#[derive(FromArgs)]
#[argh(subcommand, name = "bind")]
struct BindCmd {
    /// hotkey (e.g., win-ctrl-1, win-alt-left)
    #[argh(positional)]
    key: String,
    /// command and arguments to bind
    #[argh(positional, greedy)]
    action: Vec<String>,
}

/// Unbind a hotkey
#[derive(FromArgs)]
#[argh(subcommand, name = "unbind")]
struct UnbindCmd {
    /// hotkey to unbind
    #[argh(positional)]
    key: String,
}

/// List all hotkey bindings
#[derive(FromArgs)]
#[argh(subcommand, name = "list-bindings")]
struct ListBindingsCmd {}

/// Set how long desktop notifications stay visible
#[derive(FromArgs)]
#[argh(subcommand, name = "set-notification-duration")]
struct SetNotificationDurationCmd {
    /// duration in milliseconds (0 disables notifications)
    #[argh(positional)]
    ms: u64,
}

/// Set the command launched when a name prompt opens
#[derive(FromArgs)]
#[argh(subcommand, name = "set-prompt-command")]
struct SetPromptCommandCmd {
    /// shell command (omit to clear)
    #[argh(positional)]
    command: Option<String>,
}

/// List desktops in order
#[derive(FromArgs)]
#[argh(subcommand, name = "list-desktops")]
struct ListDesktopsCmd {}

/// Get current session state
#[derive(FromArgs)]
#[argh(subcommand, name = "get-state")]
struct GetStateCmd {}

/// Quit the heya daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "quit")]
struct QuitCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    match cli.command {
        None => {
            let args: Vec<&str> = vec!["heya", "--help"];
            if let Err(e) = Cli::from_args(&args[..1], &args[1..]) {
                println!("{}", e.output);
            }
            Ok(())
        }
        Some(SubCommand::Start(_)) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();

            tracing::info!("heya {} starting", VERSION);
            app::App::run()
        }
        Some(SubCommand::Version(_)) => {
            println!("heya {}", VERSION);
            Ok(())
        }
        Some(subcmd) => run_cli(subcmd),
    }
}

fn run_cli(subcmd: SubCommand) -> Result<()> {
    let cmd = to_command(subcmd)?;
    let mut client = IpcClient::connect()?;
    let response = client.send(&cmd)?;

    match response {
        Response::Ok => {}
        Response::Error { message } => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Response::Desktops { desktops } => {
            for d in desktops {
                let marker = if d.is_current {
                    " *"
                } else if d.is_last {
                    " -"
                } else {
                    ""
                };
                println!(
                    "{}: {}{}",
                    d.index,
                    d.name.as_deref().unwrap_or("(unnamed)"),
                    marker
                );
            }
        }
        Response::State { state } => {
            println!("Platform: {}", state.platform);
            println!("Current: {}", state.current.as_deref().unwrap_or("-"));
            println!("Last: {}", state.last.as_deref().unwrap_or("-"));
            println!("Desktop count: {}", state.desktop_count);
            if let Some(prompt) = state.prompt {
                println!("Prompt: {}", prompt.purpose);
            }
            if let Some(notification) = state.notification {
                println!("Notification: {}", notification);
            }
        }
        Response::Bindings { bindings } => {
            for b in bindings {
                println!("{} -> {}", b.key, b.action);
            }
        }
    }

    Ok(())
}

fn to_command(subcmd: SubCommand) -> Result<Command> {
    match subcmd {
        SubCommand::Start(_) | SubCommand::Version(_) => {
            bail!("start and version are not daemon commands")
        }
        SubCommand::Switch(cmd) => Ok(Command::Switch { name: cmd.name }),
        SubCommand::ShiftSwitch(cmd) => Ok(Command::ShiftSwitch { name: cmd.name }),
        SubCommand::SwitchLast(_) => Ok(Command::SwitchLast),
        SubCommand::ShiftSwitchLast(_) => Ok(Command::ShiftSwitchLast),
        SubCommand::SwitchAdjacent(cmd) => Ok(Command::SwitchAdjacent {
            direction: parse_direction(&cmd.direction)?,
        }),
        SubCommand::ShiftSwitchAdjacent(cmd) => Ok(Command::ShiftSwitchAdjacent {
            direction: parse_direction(&cmd.direction)?,
        }),
        SubCommand::SwitchPrompt(_) => Ok(Command::SwitchPrompt),
        SubCommand::ShiftSwitchPrompt(_) => Ok(Command::ShiftSwitchPrompt),
        SubCommand::Rename(cmd) => Ok(Command::Rename { name: cmd.name }),
        SubCommand::MoveDesktop(cmd) => Ok(Command::MoveDesktop { index: cmd.index }),
        SubCommand::SetWallpaper(cmd) => Ok(Command::SetWallpaper { path: cmd.path }),
        SubCommand::PromptAnswer(cmd) => Ok(Command::PromptAnswer { name: cmd.name }),
        SubCommand::PromptCancel(_) => Ok(Command::PromptCancel),
        SubCommand::Bind(cmd) => {
            if cmd.action.is_empty() {
                bail!("bind requires a command to bind");
            }
            let action = parse_command(&cmd.action)?;
            Ok(Command::Bind {
                key: cmd.key,
                action: Box::new(action),
            })
        }
        SubCommand::Unbind(cmd) => Ok(Command::Unbind { key: cmd.key }),
        SubCommand::ListBindings(_) => Ok(Command::ListBindings),
        SubCommand::SetNotificationDuration(cmd) => {
            Ok(Command::SetNotificationDuration { ms: cmd.ms })
        }
        SubCommand::SetPromptCommand(cmd) => Ok(Command::SetPromptCommand {
            command: cmd.command,
        }),
        SubCommand::ListDesktops(_) => Ok(Command::ListDesktops),
        SubCommand::GetState(_) => Ok(Command::GetState),
        SubCommand::Quit(_) => Ok(Command::Quit),
    }
}

/// Parses the action of a `bind`, written the way it is typed on the
/// command line.
fn parse_command(args: &[String]) -> Result<Command> {
    if args.is_empty() {
        bail!("No command provided");
    }

    let cmd = args[0].as_str();
    let rest = &args[1..];

    let name = |usage: &str| -> Result<String> {
        match rest {
            [] => bail!("Usage: {}", usage),
            words => Ok(words.join(" ")),
        }
    };

    match cmd {
        "switch" => Ok(Command::Switch {
            name: name("switch <name>")?,
        }),
        "shift-switch" => Ok(Command::ShiftSwitch {
            name: name("shift-switch <name>")?,
        }),
        "switch-last" => Ok(Command::SwitchLast),
        "shift-switch-last" => Ok(Command::ShiftSwitchLast),
        "switch-adjacent" => {
            if rest.is_empty() {
                bail!("Usage: switch-adjacent <left|right>");
            }
            Ok(Command::SwitchAdjacent {
                direction: parse_direction(&rest[0])?,
            })
        }
        "shift-switch-adjacent" => {
            if rest.is_empty() {
                bail!("Usage: shift-switch-adjacent <left|right>");
            }
            Ok(Command::ShiftSwitchAdjacent {
                direction: parse_direction(&rest[0])?,
            })
        }
        "switch-prompt" => Ok(Command::SwitchPrompt),
        "shift-switch-prompt" => Ok(Command::ShiftSwitchPrompt),
        "rename" => Ok(Command::Rename {
            name: name("rename <name>")?,
        }),
        "move-desktop" => {
            if rest.is_empty() {
                bail!("Usage: move-desktop <index>");
            }
            let index: usize = rest[0].parse()?;
            Ok(Command::MoveDesktop { index })
        }
        "set-wallpaper" => Ok(Command::SetWallpaper {
            path: name("set-wallpaper <path>")?,
        }),
        "prompt-cancel" => Ok(Command::PromptCancel),
        "list-bindings" => Ok(Command::ListBindings),
        "list-desktops" => Ok(Command::ListDesktops),
        "get-state" => Ok(Command::GetState),
        "quit" => Ok(Command::Quit),
        _ => bail!("Unknown command: {}", cmd),
    }
}

fn parse_direction(s: &str) -> Result<Direction> {
    match s.to_lowercase().as_str() {
        "left" => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        _ => bail!("Unknown direction: {} (use left or right)", s),
    }
}
