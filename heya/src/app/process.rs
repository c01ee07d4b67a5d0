use std::path::{Path, PathBuf};
use std::process::Command;

/// Shell invocation for a user-supplied command line.
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

const INIT_SCRIPTS: &[&str] = &["init.cmd", "init.ps1", "init"];

/// First init script present in `dir`.
pub fn find_init_script(dir: &Path) -> Option<PathBuf> {
    INIT_SCRIPTS
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

pub fn init_script_command(script: &Path) -> Command {
    match script.extension().and_then(|ext| ext.to_str()) {
        Some("ps1") => {
            let mut cmd = Command::new("powershell");
            cmd.args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"])
                .arg(script);
            cmd
        }
        Some("cmd") => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(script);
            cmd
        }
        _ => {
            let mut cmd = Command::new(script);
            cmd.current_dir(script.parent().unwrap_or(Path::new(".")));
            cmd
        }
    }
}

/// Runs the init script from `dirs::config_dir()/heya`, if one exists,
/// without waiting for it.
pub fn run_init_script() {
    let Some(dir) = dirs::config_dir().map(|d| d.join("heya")) else {
        tracing::debug!("No config directory, skipping init script");
        return;
    };
    let Some(script) = find_init_script(&dir) else {
        tracing::debug!("No init script in {:?}", dir);
        return;
    };

    tracing::info!("Running init script {:?}", script);
    match init_script_command(&script).spawn() {
        Ok(mut child) => {
            std::thread::spawn(move || match child.wait() {
                Ok(status) if status.success() => tracing::info!("Init script finished"),
                Ok(status) => tracing::warn!("Init script exited with {}", status),
                Err(e) => tracing::warn!("Failed to wait for init script: {}", e),
            });
        }
        Err(e) => tracing::error!("Failed to run init script {:?}: {}", script, e),
    }
}
