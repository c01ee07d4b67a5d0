mod events;
mod switch;

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use heya_ipc::DesktopInfo;

use super::directory::{self, unique_name};
use super::{
    Config, Desktop, DesktopWatcher, NotificationCenter, PromptPurpose, PromptSlot, WindowRef,
};
use crate::error::{DesktopError, Result};
use crate::platform::{NamePrompt, NotificationDisplay, VirtualDesktops, WindowSystem};

/// Desktop session state: the `last` pointer, the rename prompt guard and
/// the collaborators every operation runs against.
///
/// All methods run on the coordination thread. Async operations may
/// interleave at their await points, so no `RefCell` borrow is held across
/// an await.
pub struct Session<V, W, P, D>
where
    V: VirtualDesktops,
    W: WindowSystem,
    P: NamePrompt,
    D: NotificationDisplay,
{
    desktops: V,
    windows: W,
    prompt: P,
    notifications: NotificationCenter<D>,
    config: RefCell<Config>,
    last: RefCell<Option<Desktop>>,
    prompt_slot: PromptSlot,
    watcher: RefCell<DesktopWatcher>,
}

impl<V, W, P, D> Session<V, W, P, D>
where
    V: VirtualDesktops,
    W: WindowSystem,
    P: NamePrompt,
    D: NotificationDisplay,
{
    /// Establishes the naming invariants, then starts tracking desktops.
    pub fn new(desktops: V, windows: W, prompt: P, display: D, config: Config) -> Result<Self> {
        directory::initialize(&desktops, &config)?;
        let watcher = DesktopWatcher::prime(&desktops)?;
        tracing::info!(
            "Session started on {} with current desktop {}",
            desktops.generation(),
            watcher.current().display_name(&config.unnamed_placeholder)
        );

        Ok(Self {
            desktops,
            windows,
            prompt,
            notifications: NotificationCenter::new(display),
            config: RefCell::new(config),
            last: RefCell::new(None),
            prompt_slot: PromptSlot::new(),
            watcher: RefCell::new(watcher),
        })
    }

    pub fn generation(&self) -> &'static str {
        self.desktops.generation()
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn config(&self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    pub fn set_notification_duration(&self, duration: Duration) {
        self.config.borrow_mut().notification_duration = duration;
    }

    pub fn last(&self) -> Option<Desktop> {
        self.last.borrow().clone()
    }

    pub fn current(&self) -> Result<Desktop> {
        self.desktops.current_desktop()
    }

    pub fn foreground_window(&self) -> Option<WindowRef> {
        self.windows.foreground_window()
    }

    pub fn notification_text(&self) -> Option<String> {
        self.notifications.current_text()
    }

    pub fn desktop_count(&self) -> Result<usize> {
        Ok(self.desktops.all_desktops()?.len())
    }

    pub fn list_desktops(&self) -> Result<Vec<DesktopInfo>> {
        let all = self.desktops.all_desktops()?;
        let current = self.desktops.current_desktop()?;
        let last = self.last();

        Ok(all
            .iter()
            .enumerate()
            .map(|(index, desktop)| DesktopInfo {
                id: desktop.id().to_string(),
                index,
                name: desktop.name(),
                is_current: *desktop == current,
                is_last: last.as_ref() == Some(desktop),
            })
            .collect())
    }

    /// Renames the current desktop, deduplicated against the others.
    pub fn rename_current(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DesktopError::EmptyName);
        }

        let all = self.desktops.all_desktops()?;
        let current = self.desktops.current_desktop()?;
        if current.has_name(name) {
            return Ok(());
        }

        let unique = unique_name(name, &names_except(&all, &current));
        tracing::info!("Renaming current desktop to {}", unique);
        self.desktops.set_name(&current, &unique)
    }

    pub fn move_current_desktop(&self, index: usize) -> Result<()> {
        let current = self.desktops.current_desktop()?;
        self.desktops.move_desktop(&current, index)
    }

    pub fn set_current_wallpaper(&self, path: &Path) -> Result<()> {
        let current = self.desktops.current_desktop()?;
        self.desktops.set_wallpaper(&current, path)
    }

    /// Shows a failed user operation through the notification display.
    pub async fn report_error(&self, message: &str) {
        let duration = self.config.borrow().notification_duration;
        let _guard = self.notifications.show(message);
        tokio::time::sleep(duration).await;
    }

    /// Asks for a name. Superseded prompts and blank answers are
    /// `PromptCancelled`.
    async fn prompt_name(&self, purpose: PromptPurpose, force_new: bool) -> Result<String> {
        let Some(ticket) = self.prompt_slot.begin(force_new) else {
            tracing::debug!("Prompt already open, {} request dropped", purpose.as_str());
            return Err(DesktopError::PromptCancelled);
        };

        let answer = self.prompt.request_name(purpose, force_new).await;
        let still_current = self.prompt_slot.finish(ticket);

        match answer {
            Ok(name) if still_current && !name.trim().is_empty() => Ok(name.trim().to_string()),
            Ok(_) if !still_current => {
                tracing::debug!("Discarding answer to superseded {} prompt", purpose.as_str());
                Err(DesktopError::PromptCancelled)
            }
            _ => Err(DesktopError::PromptCancelled),
        }
    }
}

fn names_except(all: &[Desktop], skip: &Desktop) -> HashSet<String> {
    all.iter()
        .filter(|d| *d != skip)
        .filter_map(Desktop::name)
        .collect()
}
