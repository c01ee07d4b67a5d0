use heya_ipc::Direction;

use super::Session;
use crate::core::directory;
use crate::core::{Desktop, PromptPurpose, WindowRef};
use crate::error::{DesktopError, Result};
use crate::platform::{NamePrompt, NotificationDisplay, VirtualDesktops, WindowSystem};

impl<V, W, P, D> Session<V, W, P, D>
where
    V: VirtualDesktops,
    W: WindowSystem,
    P: NamePrompt,
    D: NotificationDisplay,
{
    pub async fn switch_to(&self, name: &str) -> Result<()> {
        let target = directory::get_or_create(&self.desktops, name)?;
        self.switch_to_desktop(&target, None).await
    }

    /// Moves `window` to the desktop named `name` and follows it.
    /// Without a window nothing happens.
    pub async fn shift_switch(&self, name: &str, window: Option<WindowRef>) -> Result<()> {
        let Some(window) = window else {
            tracing::debug!("shift-switch without a window, ignoring");
            return Ok(());
        };
        let target = directory::get_or_create(&self.desktops, name)?;
        self.shift_to_desktop(window, &target).await
    }

    pub async fn switch_to_last(&self) -> Result<()> {
        let Some(last) = self.last() else {
            return Ok(());
        };
        self.switch_to_desktop(&last, None).await
    }

    pub async fn shift_switch_to_last(&self, window: Option<WindowRef>) -> Result<()> {
        let (Some(window), Some(last)) = (window, self.last()) else {
            return Ok(());
        };
        self.shift_to_desktop(window, &last).await
    }

    pub async fn switch_to_adjacent(&self, direction: Direction) -> Result<()> {
        match self.neighbor(direction)? {
            Some(target) => self.switch_to_desktop(&target, None).await,
            None => Ok(()),
        }
    }

    pub async fn shift_switch_to_adjacent(
        &self,
        direction: Direction,
        window: Option<WindowRef>,
    ) -> Result<()> {
        let Some(window) = window else {
            return Ok(());
        };
        match self.neighbor(direction)? {
            Some(target) => self.shift_to_desktop(window, &target).await,
            None => Ok(()),
        }
    }

    pub async fn switch_to_prompt(&self) -> Result<()> {
        match self.prompt_name(PromptPurpose::Switch, false).await {
            Ok(name) => self.switch_to(&name).await,
            Err(DesktopError::PromptCancelled) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The window is captured by the caller before the prompt takes the
    /// foreground.
    pub async fn shift_switch_to_prompt(&self, window: Option<WindowRef>) -> Result<()> {
        if window.is_none() {
            return Ok(());
        }
        match self.prompt_name(PromptPurpose::ShiftSwitch, false).await {
            Ok(name) => self.shift_switch(&name, window).await,
            Err(DesktopError::PromptCancelled) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn neighbor(&self, direction: Direction) -> Result<Option<Desktop>> {
        let current = self.desktops.current_desktop()?;
        self.desktops.adjacent_desktop(&current, direction)
    }

    async fn shift_to_desktop(&self, window: WindowRef, target: &Desktop) -> Result<()> {
        match self.desktops.move_window(window, target) {
            Ok(()) => tracing::debug!("Moved window {} to {}", window, target.id()),
            Err(DesktopError::WindowNotFound(_)) => {
                tracing::warn!("Window {} disappeared before it could be moved", window);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        self.switch_to_desktop(target, Some(window)).await
    }

    /// Switches, focuses a window on the target, then handles the resulting
    /// desktop events before returning.
    async fn switch_to_desktop(&self, target: &Desktop, focus: Option<WindowRef>) -> Result<()> {
        let current = self.desktops.current_desktop()?;
        if current != *target {
            self.desktops.switch_to(target)?;
            tracing::info!(
                "Switched to {}",
                target.display_name(&self.config.borrow().unnamed_placeholder)
            );
        }

        let on_target = self.windows.windows_on_desktop(target.id());
        let window = focus
            .filter(|w| on_target.contains(w))
            .or_else(|| on_target.first().copied());
        if let Some(window) = window {
            if let Err(e) = self.windows.focus_window(window) {
                tracing::warn!("Failed to focus window {}: {}", window, e);
            }
        }

        self.process_events().await
    }
}
