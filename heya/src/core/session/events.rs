use super::{names_except, Session};
use crate::core::directory::unique_name;
use crate::core::{Desktop, DesktopEvent, PromptPurpose};
use crate::error::{DesktopError, Result};
use crate::platform::{NamePrompt, NotificationDisplay, VirtualDesktops, WindowSystem};

impl<V, W, P, D> Session<V, W, P, D>
where
    V: VirtualDesktops,
    W: WindowSystem,
    P: NamePrompt,
    D: NotificationDisplay,
{
    /// Polls the watcher and handles every event it reports. The first
    /// failure is returned after all events were handled.
    pub async fn process_events(&self) -> Result<()> {
        let events = self.watcher.borrow_mut().poll(&self.desktops)?;

        let mut first_error = None;
        for event in events {
            let result = match event {
                DesktopEvent::Destroyed { desktop } => {
                    self.on_desktop_destroyed(&desktop);
                    Ok(())
                }
                DesktopEvent::Created { desktop } => {
                    tracing::debug!("Desktop {} created", desktop.id());
                    Ok(())
                }
                DesktopEvent::CurrentChanged { old, new } => {
                    self.on_desktop_changed(&old, &new).await
                }
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Removes or remembers the vacated desktop, then prompts for a name
    /// and shows the new desktop's name concurrently. Returns once both
    /// have finished.
    pub async fn on_desktop_changed(&self, old: &Desktop, new: &Desktop) -> Result<()> {
        tracing::info!("Current desktop changed: {} -> {}", old.id(), new.id());

        let vacated = self.vacate(old, new);
        let (renamed, ()) = tokio::join!(self.rename_if_unnamed(new), self.show_name(new));

        vacated?;
        match renamed {
            Err(e) if e.is_benign() => Ok(()),
            other => other,
        }
    }

    pub fn on_desktop_destroyed(&self, desktop: &Desktop) {
        tracing::info!("Desktop {} destroyed", desktop.id());
        self.forget_last(desktop);
    }

    fn vacate(&self, old: &Desktop, new: &Desktop) -> Result<()> {
        if old.is_removed() {
            self.forget_last(old);
            return Ok(());
        }

        if !self.windows.windows_on_desktop(old.id()).is_empty() {
            *self.last.borrow_mut() = Some(old.clone());
            return Ok(());
        }

        tracing::info!("Removing empty desktop {}", old.id());
        match self.desktops.remove_desktop(old, new) {
            Ok(()) => {
                self.forget_last(old);
                Ok(())
            }
            Err(DesktopError::AlreadyRemoved(_)) => {
                tracing::debug!("Desktop {} was already removed", old.id());
                self.forget_last(old);
                Ok(())
            }
            Err(e) => {
                *self.last.borrow_mut() = Some(old.clone());
                Err(e)
            }
        }
    }

    fn forget_last(&self, desktop: &Desktop) {
        let mut last = self.last.borrow_mut();
        if last.as_ref() == Some(desktop) {
            *last = None;
        }
    }

    async fn rename_if_unnamed(&self, desktop: &Desktop) -> Result<()> {
        if desktop.is_removed() || desktop.name().is_some() {
            return Ok(());
        }

        let name = self.prompt_name(PromptPurpose::Rename, true).await?;

        // Refreshes every cached name, this one included.
        let all = self.desktops.all_desktops()?;
        if desktop.is_removed() || desktop.name().is_some() {
            tracing::debug!("Desktop {} no longer needs a name", desktop.id());
            return Ok(());
        }

        let unique = unique_name(&name, &names_except(&all, desktop));
        tracing::info!("Naming desktop {} as {}", desktop.id(), unique);
        self.desktops.set_name(desktop, &unique)
    }

    async fn show_name(&self, desktop: &Desktop) {
        let (text, duration) = {
            let config = self.config.borrow();
            (
                desktop.display_name(&config.unnamed_placeholder),
                config.notification_duration,
            )
        };
        let _guard = self.notifications.show(&text);
        tokio::time::sleep(duration).await;
    }
}
