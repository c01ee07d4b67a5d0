use std::path::Path;

use tokio::sync::oneshot;

use crate::core::{Desktop, DesktopId, PromptPurpose, WindowRef};
use crate::error::Result;
use heya_ipc::Direction;

/// Capability set over the native virtual desktop manager.
/// Every versioned adapter implements it with identical semantics.
pub trait VirtualDesktops {
    /// Name of the native interface generation, for diagnostics.
    fn generation(&self) -> &'static str;
    fn current_desktop(&self) -> Result<Desktop>;
    /// All desktops in native left-to-right order.
    fn all_desktops(&self) -> Result<Vec<Desktop>>;
    fn adjacent_desktop(&self, from: &Desktop, direction: Direction) -> Result<Option<Desktop>>;
    /// Creates an unnamed desktop at the end.
    fn create_desktop(&self) -> Result<Desktop>;
    fn remove_desktop(&self, target: &Desktop, fallback: &Desktop) -> Result<()>;
    fn switch_to(&self, desktop: &Desktop) -> Result<()>;
    fn set_name(&self, desktop: &Desktop, name: &str) -> Result<()>;
    fn move_window(&self, window: WindowRef, to: &Desktop) -> Result<()>;
    fn find_desktop(&self, id: DesktopId) -> Result<Option<Desktop>>;
    fn move_desktop(&self, desktop: &Desktop, index: usize) -> Result<()>;
    fn set_wallpaper(&self, desktop: &Desktop, path: &Path) -> Result<()>;
}

/// Trait for querying and focusing top-level windows.
/// This abstraction allows mocking in tests.
pub trait WindowSystem {
    fn foreground_window(&self) -> Option<WindowRef>;
    /// Top-level windows assigned to `desktop`, minimized ones included.
    fn windows_on_desktop(&self, desktop: DesktopId) -> Vec<WindowRef>;
    fn focus_window(&self, window: WindowRef) -> Result<()>;
}

/// Interactive name entry.
///
/// The receiver yields the entered text. A dropped sender means the prompt
/// was cancelled or superseded.
pub trait NamePrompt {
    fn request_name(&self, purpose: PromptPurpose, force_new: bool) -> oneshot::Receiver<String>;
}

/// Transient on-screen notification.
pub trait NotificationDisplay {
    fn show(&self, text: &str);
    fn hide(&self);
}

/// Notification display that writes to the log.
#[derive(Default)]
pub struct TracingDisplay;

impl NotificationDisplay for TracingDisplay {
    fn show(&self, text: &str) {
        tracing::info!("Notification: {}", text);
    }

    fn hide(&self) {
        tracing::debug!("Notification hidden");
    }
}
