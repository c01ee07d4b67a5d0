use crate::error::{DesktopError, Result};

/// OS build identity as read from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformBuild {
    pub build: u32,
    pub revision: u32,
}

impl PlatformBuild {
    pub fn new(build: u32, revision: u32) -> Self {
        Self { build, revision }
    }
}

impl std::fmt::Display for PlatformBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.build, self.revision)
    }
}

/// Native interface generation of the shell's virtual desktop manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Win10,
    Win11V21H2,
    Win11V22H2,
    Win11V24H2,
}

impl Generation {
    pub fn name(self) -> &'static str {
        match self {
            Generation::Win10 => "windows-10",
            Generation::Win11V21H2 => "windows-11-21h2",
            Generation::Win11V22H2 => "windows-11-22h2",
            Generation::Win11V24H2 => "windows-11-24h2",
        }
    }
}

/// Picks the interface generation for `build`. Builds with an unknown
/// interface layout are refused rather than guessed.
pub fn select_generation(build: PlatformBuild) -> Result<Generation> {
    match build.build {
        19041..=19045 => Ok(Generation::Win10),
        22000 => Ok(Generation::Win11V21H2),
        // 22621 and 22631 share servicing updates; 3085 changed the layout.
        22621 | 22631 if build.revision < 3085 => Ok(Generation::Win11V22H2),
        26100 | 26200 => Ok(Generation::Win11V24H2),
        _ => Err(DesktopError::UnsupportedPlatform {
            build: build.build,
            revision: build.revision,
        }),
    }
}

#[cfg(windows)]
pub use versioned::VersionedAdapter;

#[cfg(windows)]
mod versioned {
    use std::path::Path;

    use heya_ipc::Direction;

    use super::Generation;
    use crate::core::{Desktop, DesktopId, WindowRef};
    use crate::error::Result;
    use crate::platform::VirtualDesktops;
    use crate::win32::{self, ImmersiveShell};

    /// The adapter for the running OS, chosen once at startup.
    pub enum VersionedAdapter {
        Win10(win32::win10::Adapter),
        Win11V21H2(win32::win11_21h2::Adapter),
        Win11V22H2(win32::win11_22h2::Adapter),
        Win11V24H2(win32::win11_24h2::Adapter),
    }

    impl VersionedAdapter {
        pub fn new(generation: Generation) -> Result<Self> {
            let shell = ImmersiveShell::connect()?;
            Ok(match generation {
                Generation::Win10 => Self::Win10(win32::win10::Adapter::new(&shell)?),
                Generation::Win11V21H2 => {
                    Self::Win11V21H2(win32::win11_21h2::Adapter::new(&shell)?)
                }
                Generation::Win11V22H2 => {
                    Self::Win11V22H2(win32::win11_22h2::Adapter::new(&shell)?)
                }
                Generation::Win11V24H2 => {
                    Self::Win11V24H2(win32::win11_24h2::Adapter::new(&shell)?)
                }
            })
        }
    }

    macro_rules! each_adapter {
        ($self:ident, $adapter:ident => $body:expr) => {
            match $self {
                VersionedAdapter::Win10($adapter) => $body,
                VersionedAdapter::Win11V21H2($adapter) => $body,
                VersionedAdapter::Win11V22H2($adapter) => $body,
                VersionedAdapter::Win11V24H2($adapter) => $body,
            }
        };
    }

    impl VirtualDesktops for VersionedAdapter {
        fn generation(&self) -> &'static str {
            each_adapter!(self, a => a.generation())
        }

        fn current_desktop(&self) -> Result<Desktop> {
            each_adapter!(self, a => a.current_desktop())
        }

        fn all_desktops(&self) -> Result<Vec<Desktop>> {
            each_adapter!(self, a => a.all_desktops())
        }

        fn adjacent_desktop(&self, from: &Desktop, direction: Direction) -> Result<Option<Desktop>> {
            each_adapter!(self, a => a.adjacent_desktop(from, direction))
        }

        fn create_desktop(&self) -> Result<Desktop> {
            each_adapter!(self, a => a.create_desktop())
        }

        fn remove_desktop(&self, target: &Desktop, fallback: &Desktop) -> Result<()> {
            each_adapter!(self, a => a.remove_desktop(target, fallback))
        }

        fn switch_to(&self, desktop: &Desktop) -> Result<()> {
            each_adapter!(self, a => a.switch_to(desktop))
        }

        fn set_name(&self, desktop: &Desktop, name: &str) -> Result<()> {
            each_adapter!(self, a => a.set_name(desktop, name))
        }

        fn move_window(&self, window: WindowRef, to: &Desktop) -> Result<()> {
            each_adapter!(self, a => a.move_window(window, to))
        }

        fn find_desktop(&self, id: DesktopId) -> Result<Option<Desktop>> {
            each_adapter!(self, a => a.find_desktop(id))
        }

        fn move_desktop(&self, desktop: &Desktop, index: usize) -> Result<()> {
            each_adapter!(self, a => a.move_desktop(desktop, index))
        }

        fn set_wallpaper(&self, desktop: &Desktop, path: &Path) -> Result<()> {
            each_adapter!(self, a => a.set_wallpaper(desktop, path))
        }
    }
}
