mod com;
mod hotkey;
mod registry;
mod shell;
mod window_system;

pub mod win10;
pub mod win11_21h2;
pub mod win11_22h2;
pub mod win11_24h2;

pub use com::{ComApartment, ImmersiveShell};
pub use hotkey::HotkeyThread;
pub use registry::current_build;
pub use window_system::Win32WindowSystem;
