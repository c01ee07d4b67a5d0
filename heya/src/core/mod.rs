mod cache;
mod config;
mod desktop;
pub mod directory;
mod notify;
mod prompt;
mod session;
mod watcher;

pub use cache::*;
pub use config::*;
pub use desktop::*;
pub use notify::*;
pub use prompt::*;
pub use session::*;
pub use watcher::*;
