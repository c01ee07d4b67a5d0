mod client;
mod server;

pub use client::IpcClient;
pub use server::IpcServer;
