use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_NOREPEAT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PeekMessageW, PostThreadMessageW, MSG, PM_NOREMOVE, WM_APP, WM_HOTKEY, WM_QUIT,
    WM_USER,
};

use crate::hotkey::{BindingStore, Hotkey, HotkeyManager, HotkeyRegistrar};
use heya_ipc::Command;

/// Registers hotkeys for the calling thread's message queue.
struct ThreadRegistrar;

impl HotkeyRegistrar for ThreadRegistrar {
    fn register(&mut self, id: i32, hotkey: &Hotkey) -> Result<(), String> {
        let modifiers = HOT_KEY_MODIFIERS(hotkey.modifiers.flags()) | MOD_NOREPEAT;
        unsafe { RegisterHotKey(HWND::default(), id, modifiers, hotkey.vk as u32) }
            .map_err(|e| format!("RegisterHotKey failed: {}", e))
    }

    fn unregister(&mut self, id: i32) {
        if let Err(e) = unsafe { UnregisterHotKey(HWND::default(), id) } {
            tracing::warn!("UnregisterHotKey({}) failed: {}", id, e);
        }
    }
}

enum Request {
    Bind {
        key: String,
        command: Command,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Unbind {
        key: String,
        reply: oneshot::Sender<Result<(), String>>,
    },
    List {
        reply: oneshot::Sender<Vec<(String, Command)>>,
    },
}

/// Thread owning the hotkey registrations. Fired hotkeys are forwarded as
/// commands; binding changes arrive as requests woken by `WM_APP`.
pub struct HotkeyThread {
    thread_id: u32,
    requests: std_mpsc::Sender<Request>,
    handle: Option<JoinHandle<()>>,
}

impl HotkeyThread {
    pub fn spawn(fired_tx: mpsc::Sender<Command>) -> Result<Self> {
        let (request_tx, request_rx) = std_mpsc::channel::<Request>();
        let (id_tx, id_rx) = std_mpsc::channel::<u32>();

        let handle = std::thread::Builder::new()
            .name("heya-hotkeys".to_string())
            .spawn(move || {
                // Creates the message queue before the id is published.
                let mut msg = MSG::default();
                unsafe {
                    let _ = PeekMessageW(&mut msg, HWND::default(), WM_USER, WM_USER, PM_NOREMOVE);
                }
                if id_tx.send(unsafe { GetCurrentThreadId() }).is_err() {
                    return;
                }
                run_message_loop(HotkeyManager::new(ThreadRegistrar), request_rx, fired_tx);
            })
            .context("Failed to spawn hotkey thread")?;

        let thread_id = id_rx.recv().context("Hotkey thread exited during startup")?;
        tracing::info!("Hotkey thread started");

        Ok(Self {
            thread_id,
            requests: request_tx,
            handle: Some(handle),
        })
    }

    /// The coordination thread keeps draining fired hotkeys while the
    /// reply is awaited.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(build(reply_tx))
            .map_err(|_| "Hotkey thread stopped".to_string())?;
        unsafe { PostThreadMessageW(self.thread_id, WM_APP, WPARAM(0), LPARAM(0)) }
            .map_err(|e| format!("Failed to wake hotkey thread: {}", e))?;
        reply_rx
            .await
            .map_err(|_| "Hotkey thread stopped".to_string())
    }
}

impl BindingStore for HotkeyThread {
    async fn bind(&self, key: &str, command: Command) -> Result<(), String> {
        self.request(|reply| Request::Bind {
            key: key.to_string(),
            command,
            reply,
        })
        .await?
    }

    async fn unbind(&self, key: &str) -> Result<(), String> {
        self.request(|reply| Request::Unbind {
            key: key.to_string(),
            reply,
        })
        .await?
    }

    async fn list_bindings(&self) -> Result<Vec<(String, Command)>, String> {
        self.request(|reply| Request::List { reply }).await
    }
}

impl Drop for HotkeyThread {
    fn drop(&mut self) {
        let _ = unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_message_loop(
    mut manager: HotkeyManager<ThreadRegistrar>,
    requests: std_mpsc::Receiver<Request>,
    fired_tx: mpsc::Sender<Command>,
) {
    manager.bind_defaults();

    let mut msg = MSG::default();
    while unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) }.0 > 0 {
        match msg.message {
            WM_HOTKEY => {
                let Some(command) = manager.command_for(msg.wParam.0 as i32) else {
                    continue;
                };
                tracing::debug!("Hotkey fired: {:?}", command);
                if fired_tx.blocking_send(command).is_err() {
                    tracing::error!("Command channel closed, stopping hotkey thread");
                    break;
                }
            }
            WM_APP => {
                while let Ok(request) = requests.try_recv() {
                    handle_request(&mut manager, request);
                }
            }
            _ => {}
        }
    }

    manager.unbind_all();
    tracing::info!("Hotkey thread exiting");
}

fn handle_request(manager: &mut HotkeyManager<ThreadRegistrar>, request: Request) {
    match request {
        Request::Bind {
            key,
            command,
            reply,
        } => {
            let _ = reply.send(manager.bind(&key, command));
        }
        Request::Unbind { key, reply } => {
            let _ = reply.send(manager.unbind(&key));
        }
        Request::List { reply } => {
            let _ = reply.send(manager.list_bindings());
        }
    }
}
