use tokio::sync::mpsc;

use heya_ipc::{Command, Response};

pub type IpcCommandWithResponse = (Command, mpsc::Sender<Response>);

/// Senders handed to the IPC server and the hotkey thread.
pub struct ProducerChannels {
    pub ipc_tx: mpsc::Sender<IpcCommandWithResponse>,
    pub hotkey_tx: mpsc::Sender<Command>,
}

/// Receivers drained by the coordination loop.
pub struct CoordinatorChannels {
    pub ipc_rx: mpsc::Receiver<IpcCommandWithResponse>,
    pub hotkey_rx: mpsc::Receiver<Command>,
}

pub fn create_channels() -> (ProducerChannels, CoordinatorChannels) {
    // Channel: IPC server -> coordination loop
    let (ipc_tx, ipc_rx) = mpsc::channel::<IpcCommandWithResponse>(256);

    // Channel: hotkey thread -> coordination loop
    let (hotkey_tx, hotkey_rx) = mpsc::channel::<Command>(64);

    (
        ProducerChannels { ipc_tx, hotkey_tx },
        CoordinatorChannels { ipc_rx, hotkey_rx },
    )
}
