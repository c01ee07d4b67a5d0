use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::app::IpcCommandWithResponse;
use heya_ipc::{Command, Response};

pub struct IpcServer {
    cmd_tx: mpsc::Sender<IpcCommandWithResponse>,
}

impl IpcServer {
    pub fn new(cmd_tx: mpsc::Sender<IpcCommandWithResponse>) -> Self {
        Self { cmd_tx }
    }

    /// Accepts clients on the named pipe. A fresh pipe instance is created
    /// for every connection so the next client can connect while earlier
    /// ones are still being served.
    #[cfg(windows)]
    pub async fn run(&self) -> Result<()> {
        use tokio::net::windows::named_pipe::{PipeMode, ServerOptions};

        let mut is_first_instance = true;
        tracing::info!("IPC server listening on {}", heya_ipc::PIPE_NAME);

        loop {
            let server = match ServerOptions::new()
                .first_pipe_instance(is_first_instance)
                .pipe_mode(PipeMode::Byte)
                .create(heya_ipc::PIPE_NAME)
            {
                Ok(server) => server,
                Err(e) if is_first_instance => {
                    anyhow::bail!(
                        "Failed to create {} (is heya already running?): {}",
                        heya_ipc::PIPE_NAME,
                        e
                    );
                }
                Err(e) => {
                    tracing::error!("Failed to create pipe instance: {}", e);
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    continue;
                }
            };
            is_first_instance = false;

            if let Err(e) = server.connect().await {
                tracing::error!("Accept error: {}", e);
                continue;
            }

            let cmd_tx = self.cmd_tx.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(server, cmd_tx).await {
                    tracing::error!("Connection error: {}", e);
                }
            });
        }
    }
}

/// Serves one client: one JSON command per line in, one JSON response per
/// line out, until the client hangs up.
async fn handle_connection<S>(stream: S, cmd_tx: mpsc::Sender<IpcCommandWithResponse>) -> Result<()>
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Command>(line) {
            Ok(cmd) => forward(cmd, &cmd_tx).await,
            Err(e) => Response::Error {
                message: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

async fn forward(cmd: Command, cmd_tx: &mpsc::Sender<IpcCommandWithResponse>) -> Response {
    tracing::debug!("Received command: {:?}", cmd);
    let (resp_tx, mut resp_rx) = mpsc::channel(1);

    if cmd_tx.send((cmd, resp_tx)).await.is_err() {
        return Response::Error {
            message: "Internal error: command channel closed".to_string(),
        };
    }
    resp_rx.recv().await.unwrap_or(Response::Error {
        message: "Internal error: no response".to_string(),
    })
}
