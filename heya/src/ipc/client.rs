use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use anyhow::{Context, Result};

use heya_ipc::{Command, Response};

pub struct IpcClient {
    pipe: File,
}

impl IpcClient {
    #[cfg(windows)]
    pub fn connect() -> Result<Self> {
        use std::time::Duration;

        const ERROR_PIPE_BUSY: i32 = 231;
        const ATTEMPTS: u32 = 20;

        let mut attempt = 0;
        loop {
            match std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .open(heya_ipc::PIPE_NAME)
            {
                Ok(pipe) => return Ok(Self { pipe }),
                // Every instance is serving another client.
                Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY) && attempt < ATTEMPTS => {
                    attempt += 1;
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => return Err(e).context("Failed to connect to heya daemon"),
            }
        }
    }

    #[cfg(not(windows))]
    pub fn connect() -> Result<Self> {
        anyhow::bail!("heya daemon is only reachable on Windows")
    }

    pub fn send(&mut self, cmd: &Command) -> Result<Response> {
        let json = serde_json::to_string(cmd)?;
        writeln!(self.pipe, "{}", json)?;
        self.pipe.flush()?;

        let mut reader = BufReader::new(&self.pipe);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line.is_empty() {
            anyhow::bail!("Daemon closed the connection");
        }

        let response: Response = serde_json::from_str(&line)?;
        Ok(response)
    }
}
