use std::cell::RefCell;

use tokio::sync::oneshot;

use super::process::shell_command;
use crate::core::PromptPurpose;
use crate::platform::NamePrompt;

struct PendingPrompt {
    purpose: PromptPurpose,
    reply: oneshot::Sender<String>,
}

/// Name prompt answered over IPC (`prompt-answer` / `prompt-cancel`).
///
/// At most one prompt is open. When a prompt opens, the configured prompt
/// command is launched so an external picker can collect the name.
pub struct PromptBroker {
    pending: RefCell<Option<PendingPrompt>>,
    command: RefCell<Option<String>>,
}

impl PromptBroker {
    pub fn new(command: Option<String>) -> Self {
        Self {
            pending: RefCell::new(None),
            command: RefCell::new(command),
        }
    }

    pub fn set_command(&self, command: Option<String>) {
        tracing::info!("Prompt command set to {:?}", command);
        *self.command.borrow_mut() = command;
    }

    /// Delivers `name` to the open prompt. Returns false if none is open.
    pub fn answer(&self, name: &str) -> bool {
        match self.take_open() {
            Some(prompt) => prompt.reply.send(name.to_string()).is_ok(),
            None => false,
        }
    }

    /// Dismisses the open prompt. Returns false if none is open.
    pub fn cancel(&self) -> bool {
        self.take_open().is_some()
    }

    pub fn pending(&self) -> Option<PromptPurpose> {
        self.pending
            .borrow()
            .as_ref()
            .filter(|prompt| !prompt.reply.is_closed())
            .map(|prompt| prompt.purpose)
    }

    fn take_open(&self) -> Option<PendingPrompt> {
        self.pending
            .borrow_mut()
            .take()
            .filter(|prompt| !prompt.reply.is_closed())
    }

    fn launch(&self, purpose: PromptPurpose) {
        let Some(command) = self.command.borrow().clone() else {
            tracing::info!("Waiting for prompt-answer ({})", purpose.as_str());
            return;
        };

        let spawned = shell_command(&command)
            .env("HEYA_PROMPT_PURPOSE", purpose.as_str())
            .spawn();
        match spawned {
            Ok(_) => tracing::debug!("Launched prompt command: {}", command),
            Err(e) => tracing::warn!("Failed to launch prompt command {}: {}", command, e),
        }
    }
}

impl NamePrompt for PromptBroker {
    fn request_name(&self, purpose: PromptPurpose, force_new: bool) -> oneshot::Receiver<String> {
        let (reply, rx) = oneshot::channel();

        {
            let mut pending = self.pending.borrow_mut();
            let open = pending.as_ref().filter(|prompt| !prompt.reply.is_closed());
            if let Some(open) = open {
                if !force_new {
                    tracing::debug!(
                        "{} prompt already open, {} request cancelled",
                        open.purpose.as_str(),
                        purpose.as_str()
                    );
                    return rx;
                }
                tracing::debug!("Superseding open {} prompt", open.purpose.as_str());
            }
            // Replacing the entry drops the superseded sender.
            *pending = Some(PendingPrompt { purpose, reply });
        }

        self.launch(purpose);
        rx
    }
}
