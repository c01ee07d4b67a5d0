use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    /// Name the desktop that just became current.
    Rename,
    Switch,
    ShiftSwitch,
}

impl PromptPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptPurpose::Rename => "rename",
            PromptPurpose::Switch => "switch",
            PromptPurpose::ShiftSwitch => "shift-switch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTicket(u64);

/// Single-flight guard for the rename prompt.
///
/// Every forced prompt takes a fresh ticket, which retires all earlier
/// ones. An answer is only applied if its ticket is still current.
#[derive(Debug, Default)]
pub struct PromptSlot {
    latest: Cell<u64>,
    pending: Cell<bool>,
}

impl PromptSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` when a prompt is pending and `force_new` is false.
    pub fn begin(&self, force_new: bool) -> Option<PromptTicket> {
        if self.pending.get() && !force_new {
            return None;
        }
        let next = self.latest.get() + 1;
        self.latest.set(next);
        self.pending.set(true);
        Some(PromptTicket(next))
    }

    /// Ends the prompt for `ticket`. Returns whether it was still current.
    pub fn finish(&self, ticket: PromptTicket) -> bool {
        let current = self.latest.get() == ticket.0;
        if current {
            self.pending.set(false);
        }
        current
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}
