use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Stable native identifier of a virtual desktop (a GUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DesktopId(Uuid);

impl DesktopId {
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl fmt::Display for DesktopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:X}}}", self.0)
    }
}

/// Native window handle. Never null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowRef(isize);

impl WindowRef {
    pub fn new(raw: isize) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn raw(&self) -> isize {
        self.0
    }
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Logical handle for one native virtual desktop.
///
/// Handles are only created by the desktop cache, which guarantees a single
/// live handle per identifier. Equality is identity: two handles are equal
/// only if they are clones of the same allocation.
#[derive(Clone)]
pub struct Desktop(Arc<DesktopInner>);

struct DesktopInner {
    id: DesktopId,
    name: RwLock<Option<String>>,
    removed: AtomicBool,
}

impl Desktop {
    pub(crate) fn new(id: DesktopId, name: Option<String>) -> Self {
        Self(Arc::new(DesktopInner {
            id,
            name: RwLock::new(normalize(name)),
            removed: AtomicBool::new(false),
        }))
    }

    pub fn id(&self) -> DesktopId {
        self.0.id
    }

    /// Name last reported by the native layer. Empty names read as `None`.
    pub fn name(&self) -> Option<String> {
        self.0.name.read().clone()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.0.name.read().as_deref() == Some(name)
    }

    pub fn display_name(&self, placeholder: &str) -> String {
        self.name().unwrap_or_else(|| placeholder.to_string())
    }

    pub fn is_removed(&self) -> bool {
        self.0.removed.load(Ordering::Acquire)
    }

    /// Removed handles keep their last name.
    pub(crate) fn refresh_name(&self, name: Option<String>) {
        if self.is_removed() {
            return;
        }
        *self.0.name.write() = normalize(name);
    }

    pub(crate) fn mark_removed(&self) {
        self.0.removed.store(true, Ordering::Release);
    }
}

fn normalize(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}

impl PartialEq for Desktop {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Desktop {}

impl fmt::Debug for Desktop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Desktop")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("removed", &self.is_removed())
            .finish()
    }
}
