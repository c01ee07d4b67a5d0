use std::collections::HashMap;

use parking_lot::Mutex;

use super::{Desktop, DesktopId};
use crate::error::{DesktopError, Result};

/// A native desktop object as returned by the platform layer.
pub trait NativeDesktop: Clone {
    fn id(&self) -> Result<DesktopId>;
    fn name(&self) -> Result<Option<String>>;
}

struct CacheEntry<N> {
    handle: Desktop,
    native: N,
}

/// Maps native desktop objects to logical handles, one live handle per
/// identifier. Only live desktops are kept.
pub struct DesktopCache<N> {
    entries: Mutex<HashMap<DesktopId, CacheEntry<N>>>,
}

impl<N: NativeDesktop> DesktopCache<N> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the handle for `native`, creating it on first sight. The
    /// handle's name is refreshed from the native object on every call.
    pub fn get_or_create(&self, native: N) -> Result<Desktop> {
        let id = native.id()?;
        let name = native.name()?;

        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(&id) {
            entry.handle.refresh_name(name);
            entry.native = native;
            return Ok(entry.handle.clone());
        }

        let handle = Desktop::new(id, name);
        entries.insert(
            id,
            CacheEntry {
                handle: handle.clone(),
                native,
            },
        );
        Ok(handle)
    }

    /// Native object behind `desktop`, or `AlreadyRemoved` if the handle is
    /// inert or has been superseded. Removed handles have no entry.
    pub fn native(&self, desktop: &Desktop) -> Result<N> {
        let entries = self.entries.lock();
        entries
            .get(&desktop.id())
            .filter(|entry| entry.handle == *desktop && !desktop.is_removed())
            .map(|entry| entry.native.clone())
            .ok_or(DesktopError::AlreadyRemoved(desktop.id()))
    }

    /// Make `desktop` inert and drop its cache entry.
    pub fn mark_removed(&self, desktop: &Desktop) {
        desktop.mark_removed();
        let mut entries = self.entries.lock();
        if entries
            .get(&desktop.id())
            .is_some_and(|entry| entry.handle == *desktop)
        {
            entries.remove(&desktop.id());
        }
    }

    /// Make every handle whose identifier is not in `live` inert and drop
    /// it from the cache.
    pub fn retain_live(&self, live: &[DesktopId]) {
        let mut entries = self.entries.lock();
        entries.retain(|id, entry| {
            let keep = live.contains(id) && !entry.handle.is_removed();
            if !keep {
                tracing::debug!("Desktop {} disappeared", id);
                entry.handle.mark_removed();
            }
            keep
        });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<N: NativeDesktop> Default for DesktopCache<N> {
    fn default() -> Self {
        Self::new()
    }
}
