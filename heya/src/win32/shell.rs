use std::path::Path;

use heya_ipc::Direction;
use windows::core::{Interface, IUnknown, GUID, HSTRING};
use windows::Win32::Foundation::{
    E_INVALIDARG, E_NOTIMPL, TYPE_E_ELEMENTNOTFOUND, TYPE_E_OUTOFBOUNDS,
};
use windows::Win32::UI::Shell::Common::IObjectArray;

use super::com::{
    collect_array, direction_code, guid, native_error, view_for_window,
    IApplicationViewCollection, ImmersiveShell,
};
use crate::adapter::Generation;
use crate::core::{Desktop, DesktopCache, DesktopId, NativeDesktop, WindowRef};
use crate::error::{DesktopError, Result};
use crate::platform::VirtualDesktops;

type WinResult<T> = windows::core::Result<T>;

/// Raw calls of one generation's internal desktop manager.
///
/// Implementations only bridge parameter lists. Unsupported calls keep the
/// default and fail with `E_NOTIMPL`.
pub trait DesktopManager: Sized {
    type Native: NativeDesktop + Interface;

    const GENERATION: Generation;

    fn connect(shell: &ImmersiveShell) -> Result<Self>;
    fn current(&self) -> WinResult<Self::Native>;
    fn desktops(&self) -> WinResult<IObjectArray>;
    fn adjacent(&self, from: &Self::Native, direction: u32) -> WinResult<Self::Native>;
    fn switch(&self, desktop: &Self::Native) -> WinResult<()>;
    fn create(&self) -> WinResult<Self::Native>;
    fn remove(&self, desktop: &Self::Native, fallback: &Self::Native) -> WinResult<()>;
    fn find(&self, id: &GUID) -> WinResult<Self::Native>;
    fn set_name(&self, desktop: &Self::Native, name: &HSTRING) -> WinResult<()>;
    fn move_view(&self, view: &IUnknown, desktop: &Self::Native) -> WinResult<()>;

    fn move_desktop(&self, _desktop: &Self::Native, _index: u32) -> WinResult<()> {
        Err(E_NOTIMPL.into())
    }

    fn set_wallpaper(&self, _desktop: &Self::Native, _path: &HSTRING) -> WinResult<()> {
        Err(E_NOTIMPL.into())
    }
}

/// `VirtualDesktops` over any manager generation. Every desktop leaving
/// this adapter goes through the handle cache.
pub struct ShellAdapter<M: DesktopManager> {
    manager: M,
    views: IApplicationViewCollection,
    cache: DesktopCache<M::Native>,
}

impl<M: DesktopManager> ShellAdapter<M> {
    pub fn new(shell: &ImmersiveShell) -> Result<Self> {
        let manager = M::connect(shell)?;
        tracing::info!("Connected to desktop manager ({})", M::GENERATION.name());
        Ok(Self {
            manager,
            views: shell.view_collection()?,
            cache: DesktopCache::new(),
        })
    }

    fn wrap(&self, call: &'static str, native: WinResult<M::Native>) -> Result<Desktop> {
        let native = native.map_err(|e| native_error(call, e))?;
        self.cache.get_or_create(native)
    }

    /// Maps a failed call on `target`. A target the shell no longer knows
    /// is `AlreadyRemoved`.
    fn on_target(&self, call: &'static str, result: WinResult<()>, target: &Desktop) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.code() == TYPE_E_ELEMENTNOTFOUND || e.code() == E_INVALIDARG => {
                self.cache.mark_removed(target);
                Err(DesktopError::AlreadyRemoved(target.id()))
            }
            Err(e) => Err(native_error(call, e)),
        }
    }

    fn on_optional(
        &self,
        capability: &'static str,
        call: &'static str,
        result: WinResult<()>,
        target: &Desktop,
    ) -> Result<()> {
        match result {
            Err(e) if e.code() == E_NOTIMPL => Err(DesktopError::UnsupportedOnThisVersion {
                capability,
                generation: M::GENERATION.name(),
            }),
            result => self.on_target(call, result, target),
        }
    }
}

impl<M: DesktopManager> VirtualDesktops for ShellAdapter<M> {
    fn generation(&self) -> &'static str {
        M::GENERATION.name()
    }

    fn current_desktop(&self) -> Result<Desktop> {
        self.wrap("GetCurrentDesktop", self.manager.current())
    }

    fn all_desktops(&self) -> Result<Vec<Desktop>> {
        let array = self
            .manager
            .desktops()
            .map_err(|e| native_error("GetDesktops", e))?;
        let desktops = collect_array::<M::Native>("GetDesktops", array)?
            .into_iter()
            .map(|native| self.cache.get_or_create(native))
            .collect::<Result<Vec<_>>>()?;

        let live: Vec<DesktopId> = desktops.iter().map(Desktop::id).collect();
        self.cache.retain_live(&live);
        Ok(desktops)
    }

    fn adjacent_desktop(&self, from: &Desktop, direction: Direction) -> Result<Option<Desktop>> {
        let native = self.cache.native(from)?;
        match self.manager.adjacent(&native, direction_code(direction)) {
            Err(e) if e.code() == TYPE_E_OUTOFBOUNDS => Ok(None),
            result => self.wrap("GetAdjacentDesktop", result).map(Some),
        }
    }

    fn create_desktop(&self) -> Result<Desktop> {
        self.wrap("CreateDesktop", self.manager.create())
    }

    fn remove_desktop(&self, target: &Desktop, fallback: &Desktop) -> Result<()> {
        let native = self.cache.native(target)?;
        let fallback_native = self.cache.native(fallback)?;
        let result = self.manager.remove(&native, &fallback_native);
        self.on_target("RemoveDesktop", result, target)?;
        self.cache.mark_removed(target);
        Ok(())
    }

    fn switch_to(&self, desktop: &Desktop) -> Result<()> {
        let native = self.cache.native(desktop)?;
        let result = self.manager.switch(&native);
        self.on_target("SwitchDesktop", result, desktop)
    }

    fn set_name(&self, desktop: &Desktop, name: &str) -> Result<()> {
        let native = self.cache.native(desktop)?;
        let result = self.manager.set_name(&native, &HSTRING::from(name));
        self.on_target("SetDesktopName", result, desktop)?;
        desktop.refresh_name(Some(name.to_string()));
        Ok(())
    }

    fn move_window(&self, window: WindowRef, to: &Desktop) -> Result<()> {
        let native = self.cache.native(to)?;
        let view = view_for_window(&self.views, window)?;
        let result = self.manager.move_view(&view, &native);
        self.on_target("MoveViewToDesktop", result, to)
    }

    fn find_desktop(&self, id: DesktopId) -> Result<Option<Desktop>> {
        match self.manager.find(&guid(id)) {
            Err(e) if e.code() == TYPE_E_ELEMENTNOTFOUND => Ok(None),
            result => self.wrap("FindDesktop", result).map(Some),
        }
    }

    fn move_desktop(&self, desktop: &Desktop, index: usize) -> Result<()> {
        let native = self.cache.native(desktop)?;
        let count = self.all_desktops()?.len();
        if index >= count {
            return Err(DesktopError::native(
                "MoveDesktop",
                format!("index {} out of range for {} desktops", index, count),
            ));
        }
        let result = self.manager.move_desktop(&native, index as u32);
        self.on_optional("move-desktop", "MoveDesktop", result, desktop)
    }

    fn set_wallpaper(&self, desktop: &Desktop, path: &Path) -> Result<()> {
        let native = self.cache.native(desktop)?;
        let result = self.manager.set_wallpaper(&native, &HSTRING::from(path));
        self.on_optional("set-wallpaper", "SetDesktopWallpaper", result, desktop)
    }
}
