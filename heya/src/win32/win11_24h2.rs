use std::ffi::c_void;

use windows::core::{interface, Interface, IUnknown, IUnknown_Vtbl, GUID, HRESULT, HSTRING};
use windows::Win32::UI::Shell::Common::IObjectArray;

use super::com::{out_param, raw_hstring, ImmersiveShell};
use super::shell::{DesktopManager, ShellAdapter};
use super::win11_22h2::IVirtualDesktop;
use crate::adapter::Generation;
use crate::error::Result;

type WinResult<T> = windows::core::Result<T>;

#[interface("53F5CA0B-158F-4124-900C-057158060B27")]
pub unsafe trait IVirtualDesktopManagerInternal: IUnknown {
    pub unsafe fn get_count(&self, count: *mut u32) -> HRESULT;
    pub unsafe fn move_view_to_desktop(&self, view: *mut c_void, desktop: *mut c_void) -> HRESULT;
    pub unsafe fn can_view_move_desktops(&self, view: *mut c_void, can: *mut i32) -> HRESULT;
    pub unsafe fn get_current_desktop(&self, desktop: *mut Option<IVirtualDesktop>) -> HRESULT;
    pub unsafe fn get_desktops(&self, desktops: *mut Option<IObjectArray>) -> HRESULT;
    pub unsafe fn get_adjacent_desktop(
        &self,
        from: *mut c_void,
        direction: u32,
        desktop: *mut Option<IVirtualDesktop>,
    ) -> HRESULT;
    pub unsafe fn switch_desktop(&self, desktop: *mut c_void) -> HRESULT;
    pub unsafe fn switch_desktop_and_move_foreground_view(&self, desktop: *mut c_void) -> HRESULT;
    pub unsafe fn create_desktop(&self, desktop: *mut Option<IVirtualDesktop>) -> HRESULT;
    pub unsafe fn move_desktop(&self, desktop: *mut c_void, index: u32) -> HRESULT;
    pub unsafe fn remove_desktop(&self, desktop: *mut c_void, fallback: *mut c_void) -> HRESULT;
    pub unsafe fn find_desktop(
        &self,
        id: *const GUID,
        desktop: *mut Option<IVirtualDesktop>,
    ) -> HRESULT;
    pub unsafe fn get_desktop_switch_include_exclude_views(
        &self,
        desktop: *mut c_void,
        include: *mut Option<IObjectArray>,
        exclude: *mut Option<IObjectArray>,
    ) -> HRESULT;
    pub unsafe fn set_desktop_name(&self, desktop: *mut c_void, name: *mut c_void) -> HRESULT;
    pub unsafe fn set_desktop_wallpaper(&self, desktop: *mut c_void, path: *mut c_void) -> HRESULT;
}

/// Same desktop interface as 22H2. The manager gained a combined
/// switch-and-move call after `switch_desktop`.
pub struct Manager(IVirtualDesktopManagerInternal);

impl DesktopManager for Manager {
    type Native = IVirtualDesktop;

    const GENERATION: Generation = Generation::Win11V24H2;

    fn connect(shell: &ImmersiveShell) -> Result<Self> {
        shell.desktop_manager().map(Self)
    }

    fn current(&self) -> WinResult<IVirtualDesktop> {
        let mut desktop = None;
        let hr = unsafe { self.0.get_current_desktop(&mut desktop) };
        out_param(hr, desktop)
    }

    fn desktops(&self) -> WinResult<IObjectArray> {
        let mut desktops = None;
        let hr = unsafe { self.0.get_desktops(&mut desktops) };
        out_param(hr, desktops)
    }

    fn adjacent(&self, from: &IVirtualDesktop, direction: u32) -> WinResult<IVirtualDesktop> {
        let mut desktop = None;
        let hr = unsafe {
            self.0
                .get_adjacent_desktop(from.as_raw(), direction, &mut desktop)
        };
        out_param(hr, desktop)
    }

    fn switch(&self, desktop: &IVirtualDesktop) -> WinResult<()> {
        unsafe { self.0.switch_desktop(desktop.as_raw()) }.ok()
    }

    fn create(&self) -> WinResult<IVirtualDesktop> {
        let mut desktop = None;
        let hr = unsafe { self.0.create_desktop(&mut desktop) };
        out_param(hr, desktop)
    }

    fn remove(&self, desktop: &IVirtualDesktop, fallback: &IVirtualDesktop) -> WinResult<()> {
        unsafe { self.0.remove_desktop(desktop.as_raw(), fallback.as_raw()) }.ok()
    }

    fn find(&self, id: &GUID) -> WinResult<IVirtualDesktop> {
        let mut desktop = None;
        let hr = unsafe { self.0.find_desktop(id, &mut desktop) };
        out_param(hr, desktop)
    }

    fn set_name(&self, desktop: &IVirtualDesktop, name: &HSTRING) -> WinResult<()> {
        unsafe { self.0.set_desktop_name(desktop.as_raw(), raw_hstring(name)) }.ok()
    }

    fn move_view(&self, view: &IUnknown, desktop: &IVirtualDesktop) -> WinResult<()> {
        unsafe { self.0.move_view_to_desktop(view.as_raw(), desktop.as_raw()) }.ok()
    }

    fn move_desktop(&self, desktop: &IVirtualDesktop, index: u32) -> WinResult<()> {
        unsafe { self.0.move_desktop(desktop.as_raw(), index) }.ok()
    }

    fn set_wallpaper(&self, desktop: &IVirtualDesktop, path: &HSTRING) -> WinResult<()> {
        unsafe { self.0.set_desktop_wallpaper(desktop.as_raw(), raw_hstring(path)) }.ok()
    }
}

pub type Adapter = ShellAdapter<Manager>;
