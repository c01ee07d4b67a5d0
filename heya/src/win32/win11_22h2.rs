use std::ffi::c_void;

use windows::core::{interface, Interface, IUnknown, IUnknown_Vtbl, GUID, HRESULT, HSTRING};
use windows::Win32::UI::Shell::Common::IObjectArray;

use super::com::{desktop_id, name_from, native_error, out_param, raw_hstring, ImmersiveShell};
use super::shell::{DesktopManager, ShellAdapter};
use crate::adapter::Generation;
use crate::core::{DesktopId, NativeDesktop};
use crate::error::Result;

type WinResult<T> = windows::core::Result<T>;

#[interface("3F07F4BE-B107-441A-AF0F-39D82529072C")]
pub unsafe trait IVirtualDesktop: IUnknown {
    pub unsafe fn is_view_visible(&self, view: *mut c_void, visible: *mut i32) -> HRESULT;
    pub unsafe fn get_id(&self, id: *mut GUID) -> HRESULT;
    pub unsafe fn get_name(&self, name: *mut HSTRING) -> HRESULT;
    pub unsafe fn get_wallpaper_path(&self, path: *mut HSTRING) -> HRESULT;
    pub unsafe fn is_remote(&self, remote: *mut i32) -> HRESULT;
}

#[interface("A3175F2D-239C-4BD2-8AA0-EEBA8B0B138E")]
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

impl NativeDesktop for IVirtualDesktop {
    fn id(&self) -> Result<DesktopId> {
        let mut id = GUID::zeroed();
        unsafe { self.get_id(&mut id) }
            .ok()
            .map_err(|e| native_error("GetId", e))?;
        Ok(desktop_id(id))
    }

    fn name(&self) -> Result<Option<String>> {
        let mut name = HSTRING::new();
        unsafe { self.get_name(&mut name) }
            .ok()
            .map_err(|e| native_error("GetName", e))?;
        Ok(name_from(name))
    }
}

pub struct Manager(IVirtualDesktopManagerInternal);

impl DesktopManager for Manager {
    type Native = IVirtualDesktop;

    const GENERATION: Generation = Generation::Win11V22H2;

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
