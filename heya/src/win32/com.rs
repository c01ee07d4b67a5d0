use std::ffi::c_void;

use windows::core::{interface, Interface, IUnknown, IUnknown_Vtbl, GUID, HRESULT, HSTRING, PCWSTR};
use windows::Win32::Foundation::{E_POINTER, HWND};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, IServiceProvider, CLSCTX_LOCAL_SERVER,
    COINIT_MULTITHREADED,
};
use windows::Win32::UI::Shell::Common::IObjectArray;

use heya_ipc::Direction;

use crate::core::{DesktopId, WindowRef};
use crate::error::{DesktopError, Result};

const CLSID_IMMERSIVE_SHELL: GUID = GUID::from_u128(0xC2F03A33_21F5_47FA_B4BB_156362A2F239);
const CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL: GUID =
    GUID::from_u128(0xC5E0CDCA_7B6E_41B2_9FC4_D93975CC467B);

/// Adjacent-desktop direction code of the native manager.
pub fn direction_code(direction: Direction) -> u32 {
    match direction {
        Direction::Left => 3,
        Direction::Right => 4,
    }
}

#[interface("1841C6D7-4F9D-42C0-AF41-8747538F10E5")]
pub unsafe trait IApplicationViewCollection: IUnknown {
    pub unsafe fn get_views(&self, views: *mut Option<IObjectArray>) -> HRESULT;
    pub unsafe fn get_views_by_z_order(&self, views: *mut Option<IObjectArray>) -> HRESULT;
    pub unsafe fn get_views_by_app_user_model_id(
        &self,
        id: PCWSTR,
        views: *mut Option<IObjectArray>,
    ) -> HRESULT;
    pub unsafe fn get_view_for_hwnd(&self, window: HWND, view: *mut Option<IUnknown>) -> HRESULT;
}

/// Multithreaded COM apartment for the current thread, left on drop.
pub struct ComApartment;

impl ComApartment {
    pub fn init() -> anyhow::Result<Self> {
        unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }.ok()?;
        Ok(Self)
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Service provider of the immersive shell, the entry point to every
/// undocumented desktop interface.
pub struct ImmersiveShell {
    provider: IServiceProvider,
}

impl ImmersiveShell {
    pub fn connect() -> Result<Self> {
        let provider = unsafe { CoCreateInstance(&CLSID_IMMERSIVE_SHELL, None, CLSCTX_LOCAL_SERVER) }
            .map_err(|e| native_error("CoCreateInstance(ImmersiveShell)", e))?;
        Ok(Self { provider })
    }

    /// The internal desktop manager, queried with the interface id `T`
    /// declares for this generation.
    pub fn desktop_manager<T: Interface>(&self) -> Result<T> {
        unsafe {
            self.provider
                .QueryService::<T>(&CLSID_VIRTUAL_DESKTOP_MANAGER_INTERNAL)
        }
        .map_err(|e| native_error("QueryService(VirtualDesktopManagerInternal)", e))
    }

    pub fn view_collection(&self) -> Result<IApplicationViewCollection> {
        unsafe {
            self.provider
                .QueryService::<IApplicationViewCollection>(&IApplicationViewCollection::IID)
        }
        .map_err(|e| native_error("QueryService(ApplicationViewCollection)", e))
    }
}

pub fn native_error(call: &'static str, error: windows::core::Error) -> DesktopError {
    DesktopError::native(call, error.to_string())
}

/// Unwraps an interface out-parameter written by a successful call.
pub fn out_param<T>(hr: HRESULT, value: Option<T>) -> windows::core::Result<T> {
    hr.ok()?;
    value.ok_or_else(|| E_POINTER.into())
}

pub fn collect_array<T: Interface>(call: &'static str, array: IObjectArray) -> Result<Vec<T>> {
    let count = unsafe { array.GetCount() }.map_err(|e| native_error(call, e))?;
    (0..count)
        .map(|i| unsafe { array.GetAt::<T>(i) }.map_err(|e| native_error(call, e)))
        .collect()
}

pub fn hwnd(window: WindowRef) -> HWND {
    HWND(window.raw() as *mut c_void)
}

/// The application view backing `window`, as passed to the desktop manager.
pub fn view_for_window(
    views: &IApplicationViewCollection,
    window: WindowRef,
) -> Result<IUnknown> {
    let mut view = None;
    let hr = unsafe { views.get_view_for_hwnd(hwnd(window), &mut view) };
    match (hr.is_ok(), view) {
        (true, Some(view)) => Ok(view),
        _ => Err(DesktopError::WindowNotFound(window)),
    }
}

pub fn desktop_id(guid: GUID) -> DesktopId {
    DesktopId::from_u128(guid.to_u128())
}

pub fn guid(id: DesktopId) -> GUID {
    GUID::from_u128(id.as_u128())
}

pub fn name_from(name: HSTRING) -> Option<String> {
    let name = name.to_string_lossy();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Borrows an `HSTRING` as the raw handle the vtables take. The string
/// must outlive the call.
pub fn raw_hstring(value: &HSTRING) -> *mut c_void {
    unsafe { std::mem::transmute_copy(value) }
}
