use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_ALL};
use windows::Win32::UI::Shell::{IVirtualDesktopManager, VirtualDesktopManager};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetForegroundWindow, GetWindow, GetWindowLongW, IsIconic, IsWindowVisible,
    SetForegroundWindow, ShowWindow, GWL_EXSTYLE, GW_OWNER, SW_RESTORE, WS_EX_TOOLWINDOW,
};

use super::com::{desktop_id, hwnd, native_error};
use crate::core::{DesktopId, WindowRef};
use crate::error::{DesktopError, Result};
use crate::platform::WindowSystem;

/// Top-level windows through the public desktop manager, which tells
/// which desktop a window belongs to even while it is cloaked.
pub struct Win32WindowSystem {
    manager: IVirtualDesktopManager,
}

impl Win32WindowSystem {
    pub fn new() -> Result<Self> {
        let manager = unsafe { CoCreateInstance(&VirtualDesktopManager, None, CLSCTX_ALL) }
            .map_err(|e| native_error("CoCreateInstance(VirtualDesktopManager)", e))?;
        Ok(Self { manager })
    }

    fn desktop_of(&self, window: HWND) -> Option<DesktopId> {
        unsafe { self.manager.GetWindowDesktopId(window) }
            .ok()
            .map(desktop_id)
    }
}

impl WindowSystem for Win32WindowSystem {
    fn foreground_window(&self) -> Option<WindowRef> {
        let window = unsafe { GetForegroundWindow() };
        WindowRef::new(window.0 as isize)
    }

    fn windows_on_desktop(&self, desktop: DesktopId) -> Vec<WindowRef> {
        app_windows()
            .into_iter()
            .filter(|w| self.desktop_of(*w) == Some(desktop))
            .filter_map(|w| WindowRef::new(w.0 as isize))
            .collect()
    }

    fn focus_window(&self, window: WindowRef) -> Result<()> {
        let handle = hwnd(window);
        unsafe {
            if IsIconic(handle).as_bool() {
                let _ = ShowWindow(handle, SW_RESTORE);
            }
            if !SetForegroundWindow(handle).as_bool() {
                return Err(DesktopError::native(
                    "SetForegroundWindow",
                    format!("window {} was not brought to the foreground", window),
                ));
            }
        }
        Ok(())
    }
}

/// Visible, unowned, non-tool top-level windows in z-order.
fn app_windows() -> Vec<HWND> {
    let mut windows: Vec<HWND> = Vec::new();
    let result = unsafe {
        EnumWindows(
            Some(collect_window),
            LPARAM(&mut windows as *mut Vec<HWND> as isize),
        )
    };
    if let Err(e) = result {
        tracing::warn!("EnumWindows failed: {}", e);
    }
    windows.into_iter().filter(|w| is_app_window(*w)).collect()
}

unsafe extern "system" fn collect_window(window: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<HWND>);
    windows.push(window);
    TRUE
}

fn is_app_window(window: HWND) -> bool {
    unsafe {
        if !IsWindowVisible(window).as_bool() {
            return false;
        }
        if matches!(GetWindow(window, GW_OWNER), Ok(owner) if !owner.is_invalid()) {
            return false;
        }
        let ex_style = GetWindowLongW(window, GWL_EXSTYLE) as u32;
        ex_style & WS_EX_TOOLWINDOW.0 == 0
    }
}
