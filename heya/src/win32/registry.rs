use std::ffi::c_void;

use anyhow::{Context, Result};
use windows::core::{w, PCWSTR};
use windows::Win32::System::Registry::{
    RegGetValueW, HKEY_LOCAL_MACHINE, RRF_RT_REG_DWORD, RRF_RT_REG_SZ,
};

use crate::adapter::PlatformBuild;

const CURRENT_VERSION: PCWSTR = w!(r"SOFTWARE\Microsoft\Windows NT\CurrentVersion");

/// Reads the build number and update revision of the running OS.
pub fn current_build() -> Result<PlatformBuild> {
    let build = read_string(w!("CurrentBuildNumber"))?;
    let build: u32 = build
        .trim()
        .parse()
        .with_context(|| format!("Unexpected build number: {}", build))?;
    let revision = read_dword(w!("UBR")).unwrap_or_else(|e| {
        tracing::warn!("Failed to read update revision: {}", e);
        0
    });
    Ok(PlatformBuild::new(build, revision))
}

fn read_dword(name: PCWSTR) -> Result<u32> {
    let mut value = 0u32;
    let mut size = std::mem::size_of::<u32>() as u32;
    unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            CURRENT_VERSION,
            name,
            RRF_RT_REG_DWORD,
            None,
            Some(&mut value as *mut u32 as *mut c_void),
            Some(&mut size),
        )
    }
    .ok()
    .context("RegGetValueW failed")?;
    Ok(value)
}

fn read_string(name: PCWSTR) -> Result<String> {
    let mut buffer = [0u16; 64];
    let mut size = std::mem::size_of_val(&buffer) as u32;
    unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            CURRENT_VERSION,
            name,
            RRF_RT_REG_SZ,
            None,
            Some(buffer.as_mut_ptr() as *mut c_void),
            Some(&mut size),
        )
    }
    .ok()
    .context("RegGetValueW failed")?;

    // The size includes the terminating null.
    let len = (size as usize / 2).saturating_sub(1);
    Ok(String::from_utf16_lossy(&buffer[..len]))
}
