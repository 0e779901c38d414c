//! `LoadLibraryW` / `GetProcAddress` resolution.

use std::ffi::{CString, c_void};

use windows::Win32::Foundation::{GetLastError, HMODULE};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{PCSTR, PCWSTR};

use crate::LoadError;

/// Win32 code carried by an `HRESULT_FROM_WIN32` value, or the raw `HRESULT`.
fn win32_code(err: &windows::core::Error) -> u32 {
    let hr = err.code().0 as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        hr & 0xFFFF
    } else {
        hr
    }
}

/// Load a library through the standard DLL search order.
pub(super) fn load_library(name: &'static str) -> Result<usize, LoadError> {
    let wide: Vec<u16> = name.encode_utf16().chain(Some(0)).collect();

    let module = unsafe { LoadLibraryW(PCWSTR(wide.as_ptr())) }.map_err(|e| LoadError::Library {
        name,
        code: win32_code(&e),
    })?;

    Ok(module.0 as usize)
}

/// Look up an export by name in a loaded module.
pub(super) fn find_proc(
    module: usize,
    library: &'static str,
    name: &'static str,
) -> Result<usize, LoadError> {
    let symbol = CString::new(name).map_err(|_| LoadError::Procedure {
        name,
        library,
        code: 0,
    })?;

    let proc = unsafe {
        GetProcAddress(
            HMODULE(module as *mut c_void),
            PCSTR(symbol.as_ptr().cast()),
        )
    };

    match proc {
        Some(proc) => Ok(proc as usize),
        None => Err(LoadError::Procedure {
            name,
            library,
            code: unsafe { GetLastError() }.0,
        }),
    }
}
