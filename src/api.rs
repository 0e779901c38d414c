//! One binding per `offreg.dll` export.
//!
//! Every binding forwards its arguments in native order, passes null optional
//! pointers through untouched, and returns the native status word unchanged.
//! The first call of a binding resolves its export; if `offreg.dll` or the
//! export is missing, that call panics (see [`crate::LoadError`]). Use
//! [`load`] or [`find_all`] to check availability without panicking.
//!
//! Reference: <https://learn.microsoft.com/en-us/windows/win32/devnotes/offline-registry-library-functions>

#![allow(non_snake_case)]

use std::mem;

use log::trace;

use crate::LoadError;
use crate::loader::{LazyProc, OFFREG};
use crate::types::{
    FileTime, HiveHandle, KeyHandle, KeyLike, PSECURITY_DESCRIPTOR, SECURITY_INFORMATION, Status,
};

static OR_CLOSE_HIVE: LazyProc = LazyProc::new(&OFFREG, "ORCloseHive");
static OR_CLOSE_KEY: LazyProc = LazyProc::new(&OFFREG, "ORCloseKey");
static OR_CREATE_HIVE: LazyProc = LazyProc::new(&OFFREG, "ORCreateHive");
static OR_CREATE_KEY: LazyProc = LazyProc::new(&OFFREG, "ORCreateKey");
static OR_DELETE_KEY: LazyProc = LazyProc::new(&OFFREG, "ORDeleteKey");
static OR_DELETE_VALUE: LazyProc = LazyProc::new(&OFFREG, "ORDeleteValue");
static OR_ENUM_KEY: LazyProc = LazyProc::new(&OFFREG, "OREnumKey");
static OR_ENUM_VALUE: LazyProc = LazyProc::new(&OFFREG, "OREnumValue");
static OR_GET_KEY_SECURITY: LazyProc = LazyProc::new(&OFFREG, "ORGetKeySecurity");
static OR_GET_VALUE: LazyProc = LazyProc::new(&OFFREG, "ORGetValue");
static OR_GET_VERSION: LazyProc = LazyProc::new(&OFFREG, "ORGetVersion");
static OR_GET_VIRTUAL_FLAGS: LazyProc = LazyProc::new(&OFFREG, "ORGetVirtualFlags");
static OR_OPEN_HIVE: LazyProc = LazyProc::new(&OFFREG, "OROpenHive");
static OR_OPEN_KEY: LazyProc = LazyProc::new(&OFFREG, "OROpenKey");
static OR_QUERY_INFO_KEY: LazyProc = LazyProc::new(&OFFREG, "ORQueryInfoKey");
static OR_SAVE_HIVE: LazyProc = LazyProc::new(&OFFREG, "ORSaveHive");
static OR_SET_KEY_SECURITY: LazyProc = LazyProc::new(&OFFREG, "ORSetKeySecurity");
static OR_SET_VALUE: LazyProc = LazyProc::new(&OFFREG, "ORSetValue");
static OR_SET_VIRTUAL_FLAGS: LazyProc = LazyProc::new(&OFFREG, "ORSetVirtualFlags");

static PROCEDURES: [&LazyProc; 19] = [
    &OR_CLOSE_HIVE,
    &OR_CLOSE_KEY,
    &OR_CREATE_HIVE,
    &OR_CREATE_KEY,
    &OR_DELETE_KEY,
    &OR_DELETE_VALUE,
    &OR_ENUM_KEY,
    &OR_ENUM_VALUE,
    &OR_GET_KEY_SECURITY,
    &OR_GET_VALUE,
    &OR_GET_VERSION,
    &OR_GET_VIRTUAL_FLAGS,
    &OR_OPEN_HIVE,
    &OR_OPEN_KEY,
    &OR_QUERY_INFO_KEY,
    &OR_SAVE_HIVE,
    &OR_SET_KEY_SECURITY,
    &OR_SET_VALUE,
    &OR_SET_VIRTUAL_FLAGS,
];

/// Load `offreg.dll` now.
pub fn load() -> Result<(), LoadError> {
    OFFREG.load().map(|_| ())
}

/// Load `offreg.dll` and resolve every export the bindings use.
pub fn find_all() -> Result<(), LoadError> {
    for proc in PROCEDURES {
        proc.find()?;
    }
    Ok(())
}

/// Whether `offreg.dll` can be loaded on this host.
pub fn is_available() -> bool {
    load().is_ok()
}

#[inline]
fn traced(proc: &LazyProc, status: Status) -> Status {
    if !status.is_success() {
        trace!("{} returned {}", proc.name(), status);
    }
    status
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orclosehive>
///
/// # Safety
///
/// `handle` must be an open hive handle. It must not be used afterwards.
pub unsafe fn ORCloseHive(
    // _In_ ORHKEY Handle
    handle: HiveHandle,
) -> Status {
    type Proc = unsafe extern "system" fn(HiveHandle) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_CLOSE_HIVE.addr()) };
    let status = unsafe { proc(handle) };
    traced(&OR_CLOSE_HIVE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orclosekey>
///
/// # Safety
///
/// `handle` must be an open key handle. It must not be used afterwards.
pub unsafe fn ORCloseKey(
    // _In_ ORHKEY Handle
    handle: KeyHandle,
) -> Status {
    type Proc = unsafe extern "system" fn(KeyHandle) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_CLOSE_KEY.addr()) };
    let status = unsafe { proc(handle) };
    traced(&OR_CLOSE_KEY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orcreatehive>
///
/// On success `*result` is a hive handle for an empty tree, to be released
/// with [`ORCloseHive`].
///
/// # Safety
///
/// `result` must be valid for a pointer-sized write.
pub unsafe fn ORCreateHive(
    // _Out_ PORHKEY phkResult
    result: *mut HiveHandle,
) -> Status {
    type Proc = unsafe extern "system" fn(*mut HiveHandle) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_CREATE_HIVE.addr()) };
    let status = unsafe { proc(result) };
    traced(&OR_CREATE_HIVE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orcreatekey>
///
/// Creates `sub_key` under `parent`, or opens it if it exists; `*disposition`
/// (when requested) is `REG_CREATED_NEW_KEY` or `REG_OPENED_EXISTING_KEY`.
///
/// # Safety
///
/// `parent` must be open, `sub_key` a valid wide string, and every non-null
/// pointer valid for the access the native prototype declares.
#[allow(clippy::too_many_arguments)]
pub unsafe fn ORCreateKey(
    // _In_      ORHKEY               Handle,
    // _In_      PCWSTR               lpSubKey,
    // _In_opt_  PWSTR                lpClass,
    // _In_opt_  DWORD                dwOptions,
    // _In_opt_  PSECURITY_DESCRIPTOR pSecurityDescriptor,
    // _Out_     PORHKEY              phkResult,
    // _Out_opt_ PDWORD               pdwDisposition
    parent: impl KeyLike,
    sub_key: *const u16,
    class: *const u16,
    options: u32,
    security_descriptor: PSECURITY_DESCRIPTOR,
    result: *mut KeyHandle,
    disposition: *mut u32,
) -> Status {
    type Proc = unsafe extern "system" fn(
        usize,
        *const u16,
        *const u16,
        u32,
        PSECURITY_DESCRIPTOR,
        *mut KeyHandle,
        *mut u32,
    ) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_CREATE_KEY.addr()) };
    let status = unsafe {
        proc(
            parent.raw_key(),
            sub_key,
            class,
            options,
            security_descriptor,
            result,
            disposition,
        )
    };
    traced(&OR_CREATE_KEY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/ordeletekey>
///
/// # Safety
///
/// `parent` must be open; `sub_key` null or a valid wide string.
pub unsafe fn ORDeleteKey(
    // _In_     ORHKEY Handle,
    // _In_opt_ PCWSTR lpSubKey
    parent: impl KeyLike,
    sub_key: *const u16,
) -> Status {
    type Proc = unsafe extern "system" fn(usize, *const u16) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_DELETE_KEY.addr()) };
    let status = unsafe { proc(parent.raw_key(), sub_key) };
    traced(&OR_DELETE_KEY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/ordeletevalue>
///
/// # Safety
///
/// `key` must be open; `value_name` null or a valid wide string.
pub unsafe fn ORDeleteValue(
    // _In_     ORHKEY Handle,
    // _In_opt_ PCWSTR lpValueName
    key: impl KeyLike,
    value_name: *const u16,
) -> Status {
    type Proc = unsafe extern "system" fn(usize, *const u16) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_DELETE_VALUE.addr()) };
    let status = unsafe { proc(key.raw_key(), value_name) };
    traced(&OR_DELETE_VALUE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orenumkey>
///
/// Returns `ERROR_NO_MORE_ITEMS` once `index` reaches the subkey count and
/// `ERROR_MORE_DATA` when a buffer is too small. Counts are in characters.
///
/// # Safety
///
/// `key` must be open; `name` must hold `*name_len` characters; optional
/// pointers must be null or valid for the declared access.
#[allow(clippy::too_many_arguments)]
pub unsafe fn OREnumKey(
    // _In_        ORHKEY    Handle,
    // _In_        DWORD     dwIndex,
    // _Out_       PWSTR     lpName,
    // _Inout_     PDWORD    lpcName,
    // _Out_opt_   PWSTR     lpClass,
    // _Inout_opt_ PDWORD    lpcClass,
    // _Out_opt_   PFILETIME lpftLastWriteTime
    key: impl KeyLike,
    index: u32,
    name: *mut u16,
    name_len: *mut u32,
    class: *mut u16,
    class_len: *mut u32,
    last_write_time: *mut FileTime,
) -> Status {
    type Proc = unsafe extern "system" fn(
        usize,
        u32,
        *mut u16,
        *mut u32,
        *mut u16,
        *mut u32,
        *mut FileTime,
    ) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_ENUM_KEY.addr()) };
    let status = unsafe {
        proc(
            key.raw_key(),
            index,
            name,
            name_len,
            class,
            class_len,
            last_write_time,
        )
    };
    traced(&OR_ENUM_KEY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orenumvalue>
///
/// Same indexing and sizing rules as [`OREnumKey`]; `*data_len` is in bytes.
///
/// # Safety
///
/// `key` must be open; `value_name` must hold `*value_name_len` characters;
/// optional pointers must be null or valid for the declared access.
#[allow(clippy::too_many_arguments)]
pub unsafe fn OREnumValue(
    // _In_        ORHKEY Handle,
    // _In_        DWORD  dwIndex,
    // _Out_       PWSTR  lpValueName,
    // _Inout_     PDWORD lpcValueName,
    // _Out_opt_   PDWORD lpType,
    // _Out_opt_   PBYTE  lpData,
    // _Inout_opt_ PDWORD lpcbData
    key: impl KeyLike,
    index: u32,
    value_name: *mut u16,
    value_name_len: *mut u32,
    value_type: *mut u32,
    data: *mut u8,
    data_len: *mut u32,
) -> Status {
    type Proc = unsafe extern "system" fn(
        usize,
        u32,
        *mut u16,
        *mut u32,
        *mut u32,
        *mut u8,
        *mut u32,
    ) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_ENUM_VALUE.addr()) };
    let status = unsafe {
        proc(
            key.raw_key(),
            index,
            value_name,
            value_name_len,
            value_type,
            data,
            data_len,
        )
    };
    traced(&OR_ENUM_VALUE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orgetkeysecurity>
///
/// # Safety
///
/// `key` must be open; `security_descriptor` null or valid for
/// `*security_descriptor_len` bytes; `security_descriptor_len` valid.
pub unsafe fn ORGetKeySecurity(
    // _In_      ORHKEY               Handle,
    // _In_      SECURITY_INFORMATION SecurityInformation,
    // _Out_opt_ PSECURITY_DESCRIPTOR pSecurityDescriptor,
    // _Inout_   PDWORD               lpcbSecurityDescriptor
    key: impl KeyLike,
    security_information: SECURITY_INFORMATION,
    security_descriptor: PSECURITY_DESCRIPTOR,
    security_descriptor_len: *mut u32,
) -> Status {
    type Proc = unsafe extern "system" fn(
        usize,
        SECURITY_INFORMATION,
        PSECURITY_DESCRIPTOR,
        *mut u32,
    ) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_GET_KEY_SECURITY.addr()) };
    let status = unsafe {
        proc(
            key.raw_key(),
            security_information,
            security_descriptor,
            security_descriptor_len,
        )
    };
    traced(&OR_GET_KEY_SECURITY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orgetvalue>
///
/// A null `value_name` reads the key's default value. With `data` null and
/// `data_len` non-null, reports the required size.
///
/// # Safety
///
/// `key` must be open; string pointers null or valid wide strings; `data`
/// null or valid for `*data_len` bytes.
pub unsafe fn ORGetValue(
    // _In_        ORHKEY Handle,
    // _In_opt_    PCWSTR lpSubKey,
    // _In_opt_    PCWSTR lpValue,
    // _Out_opt_   PDWORD pdwType,
    // _Out_opt_   PVOID  pvData,
    // _Inout_opt_ PDWORD pcbData
    key: impl KeyLike,
    sub_key: *const u16,
    value_name: *const u16,
    value_type: *mut u32,
    data: *mut u8,
    data_len: *mut u32,
) -> Status {
    type Proc = unsafe extern "system" fn(
        usize,
        *const u16,
        *const u16,
        *mut u32,
        *mut u8,
        *mut u32,
    ) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_GET_VALUE.addr()) };
    let status = unsafe {
        proc(
            key.raw_key(),
            sub_key,
            value_name,
            value_type,
            data,
            data_len,
        )
    };
    traced(&OR_GET_VALUE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orgetversion>
///
/// Hive format version `offreg.dll` operates in. There is no status.
///
/// # Safety
///
/// Both pointers must be valid for a `u32` write.
pub unsafe fn ORGetVersion(
    // _Out_ PDWORD pdwMajorVersion,
    // _Out_ PDWORD pdwMinorVersion
    major: *mut u32,
    minor: *mut u32,
) {
    type Proc = unsafe extern "system" fn(*mut u32, *mut u32);

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_GET_VERSION.addr()) };
    unsafe { proc(major, minor) }
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orgetvirtualflags>
///
/// # Safety
///
/// `key` must be open; `flags` valid for a `u32` write.
pub unsafe fn ORGetVirtualFlags(
    // _In_  ORHKEY Handle,
    // _Out_ PDWORD pdwFlags
    key: impl KeyLike,
    flags: *mut u32,
) -> Status {
    type Proc = unsafe extern "system" fn(usize, *mut u32) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_GET_VIRTUAL_FLAGS.addr()) };
    let status = unsafe { proc(key.raw_key(), flags) };
    traced(&OR_GET_VIRTUAL_FLAGS, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/oropenhive>
///
/// # Safety
///
/// `path` must be a valid wide string; `result` valid for a pointer-sized write.
pub unsafe fn OROpenHive(
    // _In_  PCWSTR  lpHivePath,
    // _Out_ PORHKEY phkResult
    path: *const u16,
    result: *mut HiveHandle,
) -> Status {
    type Proc = unsafe extern "system" fn(*const u16, *mut HiveHandle) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_OPEN_HIVE.addr()) };
    let status = unsafe { proc(path, result) };
    traced(&OR_OPEN_HIVE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/oropenkey>
///
/// # Safety
///
/// `parent` must be open; `sub_key` null or a valid wide string; `result`
/// valid for a pointer-sized write.
pub unsafe fn OROpenKey(
    // _In_     ORHKEY  Handle,
    // _In_opt_ PCWSTR  lpSubKeyName,
    // _Out_    PORHKEY phkResult
    parent: impl KeyLike,
    sub_key: *const u16,
    result: *mut KeyHandle,
) -> Status {
    type Proc = unsafe extern "system" fn(usize, *const u16, *mut KeyHandle) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_OPEN_KEY.addr()) };
    let status = unsafe { proc(parent.raw_key(), sub_key, result) };
    traced(&OR_OPEN_KEY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orqueryinfokey>
///
/// # Safety
///
/// `key` must be open; every non-null pointer valid for the declared access.
#[allow(clippy::too_many_arguments)]
pub unsafe fn ORQueryInfoKey(
    // _In_        ORHKEY    Handle,
    // _Out_opt_   PWSTR     lpClass,
    // _Inout_opt_ PDWORD    lpcClass,
    // _Out_opt_   PDWORD    lpcSubKeys,
    // _Out_opt_   PDWORD    lpcMaxSubKeyLen,
    // _Out_opt_   PDWORD    lpcMaxClassLen,
    // _Out_opt_   PDWORD    lpcValues,
    // _Out_opt_   PDWORD    lpcMaxValueNameLen,
    // _Out_opt_   PDWORD    lpcMaxValueLen,
    // _Out_opt_   PDWORD    lpcbSecurityDescriptor,
    // _Out_opt_   PFILETIME lpftLastWriteTime
    key: impl KeyLike,
    class: *mut u16,
    class_len: *mut u32,
    sub_keys: *mut u32,
    max_sub_key_len: *mut u32,
    max_class_len: *mut u32,
    values: *mut u32,
    max_value_name_len: *mut u32,
    max_value_len: *mut u32,
    security_descriptor_len: *mut u32,
    last_write_time: *mut FileTime,
) -> Status {
    type Proc = unsafe extern "system" fn(
        usize,
        *mut u16,
        *mut u32,
        *mut u32,
        *mut u32,
        *mut u32,
        *mut u32,
        *mut u32,
        *mut u32,
        *mut u32,
        *mut FileTime,
    ) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_QUERY_INFO_KEY.addr()) };
    let status = unsafe {
        proc(
            key.raw_key(),
            class,
            class_len,
            sub_keys,
            max_sub_key_len,
            max_class_len,
            values,
            max_value_name_len,
            max_value_len,
            security_descriptor_len,
            last_write_time,
        )
    };
    traced(&OR_QUERY_INFO_KEY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orsavehive>
///
/// Writes the hive to `path`, stamped as produced by OS `os_major.os_minor`.
/// The target file must not exist. The hive handle stays open.
///
/// # Safety
///
/// `hive` must be open; `path` a valid wide string.
pub unsafe fn ORSaveHive(
    // _In_ ORHKEY Handle,
    // _In_ PCWSTR lpHivePath,
    // _In_ DWORD  dwOsMajorVersion,
    // _In_ DWORD  dwOsMinorVersion
    hive: HiveHandle,
    path: *const u16,
    os_major: u32,
    os_minor: u32,
) -> Status {
    type Proc = unsafe extern "system" fn(HiveHandle, *const u16, u32, u32) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_SAVE_HIVE.addr()) };
    let status = unsafe { proc(hive, path, os_major, os_minor) };
    traced(&OR_SAVE_HIVE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orsetkeysecurity>
///
/// # Safety
///
/// `key` must be open; `security_descriptor` must point to a valid
/// self-relative security descriptor.
pub unsafe fn ORSetKeySecurity(
    // _In_ ORHKEY               Handle,
    // _In_ SECURITY_INFORMATION SecurityInformation,
    // _In_ PSECURITY_DESCRIPTOR pSecurityDescriptor
    key: impl KeyLike,
    security_information: SECURITY_INFORMATION,
    security_descriptor: PSECURITY_DESCRIPTOR,
) -> Status {
    type Proc =
        unsafe extern "system" fn(usize, SECURITY_INFORMATION, PSECURITY_DESCRIPTOR) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_SET_KEY_SECURITY.addr()) };
    let status = unsafe { proc(key.raw_key(), security_information, security_descriptor) };
    traced(&OR_SET_KEY_SECURITY, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orsetvalue>
///
/// The payload must already be encoded for `value_type`: string variants
/// include their terminating null, integers are little-endian, and
/// `REG_MULTI_SZ` ends with an empty string.
///
/// # Safety
///
/// `key` must be open; `value_name` null or a valid wide string; `data` null
/// or valid for `data_len` bytes.
pub unsafe fn ORSetValue(
    // _In_     ORHKEY Handle,
    // _In_opt_ PCWSTR lpValueName,
    // _In_     DWORD  dwType,
    // _In_opt_ const BYTE *lpData,
    // _In_     DWORD  cbData
    key: impl KeyLike,
    value_name: *const u16,
    value_type: u32,
    data: *const u8,
    data_len: u32,
) -> Status {
    type Proc = unsafe extern "system" fn(usize, *const u16, u32, *const u8, u32) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_SET_VALUE.addr()) };
    let status = unsafe { proc(key.raw_key(), value_name, value_type, data, data_len) };
    traced(&OR_SET_VALUE, status)
}

/// <https://learn.microsoft.com/en-us/windows/win32/devnotes/orsetvirtualflags>
///
/// # Safety
///
/// `key` must be open.
pub unsafe fn ORSetVirtualFlags(
    // _In_ ORHKEY Handle,
    // _In_ DWORD  dwFlags
    key: impl KeyLike,
    flags: u32,
) -> Status {
    type Proc = unsafe extern "system" fn(usize, u32) -> Status;

    let proc = unsafe { mem::transmute::<usize, Proc>(OR_SET_VIRTUAL_FLAGS.addr()) };
    let status = unsafe { proc(key.raw_key(), flags) };
    traced(&OR_SET_VIRTUAL_FLAGS, status)
}
