//! RAII wrappers over `offreg` handles.
//!
//! These own the buffer-sizing loops the raw bindings leave to the caller:
//! query sizes first, allocate, and retry with the reported size on
//! `ERROR_MORE_DATA`.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::ptr;

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use tempfile::TempDir;

use offreg::{
    ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS, FileTime, HiveHandle, KeyHandle, KeyLike,
    ORCloseHive, ORCloseKey, ORCreateHive, ORCreateKey, ORDeleteKey, ORDeleteValue, OREnumKey,
    OREnumValue, OROpenHive, OROpenKey, ORQueryInfoKey, ORSaveHive, ORSetValue, Status,
};

/// Convert a string to a null-terminated UTF-16 buffer.
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}

fn path_to_wide(path: &Path) -> Vec<u16> {
    to_wide(&path.to_string_lossy())
}

/// Null for the default (unnamed) value, otherwise a wide string.
fn optional_wide(name: &str) -> Option<Vec<u16>> {
    (!name.is_empty()).then(|| to_wide(name))
}

fn optional_ptr(wide: &Option<Vec<u16>>) -> *const u16 {
    wide.as_ref().map_or(ptr::null(), |w| w.as_ptr())
}

/// Split a `\`-separated key path, ignoring empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('\\').filter(|s| !s.is_empty())
}

fn check(status: Status, call: &str, subject: impl std::fmt::Display) -> Result<()> {
    if status != ERROR_SUCCESS {
        bail!("{call} failed for {subject}: {status}");
    }
    Ok(())
}

/// An open hive, closed on drop.
pub struct Hive(HiveHandle);

impl Hive {
    pub fn create() -> Result<Self> {
        let mut handle = HiveHandle::default();
        check(unsafe { ORCreateHive(&mut handle) }, "ORCreateHive", "new hive")?;
        Ok(Self(handle))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let wide = path_to_wide(path);
        let mut handle = HiveHandle::default();
        check(
            unsafe { OROpenHive(wide.as_ptr(), &mut handle) },
            "OROpenHive",
            path.display(),
        )?;
        debug!("Opened hive {}", path.display());
        Ok(Self(handle))
    }

    #[inline]
    pub fn root(&self) -> HiveHandle {
        self.0
    }

    /// Write the hive to a path that does not exist yet.
    pub fn save(&self, path: &Path, (major, minor): (u32, u32)) -> Result<()> {
        let wide = path_to_wide(path);
        check(
            unsafe { ORSaveHive(self.0, wide.as_ptr(), major, minor) },
            "ORSaveHive",
            path.display(),
        )?;
        debug!("Saved hive {} (stamp {major}.{minor})", path.display());
        Ok(())
    }

    /// Replace `path` with this hive's contents, closing the hive.
    ///
    /// `ORSaveHive` will not overwrite, so the hive is written into a fresh
    /// sibling directory and renamed over `path` once the hive is closed.
    pub fn save_in_place(self, path: &Path, stamp: (u32, u32)) -> Result<()> {
        let staging = staging_dir(path)?;
        let staged = staging
            .path()
            .join(path.file_name().unwrap_or(OsStr::new("hive")));

        self.save(&staged, stamp)?;
        drop(self);

        fs::rename(&staged, path).with_context(|| {
            format!("Failed to replace {} with {}", path.display(), staged.display())
        })?;
        Ok(())
    }
}

impl Drop for Hive {
    fn drop(&mut self) {
        let status = unsafe { ORCloseHive(self.0) };
        if status != ERROR_SUCCESS {
            warn!("ORCloseHive failed: {status}");
        }
    }
}

/// Uniquely named directory beside `path`, removed on drop.
fn staging_dir(path: &Path) -> Result<TempDir> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(".offreg-")
        .tempdir_in(parent)
        .with_context(|| format!("Failed to create a staging directory in {}", parent.display()))
}

/// An open key, closed on drop.
pub struct Key(KeyHandle);

impl Key {
    #[inline]
    pub fn handle(&self) -> KeyHandle {
        self.0
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        let status = unsafe { ORCloseKey(self.0) };
        if status != ERROR_SUCCESS {
            warn!("ORCloseKey failed: {status}");
        }
    }
}

/// A second handle to `parent` itself.
fn reopen(parent: impl KeyLike) -> Result<Key> {
    let mut handle = KeyHandle::default();
    check(
        unsafe { OROpenKey(parent, ptr::null(), &mut handle) },
        "OROpenKey",
        "\\",
    )?;
    Ok(Key(handle))
}

/// Open `path` below `parent`, one segment at a time.
///
/// A path without segments (`""`, `"\\"`) opens `parent` itself.
pub fn open_key(parent: impl KeyLike, path: &str) -> Result<Key> {
    let mut current = reopen(parent)?;
    let mut opened = String::new();

    for segment in segments(path) {
        let name = to_wide(segment);
        let mut handle = KeyHandle::default();
        let status = unsafe { OROpenKey(current.handle(), name.as_ptr(), &mut handle) };
        opened.push('\\');
        opened.push_str(segment);
        check(status, "OROpenKey", &opened)?;
        current = Key(handle);
    }
    Ok(current)
}

/// Create (or open) every segment of `path` below `parent`.
///
/// A path without segments opens `parent` itself, like [`open_key`].
pub fn create_key_path(parent: impl KeyLike, path: &str) -> Result<Key> {
    let mut current = reopen(parent)?;
    let mut created = String::new();

    for segment in segments(path) {
        let name = to_wide(segment);
        let mut handle = KeyHandle::default();
        let mut disposition = 0u32;
        let status = unsafe {
            ORCreateKey(
                current.handle(),
                name.as_ptr(),
                ptr::null(),
                0,
                ptr::null_mut(),
                &mut handle,
                &mut disposition,
            )
        };
        created.push('\\');
        created.push_str(segment);
        check(status, "ORCreateKey", &created)?;
        debug!("{created}: disposition {disposition}");
        current = Key(handle);
    }
    Ok(current)
}

/// Aggregate metadata from `ORQueryInfoKey`.
#[derive(Debug, Clone, Default)]
pub struct KeyInfo {
    pub class: String,
    pub sub_keys: u32,
    pub max_sub_key_len: u32,
    pub max_class_len: u32,
    pub values: u32,
    pub max_value_name_len: u32,
    pub max_value_len: u32,
    pub last_write_time: FileTime,
}

pub fn query_info(key: impl KeyLike) -> Result<KeyInfo> {
    let mut info = KeyInfo::default();
    let mut class = vec![0u16; 64];

    loop {
        let mut class_len = class.len() as u32;
        let mut security_len = 0u32;
        let status = unsafe {
            ORQueryInfoKey(
                key,
                class.as_mut_ptr(),
                &mut class_len,
                &mut info.sub_keys,
                &mut info.max_sub_key_len,
                &mut info.max_class_len,
                &mut info.values,
                &mut info.max_value_name_len,
                &mut info.max_value_len,
                &mut security_len,
                &mut info.last_write_time,
            )
        };
        if status == ERROR_MORE_DATA {
            class.resize(grow(class.len(), class_len as usize + 1), 0);
            continue;
        }
        check(status, "ORQueryInfoKey", "key")?;
        info.class = String::from_utf16_lossy(&class[..(class_len as usize).min(class.len())]);
        return Ok(info);
    }
}

/// Next buffer size: the reported requirement, and always larger than before.
fn grow(current: usize, required: usize) -> usize {
    required.max(current * 2).max(1)
}

#[derive(Debug, Clone)]
pub struct SubKey {
    pub name: String,
    pub class: String,
    pub last_write_time: FileTime,
}

pub fn sub_keys(key: impl KeyLike) -> Result<Vec<SubKey>> {
    let info = query_info(key)?;
    enum_sub_keys(
        key,
        info.max_sub_key_len as usize + 1,
        info.max_class_len as usize + 1,
    )
}

/// Enumerate with buffers of the given capacity, growing them as needed.
fn enum_sub_keys(key: impl KeyLike, name_cap: usize, class_cap: usize) -> Result<Vec<SubKey>> {
    let mut name = vec![0u16; name_cap.max(1)];
    let mut class = vec![0u16; class_cap.max(1)];
    let mut entries = Vec::new();
    let mut index = 0u32;

    loop {
        let mut name_len = name.len() as u32;
        let mut class_len = class.len() as u32;
        let mut last_write_time = FileTime::default();
        let status = unsafe {
            OREnumKey(
                key,
                index,
                name.as_mut_ptr(),
                &mut name_len,
                class.as_mut_ptr(),
                &mut class_len,
                &mut last_write_time,
            )
        };
        match status {
            ERROR_NO_MORE_ITEMS => return Ok(entries),
            ERROR_MORE_DATA => {
                name.resize(grow(name.len(), name_len as usize + 1), 0);
                class.resize(grow(class.len(), class_len as usize + 1), 0);
                continue;
            }
            _ => check(status, "OREnumKey", format_args!("index {index}"))?,
        }
        entries.push(SubKey {
            name: String::from_utf16_lossy(&name[..name_len as usize]),
            class: String::from_utf16_lossy(&class[..class_len as usize]),
            last_write_time,
        });
        index += 1;
    }
}

#[derive(Debug, Clone)]
pub struct RawValue {
    pub name: String,
    pub value_type: u32,
    pub data: Vec<u8>,
}

pub fn values(key: impl KeyLike) -> Result<Vec<RawValue>> {
    let info = query_info(key)?;
    enum_values(
        key,
        info.max_value_name_len as usize + 1,
        info.max_value_len as usize,
    )
}

fn enum_values(key: impl KeyLike, name_cap: usize, data_cap: usize) -> Result<Vec<RawValue>> {
    let mut name = vec![0u16; name_cap.max(1)];
    let mut data = vec![0u8; data_cap.max(1)];
    let mut entries = Vec::new();
    let mut index = 0u32;

    loop {
        let mut name_len = name.len() as u32;
        let mut data_len = data.len() as u32;
        let mut value_type = 0u32;
        let status = unsafe {
            OREnumValue(
                key,
                index,
                name.as_mut_ptr(),
                &mut name_len,
                &mut value_type,
                data.as_mut_ptr(),
                &mut data_len,
            )
        };
        match status {
            ERROR_NO_MORE_ITEMS => return Ok(entries),
            ERROR_MORE_DATA => {
                name.resize(grow(name.len(), name_len as usize + 1), 0);
                data.resize(grow(data.len(), data_len as usize), 0);
                continue;
            }
            _ => check(status, "OREnumValue", format_args!("index {index}"))?,
        }
        entries.push(RawValue {
            name: String::from_utf16_lossy(&name[..name_len as usize]),
            value_type,
            data: data[..data_len as usize].to_vec(),
        });
        index += 1;
    }
}

/// Write a value; an empty name targets the default value.
pub fn set_value(key: impl KeyLike, name: &str, value_type: u32, data: &[u8]) -> Result<()> {
    let wide = optional_wide(name);
    let status = unsafe {
        ORSetValue(
            key,
            optional_ptr(&wide),
            value_type,
            data.as_ptr(),
            data.len() as u32,
        )
    };
    check(status, "ORSetValue", format_args!("'{name}'"))
}

pub fn delete_value(key: impl KeyLike, name: &str) -> Result<()> {
    let wide = optional_wide(name);
    let status = unsafe { ORDeleteValue(key, optional_ptr(&wide)) };
    check(status, "ORDeleteValue", format_args!("'{name}'"))
}

pub fn delete_key(parent: impl KeyLike, name: &str) -> Result<()> {
    let wide = to_wide(name);
    let status = unsafe { ORDeleteKey(parent, wide.as_ptr()) };
    check(status, "ORDeleteKey", format_args!("'{name}'"))
}
