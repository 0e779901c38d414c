//! End-to-end checks against the system `offreg.dll`.

#![cfg(windows)]

use std::path::Path;
use std::ptr;

use offreg::*;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}

fn wide_path(path: &Path) -> Vec<u16> {
    wide(&path.to_string_lossy())
}

fn create_hive() -> HiveHandle {
    let mut hive = HiveHandle::default();
    assert_eq!(unsafe { ORCreateHive(&mut hive) }, ERROR_SUCCESS);
    assert!(!hive.is_null());
    hive
}

fn create_key(parent: impl KeyLike, name: &str) -> KeyHandle {
    let name = wide(name);
    let mut key = KeyHandle::default();
    let status = unsafe {
        ORCreateKey(
            parent,
            name.as_ptr(),
            ptr::null(),
            0,
            ptr::null_mut(),
            &mut key,
            ptr::null_mut(),
        )
    };
    assert_eq!(status, ERROR_SUCCESS);
    key
}

fn open_hive(path: &Path) -> HiveHandle {
    let path = wide_path(path);
    let mut hive = HiveHandle::default();
    assert_eq!(unsafe { OROpenHive(path.as_ptr(), &mut hive) }, ERROR_SUCCESS);
    hive
}

fn save_hive(hive: HiveHandle, path: &Path) {
    let (mut major, mut minor) = (0, 0);
    unsafe { ORGetVersion(&mut major, &mut minor) };
    let path = wide_path(path);
    assert_eq!(unsafe { ORSaveHive(hive, path.as_ptr(), major, minor) }, ERROR_SUCCESS);
}

fn counts(key: impl KeyLike) -> (u32, u32) {
    let (mut sub_keys, mut values) = (u32::MAX, u32::MAX);
    let status = unsafe {
        ORQueryInfoKey(
            key,
            ptr::null_mut(),
            ptr::null_mut(),
            &mut sub_keys,
            ptr::null_mut(),
            ptr::null_mut(),
            &mut values,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    assert_eq!(status, ERROR_SUCCESS);
    (sub_keys, values)
}

fn enum_key_name(key: impl KeyLike, index: u32) -> Result<String, Status> {
    let mut buf = [0u16; 256];
    let mut len = buf.len() as u32;
    let status = unsafe {
        OREnumKey(
            key,
            index,
            buf.as_mut_ptr(),
            &mut len,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    if status != ERROR_SUCCESS {
        return Err(status);
    }
    Ok(String::from_utf16_lossy(&buf[..len as usize]))
}

const HELLO: &[u8] = b"h\0e\0l\0l\0o\0\0\0";

#[test]
fn empty_hive_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out1.hiv");

    let hive = create_hive();
    let wide = wide_path(&path);
    assert_eq!(unsafe { ORSaveHive(hive, wide.as_ptr(), 10, 0) }, ERROR_SUCCESS);
    assert_eq!(unsafe { ORCloseHive(hive) }, ERROR_SUCCESS);

    let reopened = open_hive(&path);
    assert_eq!(counts(reopened), (0, 0));
    assert_eq!(enum_key_name(reopened, 0), Err(ERROR_NO_MORE_ITEMS));
    assert_eq!(unsafe { ORCloseHive(reopened) }, ERROR_SUCCESS);
}

#[test]
fn single_string_value_survives_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out2.hiv");

    let hive = create_hive();
    let key = create_key(hive, "A");
    let name = wide("name");
    let status =
        unsafe { ORSetValue(key, name.as_ptr(), REG_SZ, HELLO.as_ptr(), HELLO.len() as u32) };
    assert_eq!(status, ERROR_SUCCESS);
    save_hive(hive, &path);
    assert_eq!(unsafe { ORCloseKey(key) }, ERROR_SUCCESS);
    assert_eq!(unsafe { ORCloseHive(hive) }, ERROR_SUCCESS);

    let reopened = open_hive(&path);
    let sub_key = wide("A");
    let mut key = KeyHandle::default();
    assert_eq!(unsafe { OROpenKey(reopened, sub_key.as_ptr(), &mut key) }, ERROR_SUCCESS);

    let mut buf = [0u8; 12];
    let mut len = 12u32;
    let mut ty = 0u32;
    let status = unsafe {
        ORGetValue(key, ptr::null(), name.as_ptr(), &mut ty, buf.as_mut_ptr(), &mut len)
    };
    assert_eq!(status, ERROR_SUCCESS);
    assert_eq!(ty, REG_SZ);
    assert_eq!(len, 12);
    assert_eq!(&buf[..], HELLO);

    assert_eq!(unsafe { ORCloseKey(key) }, ERROR_SUCCESS);
    assert_eq!(unsafe { ORCloseHive(reopened) }, ERROR_SUCCESS);
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ValueEntry {
    name: String,
    value_type: u32,
    data: Vec<u8>,
}

fn list_values(key: impl KeyLike) -> Vec<ValueEntry> {
    let mut entries = Vec::new();
    for index in 0u32.. {
        let mut name = [0u16; 256];
        let mut name_len = name.len() as u32;
        let mut data = [0u8; 256];
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
        if status == ERROR_NO_MORE_ITEMS {
            break;
        }
        assert_eq!(status, ERROR_SUCCESS);
        entries.push(ValueEntry {
            name: String::from_utf16_lossy(&name[..name_len as usize]),
            value_type,
            data: data[..data_len as usize].to_vec(),
        });
    }
    entries.sort();
    entries
}

/// Every key below `key` (by path) with its sorted values.
fn listing(key: impl KeyLike, path: &str, out: &mut Vec<(String, Vec<ValueEntry>)>) {
    out.push((path.to_string(), list_values(key)));
    for index in 0u32.. {
        let name = match enum_key_name(key, index) {
            Ok(name) => name,
            Err(status) => {
                assert_eq!(status, ERROR_NO_MORE_ITEMS);
                break;
            }
        };
        let wide_name = wide(&name);
        let mut child = KeyHandle::default();
        assert_eq!(
            unsafe { OROpenKey(key, wide_name.as_ptr(), &mut child) },
            ERROR_SUCCESS
        );
        listing(child, &format!("{path}\\{name}"), out);
        assert_eq!(unsafe { ORCloseKey(child) }, ERROR_SUCCESS);
    }
}

fn full_listing(key: impl KeyLike) -> Vec<(String, Vec<ValueEntry>)> {
    let mut out = Vec::new();
    listing(key, "", &mut out);
    out.sort();
    out
}

fn set(key: impl KeyLike, name: Option<&str>, value_type: u32, data: &[u8]) {
    let name = name.map(wide);
    let name_ptr = name.as_ref().map_or(ptr::null(), |n| n.as_ptr());
    let status = unsafe { ORSetValue(key, name_ptr, value_type, data.as_ptr(), data.len() as u32) };
    assert_eq!(status, ERROR_SUCCESS);
}

#[test]
fn nested_tree_survives_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.hiv");

    let hive = create_hive();
    set(hive, Some("top"), REG_SZ, HELLO);
    let a = create_key(hive, "A");
    set(a, Some("dw"), REG_DWORD, &0x0102_0304u32.to_le_bytes());
    set(a, Some("qw"), REG_QWORD, &u64::MAX.to_le_bytes());
    let b = create_key(a, "B");
    set(b, None, REG_SZ, HELLO);
    set(b, Some("bin"), REG_BINARY, &[0, 1, 2, 0xFF]);
    set(b, Some("multi"), REG_MULTI_SZ, b"a\0\0\0b\0\0\0\0\0");
    set(b, Some("empty"), REG_BINARY, &[]);
    let c = create_key(hive, "C");

    let before = full_listing(hive);
    let paths: Vec<&str> = before.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, ["", "\\A", "\\A\\B", "\\C"]);
    assert_eq!(before[2].1.len(), 4);

    save_hive(hive, &path);
    unsafe {
        assert_eq!(ORCloseKey(c), ERROR_SUCCESS);
        assert_eq!(ORCloseKey(b), ERROR_SUCCESS);
        assert_eq!(ORCloseKey(a), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }

    let reopened = open_hive(&path);
    assert_eq!(full_listing(reopened), before);
    assert_eq!(unsafe { ORCloseHive(reopened) }, ERROR_SUCCESS);
}

#[test]
fn enumerate_two_subkeys() {
    let hive = create_hive();
    let a = create_key(hive, "A");
    let b = create_key(hive, "B");

    let mut names = vec![
        enum_key_name(hive, 0).unwrap(),
        enum_key_name(hive, 1).unwrap(),
    ];
    names.sort();
    assert_eq!(names, ["A", "B"]);
    assert_eq!(enum_key_name(hive, 2), Err(ERROR_NO_MORE_ITEMS));

    unsafe {
        assert_eq!(ORCloseKey(a), ERROR_SUCCESS);
        assert_eq!(ORCloseKey(b), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn undersized_buffer_reports_required_size() {
    let hive = create_hive();
    let key = create_key(hive, "A");
    let name = wide("name");
    unsafe {
        assert_eq!(
            ORSetValue(key, name.as_ptr(), REG_SZ, HELLO.as_ptr(), HELLO.len() as u32),
            ERROR_SUCCESS
        );
    }

    let mut buf = [0u8; 12];
    let mut len = 4u32;
    let status = unsafe {
        ORGetValue(key, ptr::null(), name.as_ptr(), ptr::null_mut(), buf.as_mut_ptr(), &mut len)
    };
    assert_eq!(status, ERROR_MORE_DATA);
    assert_eq!(len, 12);

    let status = unsafe {
        ORGetValue(key, ptr::null(), name.as_ptr(), ptr::null_mut(), buf.as_mut_ptr(), &mut len)
    };
    assert_eq!(status, ERROR_SUCCESS);
    assert_eq!(&buf[..], HELLO);

    // Size query without a buffer.
    let mut len = 0u32;
    let status = unsafe {
        ORGetValue(key, ptr::null(), name.as_ptr(), ptr::null_mut(), ptr::null_mut(), &mut len)
    };
    assert!(status == ERROR_SUCCESS || status == ERROR_MORE_DATA, "{status}");
    assert_eq!(len, 12);

    unsafe {
        assert_eq!(ORCloseKey(key), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn enum_value_undersized_then_exact() {
    let hive = create_hive();
    let key = create_key(hive, "A");
    let name = wide("name");
    unsafe {
        assert_eq!(
            ORSetValue(key, name.as_ptr(), REG_SZ, HELLO.as_ptr(), HELLO.len() as u32),
            ERROR_SUCCESS
        );
    }

    let mut name_buf = [0u16; 64];
    let mut name_len = name_buf.len() as u32;
    let mut data = [0u8; 2];
    let mut data_len = data.len() as u32;
    let mut ty = 0u32;
    let status = unsafe {
        OREnumValue(
            key,
            0,
            name_buf.as_mut_ptr(),
            &mut name_len,
            &mut ty,
            data.as_mut_ptr(),
            &mut data_len,
        )
    };
    assert_eq!(status, ERROR_MORE_DATA);
    assert_eq!(data_len, 12);

    let mut data = vec![0u8; data_len as usize];
    let mut name_len = name_buf.len() as u32;
    let status = unsafe {
        OREnumValue(
            key,
            0,
            name_buf.as_mut_ptr(),
            &mut name_len,
            &mut ty,
            data.as_mut_ptr(),
            &mut data_len,
        )
    };
    assert_eq!(status, ERROR_SUCCESS);
    assert_eq!(String::from_utf16_lossy(&name_buf[..name_len as usize]), "name");
    assert_eq!(ty, REG_SZ);
    assert_eq!(data, HELLO);

    unsafe {
        assert_eq!(ORCloseKey(key), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn dword_value_is_little_endian() {
    let hive = create_hive();
    let key = create_key(hive, "A");
    let name = wide("n");
    let value = 0x0102_0304u32;
    let status = unsafe {
        ORSetValue(key, name.as_ptr(), REG_DWORD, (&value as *const u32).cast(), 4)
    };
    assert_eq!(status, ERROR_SUCCESS);

    let mut buf = [0u8; 4];
    let mut len = 4u32;
    let mut ty = 0u32;
    let status = unsafe {
        ORGetValue(key, ptr::null(), name.as_ptr(), &mut ty, buf.as_mut_ptr(), &mut len)
    };
    assert_eq!(status, ERROR_SUCCESS);
    assert_eq!(ty, REG_DWORD);
    assert_eq!(len, 4);
    assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);

    unsafe {
        assert_eq!(ORCloseKey(key), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn version_stamp_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stamped.hiv");

    let (mut major, mut minor) = (u32::MAX, u32::MAX);
    unsafe { ORGetVersion(&mut major, &mut minor) };
    assert_ne!(major, u32::MAX);
    assert_ne!(minor, u32::MAX);

    let hive = create_hive();
    let wide = wide_path(&path);
    assert_eq!(unsafe { ORSaveHive(hive, wide.as_ptr(), major, minor) }, ERROR_SUCCESS);
    assert_eq!(unsafe { ORCloseHive(hive) }, ERROR_SUCCESS);

    let (os_major, os_minor) = os_version();
    let path = dir.path().join("host-stamped.hiv");
    let hive = create_hive();
    let wide = wide_path(&path);
    assert_eq!(unsafe { ORSaveHive(hive, wide.as_ptr(), os_major, os_minor) }, ERROR_SUCCESS);
    assert_eq!(unsafe { ORCloseHive(hive) }, ERROR_SUCCESS);
}

#[test]
fn create_then_open_is_same_key() {
    let hive = create_hive();
    let created = create_key(hive, "X");
    let name = wide("v");
    let data = 7u64.to_le_bytes();
    unsafe {
        assert_eq!(ORSetValue(created, name.as_ptr(), REG_QWORD, data.as_ptr(), 8), ERROR_SUCCESS);
    }

    let sub_key = wide("X");
    let mut opened = KeyHandle::default();
    assert_eq!(unsafe { OROpenKey(hive, sub_key.as_ptr(), &mut opened) }, ERROR_SUCCESS);
    assert_eq!(counts(opened), counts(created));
    assert_eq!(counts(opened), (0, 1));

    // A second create opens the existing key.
    let mut again = KeyHandle::default();
    let mut disposition = 0u32;
    let status = unsafe {
        ORCreateKey(
            hive,
            sub_key.as_ptr(),
            ptr::null(),
            0,
            ptr::null_mut(),
            &mut again,
            &mut disposition,
        )
    };
    assert_eq!(status, ERROR_SUCCESS);
    assert_eq!(disposition, REG_OPENED_EXISTING_KEY);

    unsafe {
        assert_eq!(ORCloseKey(again), ERROR_SUCCESS);
        assert_eq!(ORCloseKey(opened), ERROR_SUCCESS);
        assert_eq!(ORCloseKey(created), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn delete_missing_key_leaves_hive_unchanged() {
    let hive = create_hive();
    let key = create_key(hive, "A");
    assert_eq!(unsafe { ORCloseKey(key) }, ERROR_SUCCESS);

    let missing = wide("Missing");
    let status = unsafe { ORDeleteKey(hive, missing.as_ptr()) };
    assert_ne!(status, ERROR_SUCCESS);
    assert_eq!(counts(hive), (1, 0));

    let existing = wide("A");
    assert_eq!(unsafe { ORDeleteKey(hive, existing.as_ptr()) }, ERROR_SUCCESS);
    assert_eq!(counts(hive), (0, 0));
    assert_eq!(unsafe { ORCloseHive(hive) }, ERROR_SUCCESS);
}

#[test]
fn delete_value_and_virtual_flags() {
    let hive = create_hive();
    let key = create_key(hive, "A");
    let name = wide("gone");
    unsafe {
        assert_eq!(
            ORSetValue(key, name.as_ptr(), REG_BINARY, [1u8, 2, 3].as_ptr(), 3),
            ERROR_SUCCESS
        );
        assert_eq!(ORDeleteValue(key, name.as_ptr()), ERROR_SUCCESS);
    }
    assert_eq!(counts(key), (0, 0));

    let mut flags = u32::MAX;
    unsafe {
        assert_eq!(ORSetVirtualFlags(key, REG_KEY_DONT_VIRTUALIZE), ERROR_SUCCESS);
        assert_eq!(ORGetVirtualFlags(key, &mut flags), ERROR_SUCCESS);
    }
    assert_eq!(flags & REG_KEY_DONT_VIRTUALIZE, REG_KEY_DONT_VIRTUALIZE);

    unsafe {
        assert_eq!(ORCloseKey(key), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn key_security_round_trip() {
    let hive = create_hive();
    let key = create_key(hive, "A");

    let mut len = 0u32;
    let status =
        unsafe { ORGetKeySecurity(key, DACL_SECURITY_INFORMATION, ptr::null_mut(), &mut len) };
    assert_ne!(status, ERROR_SUCCESS);
    assert!(len > 0);

    let mut descriptor = vec![0u8; len as usize];
    let status = unsafe {
        ORGetKeySecurity(key, DACL_SECURITY_INFORMATION, descriptor.as_mut_ptr().cast(), &mut len)
    };
    assert_eq!(status, ERROR_SUCCESS);

    let status =
        unsafe { ORSetKeySecurity(key, DACL_SECURITY_INFORMATION, descriptor.as_mut_ptr().cast()) };
    assert_eq!(status, ERROR_SUCCESS);

    unsafe {
        assert_eq!(ORCloseKey(key), ERROR_SUCCESS);
        assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
    }
}

#[test]
fn probes_find_every_export() {
    assert!(is_available());
    assert_eq!(find_all(), Ok(()));
}
