//! Handle, status, and value types shared with `offreg.dll`.

#![allow(non_camel_case_types)]

use std::ffi::c_void;
use std::fmt;

// https://learn.microsoft.com/en-us/windows/win32/sysinfo/registry-value-types
pub const REG_NONE: u32 = 0; // No value type
pub const REG_SZ: u32 = 1; // Unicode nul terminated string
pub const REG_EXPAND_SZ: u32 = 2; // nul terminated, with environment variable references
pub const REG_BINARY: u32 = 3; // Free form binary
pub const REG_DWORD: u32 = 4; // 32-bit number
pub const REG_DWORD_LITTLE_ENDIAN: u32 = 4; // 32-bit number (same as REG_DWORD)
pub const REG_DWORD_BIG_ENDIAN: u32 = 5; // 32-bit number
pub const REG_LINK: u32 = 6; // Symbolic Link (unicode)
pub const REG_MULTI_SZ: u32 = 7; // Multiple Unicode strings
pub const REG_RESOURCE_LIST: u32 = 8; // Resource list in the resource map
pub const REG_FULL_RESOURCE_DESCRIPTOR: u32 = 9; // Resource list in the hardware description
pub const REG_RESOURCE_REQUIREMENTS_LIST: u32 = 10;
pub const REG_QWORD: u32 = 11; // 64-bit number
pub const REG_QWORD_LITTLE_ENDIAN: u32 = 11; // 64-bit number (same as REG_QWORD)

/// `ORCreateKey` disposition values.
pub const REG_CREATED_NEW_KEY: u32 = 1;
pub const REG_OPENED_EXISTING_KEY: u32 = 2;

/// Flags for `ORGetVirtualFlags` / `ORSetVirtualFlags`.
pub const REG_KEY_DONT_VIRTUALIZE: u32 = 0x0002;
pub const REG_KEY_DONT_SILENT_FAIL: u32 = 0x0004;
pub const REG_KEY_RECURSE_FLAG: u32 = 0x0008;

/// Bit mask selecting which parts of a security descriptor are read or written.
pub type SECURITY_INFORMATION = u32;

pub const OWNER_SECURITY_INFORMATION: SECURITY_INFORMATION = 0x0000_0001;
pub const GROUP_SECURITY_INFORMATION: SECURITY_INFORMATION = 0x0000_0002;
pub const DACL_SECURITY_INFORMATION: SECURITY_INFORMATION = 0x0000_0004;
pub const SACL_SECURITY_INFORMATION: SECURITY_INFORMATION = 0x0000_0008;

/// Opaque pointer to an OS-defined security descriptor.
pub type PSECURITY_DESCRIPTOR = *mut c_void;

/// 32-bit status word returned by every fallible `OR*` call.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub u32);

pub const ERROR_SUCCESS: Status = Status(0);
pub const ERROR_MORE_DATA: Status = Status(234);
pub const ERROR_NO_MORE_ITEMS: Status = Status(259);

impl Status {
    #[inline]
    pub const fn code(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == ERROR_SUCCESS.0
    }
}

impl From<Status> for u32 {
    #[inline]
    fn from(status: Status) -> Self {
        status.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ERROR_SUCCESS => f.write_str("ERROR_SUCCESS (0)"),
            ERROR_MORE_DATA => f.write_str("ERROR_MORE_DATA (234)"),
            ERROR_NO_MORE_ITEMS => f.write_str("ERROR_NO_MORE_ITEMS (259)"),
            Status(code) => write!(f, "Win32 error {code}"),
        }
    }
}

/// Handle to an open hive, from `ORCreateHive` or `OROpenHive`.
///
/// Released with `ORCloseHive`. The default value is the null handle,
/// suitable for initializing an out parameter.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HiveHandle(usize);

impl HiveHandle {
    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Handle to an open key, from `ORCreateKey` or `OROpenKey`.
///
/// Released with `ORCloseKey`.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyHandle(usize);

impl KeyHandle {
    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::HiveHandle {}
    impl Sealed for super::KeyHandle {}
}

/// A handle that names a key: either a hive root or an opened subkey.
///
/// Every call except the hive-level ones (`ORSaveHive`, `ORCloseHive`) and
/// `ORCloseKey` accepts either kind.
pub trait KeyLike: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn raw_key(self) -> usize;
}

impl KeyLike for HiveHandle {
    #[inline]
    fn raw_key(self) -> usize {
        self.0
    }
}

impl KeyLike for KeyHandle {
    #[inline]
    fn raw_key(self) -> usize {
        self.0
    }
}

/// https://learn.microsoft.com/en-us/windows/win32/api/minwinbase/ns-minwinbase-filetime
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileTime {
    pub low_date_time: u32,
    pub high_date_time: u32,
}

/// Closed set of registry value types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegType {
    None = REG_NONE,
    Sz = REG_SZ,
    ExpandSz = REG_EXPAND_SZ,
    Binary = REG_BINARY,
    Dword = REG_DWORD,
    DwordBigEndian = REG_DWORD_BIG_ENDIAN,
    Link = REG_LINK,
    MultiSz = REG_MULTI_SZ,
    ResourceList = REG_RESOURCE_LIST,
    FullResourceDescriptor = REG_FULL_RESOURCE_DESCRIPTOR,
    ResourceRequirementsList = REG_RESOURCE_REQUIREMENTS_LIST,
    Qword = REG_QWORD,
}

impl RegType {
    /// The `REG_*` constant name.
    pub const fn name(self) -> &'static str {
        match self {
            RegType::None => "REG_NONE",
            RegType::Sz => "REG_SZ",
            RegType::ExpandSz => "REG_EXPAND_SZ",
            RegType::Binary => "REG_BINARY",
            RegType::Dword => "REG_DWORD",
            RegType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN",
            RegType::Link => "REG_LINK",
            RegType::MultiSz => "REG_MULTI_SZ",
            RegType::ResourceList => "REG_RESOURCE_LIST",
            RegType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR",
            RegType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST",
            RegType::Qword => "REG_QWORD",
        }
    }
}

impl From<RegType> for u32 {
    #[inline]
    fn from(ty: RegType) -> Self {
        ty as u32
    }
}

impl TryFrom<u32> for RegType {
    /// The unrecognized tag.
    type Error = u32;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        Ok(match tag {
            REG_NONE => RegType::None,
            REG_SZ => RegType::Sz,
            REG_EXPAND_SZ => RegType::ExpandSz,
            REG_BINARY => RegType::Binary,
            REG_DWORD => RegType::Dword,
            REG_DWORD_BIG_ENDIAN => RegType::DwordBigEndian,
            REG_LINK => RegType::Link,
            REG_MULTI_SZ => RegType::MultiSz,
            REG_RESOURCE_LIST => RegType::ResourceList,
            REG_FULL_RESOURCE_DESCRIPTOR => RegType::FullResourceDescriptor,
            REG_RESOURCE_REQUIREMENTS_LIST => RegType::ResourceRequirementsList,
            REG_QWORD => RegType::Qword,
            other => return Err(other),
        })
    }
}

impl fmt::Display for RegType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
