//! Typed bindings to `offreg.dll`, the Windows Offline Registry Library.
//!
//! The library reads, edits, and writes registry hive files without loading
//! them into the running system's registry. This crate exposes its nineteen
//! exports one-to-one: same argument order, raw pointers for strings and
//! buffers, and the native status word returned unchanged. There is no
//! buffer management and no error translation here; callers own both.
//!
//! `offreg.dll` is loaded on the first call. On hosts without it (including
//! every non-Windows target) the crate still builds, but the first call
//! panics; [`load`] and [`find_all`] report the same condition as a
//! [`LoadError`] instead.
//!
//! ```no_run
//! use offreg::{HiveHandle, ERROR_SUCCESS, ORCloseHive, ORCreateHive, ORSaveHive};
//!
//! let path: Vec<u16> = "empty.hiv".encode_utf16().chain(Some(0)).collect();
//! let mut hive = HiveHandle::default();
//! unsafe {
//!     assert_eq!(ORCreateHive(&mut hive), ERROR_SUCCESS);
//!     assert_eq!(ORSaveHive(hive, path.as_ptr(), 10, 0), ERROR_SUCCESS);
//!     assert_eq!(ORCloseHive(hive), ERROR_SUCCESS);
//! }
//! ```

mod api;
mod error;
mod loader;
mod types;
mod version;

pub use api::{
    ORCloseHive, ORCloseKey, ORCreateHive, ORCreateKey, ORDeleteKey, ORDeleteValue, OREnumKey,
    OREnumValue, ORGetKeySecurity, ORGetValue, ORGetVersion, ORGetVirtualFlags, OROpenHive,
    OROpenKey, ORQueryInfoKey, ORSaveHive, ORSetKeySecurity, ORSetValue, ORSetVirtualFlags,
    find_all, is_available, load,
};
pub use error::LoadError;
pub use types::*;
#[cfg(windows)]
pub use version::os_version;
