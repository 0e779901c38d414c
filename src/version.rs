//! Host OS version, used to stamp saved hives.

/// Returns the host OS `(major, minor)` version, ready to pass to
/// [`crate::ORSaveHive`].
///
/// Applications not manifested for Windows 8.1 or Windows 10 get the
/// Windows 8 value (6.2).
///
/// Version table: <https://learn.microsoft.com/en-us/windows/win32/sysinfo/operating-system-version>
#[cfg(windows)]
pub fn os_version() -> (u32, u32) {
    let version = unsafe { windows::Win32::System::SystemInformation::GetVersion() };
    split_version(version)
}

/// Low byte is the major version, the next byte the minor version.
#[cfg_attr(not(windows), allow(dead_code))]
fn split_version(version: u32) -> (u32, u32) {
    (version & 0xFF, (version >> 8) & 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_version() {
        // Windows 8: build 9200, version 6.2
        assert_eq!(split_version(0x23F0_0206), (6, 2));
        // Windows 10 (manifested): build 19045, version 10.0
        assert_eq!(split_version(0x4A65_000A), (10, 0));
    }

    #[cfg(windows)]
    #[test]
    fn test_os_version_is_plausible() {
        let (major, minor) = os_version();
        assert!(major >= 6, "major {major}");
        assert!(minor <= 3, "minor {minor}");
    }
}
