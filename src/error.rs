//! Error types for library and procedure resolution.

use thiserror::Error;

/// Failure to resolve `offreg.dll` or one of its exports.
///
/// Bindings never return this; they panic with its message. It is surfaced
/// by the probing functions ([`crate::load`], [`crate::find_all`]) so callers
/// can check availability up front.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to load {name} (Win32 error {code})")]
    Library { name: &'static str, code: u32 },

    #[error("failed to find {name} procedure in {library} (Win32 error {code})")]
    Procedure {
        name: &'static str,
        library: &'static str,
        code: u32,
    },

    #[error("{name} is only available on Windows")]
    Unsupported { name: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_error_message() {
        let err = LoadError::Library {
            name: "offreg.dll",
            code: 126,
        };
        assert_eq!(err.to_string(), "failed to load offreg.dll (Win32 error 126)");
    }

    #[test]
    fn test_procedure_error_message() {
        let err = LoadError::Procedure {
            name: "ORGetVirtualFlags",
            library: "offreg.dll",
            code: 127,
        };
        assert!(err.to_string().contains("ORGetVirtualFlags"));
        assert!(err.to_string().contains("offreg.dll"));
        assert!(err.to_string().contains("127"));
    }
}
