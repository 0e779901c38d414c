//! Fallback for hosts without `offreg.dll`: every resolution fails.

use crate::LoadError;

pub(super) fn load_library(name: &'static str) -> Result<usize, LoadError> {
    Err(LoadError::Unsupported { name })
}

pub(super) fn find_proc(
    _module: usize,
    library: &'static str,
    _name: &'static str,
) -> Result<usize, LoadError> {
    Err(LoadError::Unsupported { name: library })
}
