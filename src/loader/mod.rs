//! Lazy resolution of `offreg.dll` and its exports.
//!
//! Nothing is loaded until a binding is first called. Successful resolutions
//! are cached for the lifetime of the process; failures are not, so a later
//! call retries.

use log::{debug, error};
use once_cell::sync::OnceCell;

use crate::LoadError;

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        mod win32;
        use self::win32 as sys;
    } else {
        mod unsupported;
        use self::unsupported as sys;
    }
}

pub(crate) const OFFREG_DLL: &str = "offreg.dll";

/// Process-wide handle to `offreg.dll`.
pub(crate) static OFFREG: LazyLibrary = LazyLibrary::new(OFFREG_DLL);

/// A dynamic library loaded on first use.
pub(crate) struct LazyLibrary {
    name: &'static str,
    module: OnceCell<usize>,
}

impl LazyLibrary {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self {
            name,
            module: OnceCell::new(),
        }
    }

    /// Load the library now, returning its module address.
    pub(crate) fn load(&self) -> Result<usize, LoadError> {
        self.module
            .get_or_try_init(|| {
                let module = sys::load_library(self.name)?;
                debug!("Loaded {} at {:#x}", self.name, module);
                Ok(module)
            })
            .copied()
    }
}

/// An exported procedure resolved on first call.
pub(crate) struct LazyProc {
    library: &'static LazyLibrary,
    name: &'static str,
    addr: OnceCell<usize>,
}

impl LazyProc {
    pub(crate) const fn new(library: &'static LazyLibrary, name: &'static str) -> Self {
        Self {
            library,
            name,
            addr: OnceCell::new(),
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve the procedure (and its library) without panicking.
    pub(crate) fn find(&self) -> Result<usize, LoadError> {
        self.addr
            .get_or_try_init(|| {
                let module = self.library.load()?;
                let addr = sys::find_proc(module, self.library.name, self.name)?;
                debug!("Resolved {}!{} at {:#x}", self.library.name, self.name, addr);
                Ok(addr)
            })
            .copied()
    }

    /// Address of the procedure; panics if it cannot be resolved.
    pub(crate) fn addr(&self) -> usize {
        match self.find() {
            Ok(addr) => addr,
            Err(err) => {
                error!("{err}");
                panic!("{err}");
            }
        }
    }

    /// Seed the cache with a stand-in procedure.
    #[cfg(test)]
    pub(crate) fn preset(&self, addr: usize) {
        let _ = self.addr.set(addr);
    }
}
