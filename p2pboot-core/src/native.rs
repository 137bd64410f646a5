//! Foreign-function boundary
//!
//! The native peer-to-peer program lives in a platform shared library that
//! exports C ABI entry points taking either nothing or one NUL-terminated
//! string. [`NativeBoundary`] is the seam the launcher calls through;
//! [`NativeLibrary`] implements it with explicit dynamic loading.

use libloading::Library;
use std::ffi::{CStr, OsString};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// `void start(const char *launch)`
type StringEntryPoint = unsafe extern "C" fn(*const c_char);
/// `void entry(void)`
type VoidEntryPoint = unsafe extern "C" fn();

#[derive(Error, Debug)]
pub enum NativeError {
    #[error("Failed to load native library {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Native library {path} does not export `{symbol}`: {source}")]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
}

/// Calls across the native boundary
///
/// Each method performs exactly one native call. What the callee does with
/// it, and whether it returns, is up to the library.
pub trait NativeBoundary: Send + Sync {
    /// Invoke an exported `extern "C" fn(*const c_char)`
    fn call_with_str(&self, symbol: &str, arg: &CStr) -> Result<(), NativeError>;

    /// Invoke an exported `extern "C" fn()`
    fn call(&self, symbol: &str) -> Result<(), NativeError>;
}

/// Where to find the shared library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    /// An explicit file
    Path(PathBuf),
    /// The platform filename for `name` inside `dir`
    Dir { dir: PathBuf, name: String },
    /// The platform filename for `name`, left to the system loader search path
    System { name: String },
}

impl LibraryLocation {
    /// Pick a location: explicit path, then directory, then system search
    pub fn select(path: Option<&Path>, dir: Option<&Path>, name: &str) -> Self {
        match (path, dir) {
            (Some(path), _) => LibraryLocation::Path(path.to_path_buf()),
            (None, Some(dir)) => LibraryLocation::Dir {
                dir: dir.to_path_buf(),
                name: name.to_string(),
            },
            (None, None) => LibraryLocation::System {
                name: name.to_string(),
            },
        }
    }

    /// Filename or path handed to the loader
    pub fn resolve(&self) -> OsString {
        match self {
            LibraryLocation::Path(path) => path.clone().into_os_string(),
            LibraryLocation::Dir { dir, name } => {
                dir.join(libloading::library_filename(name)).into_os_string()
            }
            LibraryLocation::System { name } => libloading::library_filename(name),
        }
    }
}

/// A loaded shared library
#[derive(Debug)]
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    /// Resolve and load the library. Initialisers in the library run here.
    pub fn open(location: &LibraryLocation) -> Result<Self, NativeError> {
        let filename = location.resolve();
        let path = PathBuf::from(&filename);
        debug!("Loading native library {}", path.display());

        // SAFETY: loading runs the library's initialisers; the libraries this
        // launcher targets are trusted to have sound initialisers.
        let library = unsafe { Library::new(&filename) }.map_err(|source| NativeError::Load {
            path: path.clone(),
            source,
        })?;

        info!("Loaded native library {}", path.display());
        Ok(Self { library, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn missing(&self, symbol: &str, source: libloading::Error) -> NativeError {
        NativeError::MissingSymbol {
            path: self.path.clone(),
            symbol: symbol.to_string(),
            source,
        }
    }
}

impl NativeBoundary for NativeLibrary {
    fn call_with_str(&self, symbol: &str, arg: &CStr) -> Result<(), NativeError> {
        // SAFETY: the symbol is declared by the library contract as
        // `void symbol(const char *)`.
        let entry = unsafe { self.library.get::<StringEntryPoint>(symbol.as_bytes()) }
            .map_err(|e| self.missing(symbol, e))?;
        debug!("Calling {}({:?})", symbol, arg);
        // SAFETY: `arg` outlives the call and is NUL-terminated.
        unsafe { entry(arg.as_ptr()) };
        Ok(())
    }

    fn call(&self, symbol: &str) -> Result<(), NativeError> {
        // SAFETY: the symbol is declared by the library contract as
        // `void symbol(void)`.
        let entry = unsafe { self.library.get::<VoidEntryPoint>(symbol.as_bytes()) }
            .map_err(|e| self.missing(symbol, e))?;
        debug!("Calling {}()", symbol);
        // SAFETY: takes no arguments.
        unsafe { entry() };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_select_prefers_explicit_path() {
        let location = LibraryLocation::select(
            Some(Path::new("/opt/p2p/libcustom.so")),
            Some(Path::new("/opt/p2p")),
            "p2pd",
        );
        assert_eq!(location, LibraryLocation::Path(PathBuf::from("/opt/p2p/libcustom.so")));
        assert_eq!(location.resolve(), OsString::from("/opt/p2p/libcustom.so"));
    }

    #[test]
    fn test_dir_uses_platform_filename() {
        let location = LibraryLocation::select(None, Some(Path::new("/opt/p2p")), "p2pd");
        let expected = Path::new("/opt/p2p").join(libloading::library_filename("p2pd"));
        assert_eq!(PathBuf::from(location.resolve()), expected);
    }

    #[test]
    fn test_system_location_is_bare_filename() {
        let location = LibraryLocation::select(None, None, "p2pc");
        let resolved = location.resolve();
        assert_eq!(resolved, libloading::library_filename("p2pc"));
        assert!(resolved.to_string_lossy().contains("p2pc"));
    }

    #[test]
    fn test_open_missing_library_fails() {
        let dir = tempfile::tempdir().unwrap();
        let location = LibraryLocation::select(None, Some(dir.path()), "p2pd");
        let err = NativeLibrary::open(&location).unwrap_err();
        match err {
            NativeError::Load { path, .. } => assert!(path.starts_with(dir.path())),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_non_library_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a shared object").unwrap();
        let location = LibraryLocation::Path(file.path().to_path_buf());
        assert!(matches!(
            NativeLibrary::open(&location),
            Err(NativeError::Load { .. })
        ));
    }
}
