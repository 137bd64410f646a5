//! Bare per-variant entry
//!
//! Used by the `p2pd` and `p2pc` binaries: no flag parsing, every process
//! argument goes to the native library as-is. The only knob is the library
//! directory environment variable.

use crate::config::LIBRARY_DIR_ENV;
use crate::launcher::{LaunchError, Launcher};
use crate::native::LibraryLocation;
use crate::variant::Variant;
use std::path::PathBuf;
use std::process::ExitCode;

/// First line of the diagnostic printed when the library cannot be loaded
pub const LOAD_FAILURE_MESSAGE: &str = "Native code library failed to load.";

/// Exit status for any failure the launcher itself detects
pub const FAILURE_STATUS: u8 = 1;

/// Print the load-failure diagnostic to stderr and return the exit status
pub fn report_load_failure(err: &LaunchError) -> ExitCode {
    eprintln!("{}\n{}", LOAD_FAILURE_MESSAGE, err);
    ExitCode::from(FAILURE_STATUS)
}

/// Library location from the environment, else the system search path
pub fn location_from_env(variant: Variant) -> LibraryLocation {
    let dir = std::env::var_os(LIBRARY_DIR_ENV)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from);
    LibraryLocation::select(None, dir.as_deref(), variant.library_name())
}

/// Load the library for `variant` and hand `args` to its start entry point
pub fn run_stub<I>(variant: Variant, args: I) -> ExitCode
where
    I: IntoIterator<Item = String>,
{
    let launcher = match Launcher::load(variant, variant.identifier(), &location_from_env(variant)) {
        Ok(launcher) => launcher,
        Err(e) => return report_load_failure(&e),
    };

    match launcher.start(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(FAILURE_STATUS)
        }
    }
}
