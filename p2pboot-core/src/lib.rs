//! p2pboot Core
//!
//! Launch-string marshalling and native entry-point dispatch for libp2p
//! daemon and client shared libraries.

pub mod config;
pub mod launcher;
pub mod logging;
pub mod native;
pub mod request;
pub mod runtime;
pub mod stub;
pub mod variant;

pub use config::{Config, ConfigError, LIBRARY_DIR_ENV};
pub use launcher::{LaunchError, Launcher};
pub use logging::{init_logging, init_logging_from_env};
pub use native::{LibraryLocation, NativeBoundary, NativeError, NativeLibrary};
pub use request::{LaunchRequest, RequestError, SEPARATOR};
pub use runtime::{interrupts, run_supervised, run_until, RunOutcome, RuntimeError, INTERRUPTED_STATUS};
pub use stub::{report_load_failure, run_stub, FAILURE_STATUS, LOAD_FAILURE_MESSAGE};
pub use variant::{EntryPoints, StartParam, Variant};
