//! The launcher stub
//!
//! A [`Launcher`] only exists once its library has been resolved, so holding
//! one means the load succeeded. Each `start`/`stop` makes exactly one native
//! call and performs no precondition checks.

use crate::native::{LibraryLocation, NativeBoundary, NativeError, NativeLibrary};
use crate::request::{LaunchRequest, RequestError};
use crate::variant::{StartParam, Variant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    Native(#[from] NativeError),

    #[error("Invalid launch request: {0}")]
    Request(#[from] RequestError),

    #[error("The {0} variant has no stop entry point")]
    StopUnsupported(Variant),
}

impl LaunchError {
    /// Whether the library itself could not be resolved
    pub fn is_load_failure(&self) -> bool {
        matches!(self, LaunchError::Native(NativeError::Load { .. }))
    }
}

pub struct Launcher<B = NativeLibrary> {
    variant: Variant,
    identifier: String,
    boundary: B,
}

impl Launcher<NativeLibrary> {
    /// Resolve the shared library for `variant`
    pub fn load(
        variant: Variant,
        identifier: impl Into<String>,
        location: &LibraryLocation,
    ) -> Result<Self, LaunchError> {
        let library = NativeLibrary::open(location)?;
        Ok(Self::with_boundary(variant, identifier, library))
    }
}

impl<B: NativeBoundary> Launcher<B> {
    /// Wrap an already resolved boundary
    pub fn with_boundary(variant: Variant, identifier: impl Into<String>, boundary: B) -> Self {
        Self {
            variant,
            identifier: identifier.into(),
            boundary,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    /// Build the launch request `start` would forward
    pub fn request<I, S>(&self, args: I) -> LaunchRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LaunchRequest::new(self.identifier.as_str(), args)
    }

    /// Invoke the native start entry point
    ///
    /// May never return if the native program runs on the calling thread.
    pub fn start<I, S>(&self, args: I) -> Result<(), LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.variant.entry_points();
        let request = self.request(args);

        match entry.start_param {
            StartParam::LaunchString => {
                for (index, arg) in request.ambiguous_args() {
                    warn!(
                        "Argument {} ({:?}) contains '|' and will be split by the native side",
                        index + 1,
                        arg
                    );
                }
                let launch = request.to_c_string()?;
                info!("Starting {} via {}(\"{}\")", self.variant, entry.start, request);
                self.boundary.call_with_str(entry.start, &launch)?;
            }
            StartParam::None => {
                if !request.args().is_empty() {
                    warn!(
                        "{} takes no arguments; dropping {} argument(s)",
                        entry.start,
                        request.args().len()
                    );
                }
                info!("Starting {} via {}()", self.variant, entry.start);
                self.boundary.call(entry.start)?;
            }
        }

        Ok(())
    }

    /// Invoke the native stop entry point
    pub fn stop(&self) -> Result<(), LaunchError> {
        let symbol = self
            .variant
            .entry_points()
            .stop
            .ok_or(LaunchError::StopUnsupported(self.variant))?;
        info!("Stopping {} via {}()", self.variant, symbol);
        self.boundary.call(symbol)?;
        Ok(())
    }
}
