//! Launch request marshalling
//!
//! A launch request is the identifier token followed by the process
//! arguments, serialized as one `|`-delimited string for the native side.
//! No escaping is applied: the native side splits on every `|`.

use std::ffi::CString;
use std::fmt;
use thiserror::Error;

/// Field separator of the launch string
pub const SEPARATOR: char = '|';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Launch string contains an interior NUL byte at offset {0}")]
    InteriorNul(usize),
}

/// Arguments to forward across the native boundary, prior to serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    identifier: String,
    args: Vec<String>,
}

impl LaunchRequest {
    /// Create a request addressed to `identifier` carrying `args` in order
    pub fn new<I, S>(identifier: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a launch string the way the native side does
    ///
    /// The first field becomes the identifier, every following field an
    /// argument. An argument that originally contained `|` comes back as
    /// several arguments.
    pub fn parse(launch: &str) -> Self {
        let mut fields = launch.split(SEPARATOR);
        // split always yields at least one field
        let identifier = fields.next().unwrap_or_default().to_string();
        Self {
            identifier,
            args: fields.map(str::to_string).collect(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Serialize to `identifier` or `identifier|arg1|...|argN`
    pub fn serialize(&self) -> String {
        let len = self.identifier.len() + self.args.iter().map(|a| a.len() + 1).sum::<usize>();
        let mut out = String::with_capacity(len);
        out.push_str(&self.identifier);
        for arg in &self.args {
            out.push(SEPARATOR);
            out.push_str(arg);
        }
        out
    }

    /// NUL-terminated form handed to a native entry point
    pub fn to_c_string(&self) -> Result<CString, RequestError> {
        CString::new(self.serialize()).map_err(|e| RequestError::InteriorNul(e.nul_position()))
    }

    /// Whether the native side will see exactly these fields after splitting
    pub fn is_lossless(&self) -> bool {
        !self.identifier.contains(SEPARATOR) && !self.args.iter().any(|a| a.contains(SEPARATOR))
    }

    /// Arguments that the native side will split apart
    pub fn ambiguous_args(&self) -> impl Iterator<Item = (usize, &str)> {
        self.args
            .iter()
            .enumerate()
            .filter(|(_, a)| a.contains(SEPARATOR))
            .map(|(i, a)| (i, a.as_str()))
    }
}

impl fmt::Display for LaunchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
