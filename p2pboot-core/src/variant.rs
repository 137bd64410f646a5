//! Entry-point naming schemes
//!
//! The native libraries have shipped with several incompatible sets of
//! exported symbols. Each one is a separate variant; they are never merged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the start entry point receives its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartParam {
    /// `extern "C" fn(*const c_char)` taking the launch string
    LaunchString,
    /// `extern "C" fn()`; process arguments are not forwarded
    None,
}

/// Exported symbols of one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoints {
    pub start: &'static str,
    pub start_param: StartParam,
    pub stop: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// `startDaemon(char*)` / `stopDaemon()` in libp2pd
    #[default]
    Daemon,
    /// `startClient(char*)` in libp2pc, no stop
    Client,
    /// `startDaemon()` / `stopDaemon()` in libp2pd, arguments not forwarded
    LegacyDaemon,
    /// `startD()` / `stopD()` in libp2pd, arguments not forwarded
    CompactDaemon,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Daemon,
        Variant::Client,
        Variant::LegacyDaemon,
        Variant::CompactDaemon,
    ];

    /// Logical name of the shared library, before platform decoration
    pub fn library_name(self) -> &'static str {
        match self {
            Variant::Client => "p2pc",
            Variant::Daemon | Variant::LegacyDaemon | Variant::CompactDaemon => "p2pd",
        }
    }

    /// First field of the launch string
    pub fn identifier(self) -> &'static str {
        self.library_name()
    }

    pub fn entry_points(self) -> EntryPoints {
        match self {
            Variant::Daemon => EntryPoints {
                start: "startDaemon",
                start_param: StartParam::LaunchString,
                stop: Some("stopDaemon"),
            },
            Variant::Client => EntryPoints {
                start: "startClient",
                start_param: StartParam::LaunchString,
                stop: None,
            },
            Variant::LegacyDaemon => EntryPoints {
                start: "startDaemon",
                start_param: StartParam::None,
                stop: Some("stopDaemon"),
            },
            Variant::CompactDaemon => EntryPoints {
                start: "startD",
                start_param: StartParam::None,
                stop: Some("stopD"),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Daemon => "daemon",
            Variant::Client => "client",
            Variant::LegacyDaemon => "legacy-daemon",
            Variant::CompactDaemon => "compact-daemon",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_variants_share_library() {
        for variant in [Variant::Daemon, Variant::LegacyDaemon, Variant::CompactDaemon] {
            assert_eq!(variant.library_name(), "p2pd");
            assert_eq!(variant.identifier(), "p2pd");
        }
        assert_eq!(Variant::Client.library_name(), "p2pc");
    }

    #[test]
    fn test_only_client_lacks_stop() {
        for variant in Variant::ALL {
            let has_stop = variant.entry_points().stop.is_some();
            assert_eq!(has_stop, variant != Variant::Client, "{variant}");
        }
    }

    #[test]
    fn test_launch_string_variants() {
        assert_eq!(Variant::Daemon.entry_points().start_param, StartParam::LaunchString);
        assert_eq!(Variant::Client.entry_points().start_param, StartParam::LaunchString);
        assert_eq!(Variant::LegacyDaemon.entry_points().start_param, StartParam::None);
        assert_eq!(Variant::CompactDaemon.entry_points().start, "startD");
    }

    #[test]
    fn test_serde_names_match_display() {
        #[derive(Deserialize)]
        struct Holder {
            variant: Variant,
        }
        for variant in Variant::ALL {
            let holder: Holder = toml::from_str(&format!("variant = \"{variant}\"")).unwrap();
            assert_eq!(holder.variant, variant);
        }
    }
}
