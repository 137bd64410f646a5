//! Launch-string and call-count properties through the public API

use p2pboot_core::{LaunchRequest, Launcher, NativeBoundary, NativeError, Variant};
use std::ffi::CStr;
use std::sync::Mutex;

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl NativeBoundary for Recorder {
    fn call_with_str(&self, symbol: &str, arg: &CStr) -> Result<(), NativeError> {
        let arg = arg.to_string_lossy().into_owned();
        self.calls.lock().unwrap().push((symbol.to_string(), Some(arg)));
        Ok(())
    }

    fn call(&self, symbol: &str) -> Result<(), NativeError> {
        self.calls.lock().unwrap().push((symbol.to_string(), None));
        Ok(())
    }
}

fn sample_args() -> Vec<Vec<String>> {
    let pool = ["-listen", "4001", "-dht", "", "/ip4/127.0.0.1/tcp/0", "-q", "ünïcode", " spaced "];
    (0..=pool.len())
        .map(|n| pool.iter().cycle().skip(n).take(n).map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn test_serialization_shape_for_all_lengths() {
    for args in sample_args() {
        let request = LaunchRequest::new("p2pd", args.clone());
        let expected = if args.is_empty() {
            "p2pd".to_string()
        } else {
            format!("p2pd|{}", args.join("|"))
        };
        assert_eq!(request.serialize(), expected);
        assert_eq!(request.serialize(), request.serialize());
        assert_eq!(LaunchRequest::parse(&expected), request);
    }
}

#[test]
fn test_one_native_call_per_start() {
    for variant in Variant::ALL {
        for args in sample_args() {
            let launcher = Launcher::with_boundary(variant, variant.identifier(), Recorder::default());
            launcher.start(args.clone()).unwrap();

            let calls = launcher.boundary().calls.lock().unwrap().clone();
            assert_eq!(calls.len(), 1, "{variant} with {args:?}");
            let (symbol, payload) = &calls[0];
            assert_eq!(symbol, variant.entry_points().start);
            match variant {
                Variant::Daemon | Variant::Client => {
                    let expected = LaunchRequest::new(variant.identifier(), args.clone()).serialize();
                    assert_eq!(payload.as_deref(), Some(expected.as_str()));
                }
                Variant::LegacyDaemon | Variant::CompactDaemon => assert!(payload.is_none()),
            }
        }
    }
}

#[test]
fn test_one_native_call_per_stop() {
    for variant in Variant::ALL {
        let launcher = Launcher::with_boundary(variant, variant.identifier(), Recorder::default());
        let result = launcher.stop();
        let calls = launcher.boundary().calls.lock().unwrap().clone();
        match variant.entry_points().stop {
            Some(symbol) => {
                assert!(result.is_ok());
                assert_eq!(calls, vec![(symbol.to_string(), None)]);
            }
            None => {
                assert!(result.is_err());
                assert!(calls.is_empty());
            }
        }
    }
}
