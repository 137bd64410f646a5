//! Client stub: hands every argument to `startClient` in libp2pc.

use p2pboot_core::{init_logging_from_env, run_stub, Variant};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logging_from_env("warn");
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());
    run_stub(Variant::Client, args)
}
