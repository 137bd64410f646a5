//! Supervised launch
//!
//! The native start entry point of a daemon usually never returns. Start
//! therefore runs on its own OS thread while the async side waits for either
//! that call to return or an interrupt, which triggers the stop entry point.
//!
//! Stopping is best effort. The daemon's stop raises SIGINT in its own
//! process, which lands on the launcher's interrupt listener instead of
//! ending start. Any interrupt arriving after stop, the daemon's own
//! included, ends the grace period at once; otherwise the launcher gives up
//! when the grace period runs out. Both cases exit non-zero.

use crate::launcher::{LaunchError, Launcher};
use crate::native::NativeBoundary;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::{signal, time};
use tracing::{debug, info, warn};

/// Exit status after an interrupt (128 + SIGINT)
pub const INTERRUPTED_STATUS: u8 = 130;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("Failed to spawn native start thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Failed to listen for interrupts: {0}")]
    Signal(#[source] io::Error),

    #[error("Native start thread exited without reporting")]
    StartAborted,
}

/// How a supervised launch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The start call returned on its own
    Returned,
    /// Stop was invoked and start returned within the grace period
    Stopped,
    /// Stop was invoked but start was still running when the grace period ran out
    StopTimedOut,
    /// Another interrupt arrived while waiting for start to return after stop
    Forced,
    /// Shutdown was requested for a variant without a stop entry point
    Interrupted,
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_status(self) -> u8 {
        match self {
            RunOutcome::Returned | RunOutcome::Stopped => 0,
            RunOutcome::StopTimedOut | RunOutcome::Forced | RunOutcome::Interrupted => {
                INTERRUPTED_STATUS
            }
        }
    }
}

/// Run until the start call returns or Ctrl+C arrives
pub async fn run_supervised<B>(
    launcher: Arc<Launcher<B>>,
    args: Vec<String>,
    grace: Duration,
) -> Result<RunOutcome, RuntimeError>
where
    B: NativeBoundary + 'static,
{
    let interrupts = interrupts().map_err(RuntimeError::Signal)?;
    run_until(launcher, args, grace, interrupts).await
}

/// Run until the start call returns or `shutdown` yields
///
/// The first message invokes stop; a further message during the grace
/// period ends the wait. A closed channel never triggers shutdown.
pub async fn run_until<B>(
    launcher: Arc<Launcher<B>>,
    args: Vec<String>,
    grace: Duration,
    mut shutdown: mpsc::UnboundedReceiver<()>,
) -> Result<RunOutcome, RuntimeError>
where
    B: NativeBoundary + 'static,
{
    let (tx, mut rx) = oneshot::channel();
    let worker = Arc::clone(&launcher);

    // Not joined: a native start that never returns must not keep the
    // launcher process alive once main exits.
    thread::Builder::new()
        .name("native-start".into())
        .spawn(move || {
            let result = worker.start(args);
            let _ = tx.send(result);
        })
        .map_err(RuntimeError::Spawn)?;

    tokio::select! {
        result = &mut rx => {
            result.map_err(|_| RuntimeError::StartAborted)??;
            info!("Native start returned");
            Ok(RunOutcome::Returned)
        }
        Some(()) = shutdown.recv() => {
            info!("Shutdown requested, stopping {}...", launcher.variant());
            match launcher.stop() {
                Ok(()) => {}
                Err(LaunchError::StopUnsupported(variant)) => {
                    warn!("{} cannot be stopped through the native library; exiting", variant);
                    return Ok(RunOutcome::Interrupted);
                }
                Err(e) => return Err(e.into()),
            }

            tokio::select! {
                waited = time::timeout(grace, &mut rx) => match waited {
                    Ok(Ok(result)) => {
                        result?;
                        info!("Native start returned after stop");
                        Ok(RunOutcome::Stopped)
                    }
                    Ok(Err(_)) => Err(RuntimeError::StartAborted),
                    Err(_) => {
                        warn!("Native start still running after {:?}; exiting anyway", grace);
                        Ok(RunOutcome::StopTimedOut)
                    }
                },
                Some(()) = shutdown.recv() => {
                    warn!("Interrupted again while waiting for native start; exiting");
                    Ok(RunOutcome::Forced)
                }
            }
        }
    }
}

/// Forward every SIGINT (Ctrl+C) into a channel
///
/// The listener is registered before returning, so an interrupt raised by
/// the native library right after stop is not lost.
pub fn interrupts() -> io::Result<mpsc::UnboundedReceiver<()>> {
    #[cfg(unix)]
    let mut listener = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    #[cfg(windows)]
    let mut listener = signal::windows::ctrl_c()?;

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while listener.recv().await.is_some() {
            debug!("Received Ctrl+C");
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    Ok(rx)
}
