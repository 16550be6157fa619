use async_trait::async_trait;
use daginit_core::{SignalSource, TerminationSignal};
use nix::sys::signal::Signal;
use tokio::signal::unix::{Signal as SignalStream, SignalKind, signal};
use tracing::debug;

/// Maps a raw Unix signal onto the termination events the supervisor knows
pub fn termination_signal(signal: Signal) -> Option<TerminationSignal> {
    match signal {
        Signal::SIGINT => Some(TerminationSignal::Interrupt),
        Signal::SIGTERM => Some(TerminationSignal::Terminate),
        _ => None,
    }
}

fn register(sig: Signal) -> std::io::Result<SignalStream> {
    let stream = signal(SignalKind::from_raw(sig as i32))?;
    debug!("Registered handler for {}", sig.as_str());
    Ok(stream)
}

/// SIGINT/SIGTERM delivered through tokio's signal driver.
///
/// Install it before launching the release: deliveries are buffered from
/// the moment the handlers are registered.
pub struct UnixSignalSource {
    interrupt: SignalStream,
    terminate: SignalStream,
}

impl UnixSignalSource {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: register(Signal::SIGINT)?,
            terminate: register(Signal::SIGTERM)?,
        })
    }
}

#[async_trait]
impl SignalSource for UnixSignalSource {
    async fn recv(&mut self) -> Option<TerminationSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => termination_signal(Signal::SIGINT),
            Some(()) = self.terminate.recv() => termination_signal(Signal::SIGTERM),
            else => None,
        }
    }
}
