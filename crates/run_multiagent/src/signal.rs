use tokio::signal::unix::{signal, Signal, SignalKind};

/// Listens for the OS signals that end a run (SIGINT, SIGTERM).
///
/// Handlers are registered on construction, so a Ctrl-C arriving before
/// [`ShutdownSignal::recv`] is first awaited is still observed.
pub struct ShutdownSignal {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownSignal {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves once either signal has been received.
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => tracing::debug!("Received SIGINT"),
            _ = self.terminate.recv() => tracing::debug!("Received SIGTERM"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_resolves_recv() {
        let mut shutdown = ShutdownSignal::install().unwrap();
        nix::sys::signal::raise(nix::sys::signal::Signal::SIGTERM).unwrap();
        tokio::time::timeout(Duration::from_secs(5), shutdown.recv())
            .await
            .expect("shutdown signal was not observed");
    }
}
