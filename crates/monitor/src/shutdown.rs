//! Cooperative stop requests.
//!
//! A [`StopHandle`] sets the flag, a [`StopSignal`] observes it. The
//! ingestion loop checks the flag once per iteration and also waits on it so
//! a stop wakes a blocked read.

use tokio::sync::watch;

/// Sending side of the stop flag.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn request_stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving side of the stop flag.
#[derive(Debug)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Create a linked handle and signal, not yet stopped.
    pub fn channel() -> (StopHandle, StopSignal) {
        let (tx, rx) = watch::channel(false);
        (StopHandle { tx }, StopSignal { rx })
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once a stop has been requested.
    ///
    /// Never resolves if every handle is dropped without requesting one.
    pub async fn requested(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Request a stop on SIGINT or SIGTERM.
///
/// Must be called from within the tokio runtime.
pub fn install() -> std::io::Result<StopSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let (handle, stop) = StopSignal::channel();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT");
            }
        }

        handle.request_stop();
    });

    Ok(stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_unstopped() {
        let (_handle, stop) = StopSignal::channel();
        assert!(!stop.is_requested());
    }

    #[test]
    fn test_request_is_visible() {
        let (handle, stop) = StopSignal::channel();
        handle.request_stop();
        assert!(stop.is_requested());
    }

    #[tokio::test]
    async fn test_requested_wakes_waiter() {
        let (handle, mut stop) = StopSignal::channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.request_stop();
        });

        tokio::time::timeout(Duration::from_secs(5), stop.requested())
            .await
            .expect("stop was not observed");
        assert!(stop.is_requested());
    }

    #[tokio::test]
    async fn test_requested_resolves_immediately_when_already_stopped() {
        let (handle, mut stop) = StopSignal::channel();
        handle.request_stop();
        drop(handle);

        tokio::time::timeout(Duration::from_secs(1), stop.requested())
            .await
            .expect("stop was not observed");
    }
}
