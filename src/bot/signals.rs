// Signal handling for graceful run loop shutdown
// Every handled signal stops the loop

use crate::error::{ModlinkerError, Result};
use tokio::signal::unix::{signal, Signal as TokioSignal, SignalKind};

/// Signal handler for SIGTERM, SIGINT and SIGHUP
pub struct SignalHandler {
    sigterm: TokioSignal,
    sigint: TokioSignal,
    sighup: TokioSignal,
}

impl SignalHandler {
    /// Create a new signal handler
    pub fn new() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate()).map_err(|e| ModlinkerError::Io {
            source: e,
            context: "Failed to setup SIGTERM handler".to_string(),
        })?;
        let sigint = signal(SignalKind::interrupt()).map_err(|e| ModlinkerError::Io {
            source: e,
            context: "Failed to setup SIGINT handler".to_string(),
        })?;
        let sighup = signal(SignalKind::hangup()).map_err(|e| ModlinkerError::Io {
            source: e,
            context: "Failed to setup SIGHUP handler".to_string(),
        })?;

        Ok(Self {
            sigterm,
            sigint,
            sighup,
        })
    }

    /// Wait for any shutdown signal; returns its name
    pub async fn wait(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::info!("Received SIGTERM");
                "terminate"
            }
            _ = self.sigint.recv() => {
                tracing::info!("Received SIGINT");
                "interrupt"
            }
            _ = self.sighup.recv() => {
                tracing::info!("Received SIGHUP");
                "hangup"
            }
        }
    }
}
