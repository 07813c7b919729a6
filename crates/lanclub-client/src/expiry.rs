//! End-of-session cleanup: close denylisted programs and restore the shell.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

/// Kills running programs by executable name.
#[async_trait]
pub trait ProcessTerminator: Send + Sync + 'static {
    /// Terminate every process called `process_name`. Returns whether
    /// anything was killed.
    async fn terminate(&self, process_name: &str) -> io::Result<bool>;
}

/// Puts the desktop back into its locked kiosk state.
#[async_trait]
pub trait ShellControl: Send + Sync + 'static {
    /// Restore the kiosk shell after a session.
    async fn restore(&self) -> io::Result<()>;
}

/// Uses `taskkill /F /IM` on Windows and `pkill -x` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTerminator;

#[async_trait]
impl ProcessTerminator for SystemProcessTerminator {
    async fn terminate(&self, process_name: &str) -> io::Result<bool> {
        let status = if cfg!(windows) {
            tokio::process::Command::new("taskkill")
                .args(["/F", "/IM", process_name])
                .kill_on_drop(true)
                .status()
                .await?
        } else {
            let name = process_name.strip_suffix(".exe").unwrap_or(process_name);
            tokio::process::Command::new("pkill")
                .args(["-x", name])
                .kill_on_drop(true)
                .status()
                .await?
        };
        // pkill exits 1 and taskkill 128 when nothing matched.
        match status.code() {
            Some(0) => Ok(true),
            Some(1) | Some(128) => Ok(false),
            _ => Err(io::Error::other(format!(
                "terminating {process_name} exited with {status}"
            ))),
        }
    }
}

/// Shell stand-in that only records the restore in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingShell;

#[async_trait]
impl ShellControl for LoggingShell {
    async fn restore(&self) -> io::Result<()> {
        info!("Kiosk shell restored");
        Ok(())
    }
}

/// Outcome of one expiry cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryReport {
    /// Countdown generation that expired.
    pub generation: u64,
    /// Programs that were running and got killed.
    pub terminated: Vec<String>,
    /// Programs whose termination failed.
    pub failed: Vec<String>,
    /// Whether the shell restore succeeded.
    pub shell_restored: bool,
}

/// Runs the cleanup at most once per countdown generation.
pub struct ExpiryHandler {
    terminator: Arc<dyn ProcessTerminator>,
    shell: Arc<dyn ShellControl>,
    denylist: Vec<String>,
    handled_generation: AtomicU64,
}

impl std::fmt::Debug for ExpiryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryHandler")
            .field("denylist", &self.denylist)
            .field("handled_generation", &self.handled_generation)
            .finish()
    }
}

impl ExpiryHandler {
    /// Create a handler over the given collaborators.
    pub fn new(
        terminator: Arc<dyn ProcessTerminator>,
        shell: Arc<dyn ShellControl>,
        denylist: Vec<String>,
    ) -> Self {
        Self {
            terminator,
            shell,
            denylist,
            handled_generation: AtomicU64::new(0),
        }
    }

    /// Handler using the OS process killer and the logging shell.
    pub fn system(denylist: Vec<String>) -> Self {
        Self::new(
            Arc::new(SystemProcessTerminator),
            Arc::new(LoggingShell),
            denylist,
        )
    }

    /// Clean up after `generation` expired. Returns `None` if this or a
    /// later generation was already handled.
    pub async fn handle(&self, generation: u64) -> Option<ExpiryReport> {
        if self.handled_generation.fetch_max(generation, Ordering::SeqCst) >= generation {
            return None;
        }

        let mut report = ExpiryReport {
            generation,
            terminated: Vec::new(),
            failed: Vec::new(),
            shell_restored: false,
        };

        for name in &self.denylist {
            match self.terminator.terminate(name).await {
                Ok(true) => report.terminated.push(name.clone()),
                Ok(false) => {}
                Err(e) => {
                    warn!(process = %name, error = %e, "Failed to terminate process");
                    report.failed.push(name.clone());
                }
            }
        }

        match self.shell.restore().await {
            Ok(()) => report.shell_restored = true,
            Err(e) => warn!(error = %e, "Failed to restore kiosk shell"),
        }

        info!(
            generation,
            terminated = report.terminated.len(),
            failed = report.failed.len(),
            "Session expired, cleanup finished"
        );
        Some(report)
    }
}
