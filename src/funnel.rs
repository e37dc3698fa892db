//!
//! Tailscale funnel helper process
//! -------------------------------
//! Exposes the local server publicly by spawning `tailscale funnel <port>`
//! and scanning its stdout for the share URL. The child process is an
//! explicitly owned [`FunnelHandle`] released through [`FunnelHandle::shutdown`]
//! rather than a process-global checked from a signal callback.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{info, warn};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(https://\S+)").unwrap());

/// How long to wait for the funnel to report its public URL before giving
/// up and continuing without one.
const URL_WAIT: Duration = Duration::from_secs(20);

/// Grace period between terminate and kill on shutdown.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

/// Owned handle to a running funnel child process.
pub struct FunnelHandle {
    child: Child,
    command: String,
}

/// Spawn the funnel for `port` and wait (bounded) for its public URL.
pub async fn start(port: u16) -> Result<FunnelHandle> {
    start_with_command("tailscale", port).await
}

async fn read_share_url(lines: &mut Lines<BufReader<ChildStdout>>) -> Option<String> {
    while let Ok(Some(line)) = lines.next_line().await {
        info!("funnel: {}", line);
        if let Some(m) = URL_RE.captures(&line).and_then(|c| c.get(1)) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

async fn start_with_command(command: &str, port: u16) -> Result<FunnelHandle> {
    let mut child = Command::new(command)
        .args(["funnel", &port.to_string()])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {} funnel", command))?;

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        match tokio::time::timeout(URL_WAIT, read_share_url(&mut lines)).await {
            Ok(Some(url)) => {
                println!("\nShare this link: {}", url);
                info!("Funnel online at {}", url);
            }
            Ok(None) => warn!("funnel exited before reporting a public URL"),
            Err(_) => warn!("timed out waiting for the funnel URL; continuing without one"),
        }
        // Keep draining so the child never blocks on a full pipe.
        tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });
    }

    Ok(FunnelHandle { child, command: command.to_string() })
}

impl FunnelHandle {
    /// Stop the funnel: terminate the child, wait briefly, kill on expiry,
    /// then reset the funnel configuration.
    pub async fn shutdown(mut self) {
        let _ = self.child.start_kill();
        if tokio::time::timeout(SHUTDOWN_WAIT, self.child.wait()).await.is_err() {
            let _ = self.child.kill().await;
        }
        let _ = Command::new(&self.command)
            .args(["funnel", "reset"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
    }
}
