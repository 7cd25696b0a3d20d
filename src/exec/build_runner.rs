// src/exec/build_runner.rs

//! Single build process runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::bus::DomainEvent;
use crate::exec::backend::BuildJob;

/// Exit code reported when the build process could not be run at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// Run one build: emit `BuildStarted`, run the command, emit `BuildFinished`.
///
/// If the cancel channel fires the child is killed and **no**
/// `BuildFinished` is sent for that instance. Spawn or wait errors are
/// reported as `BuildFinished` with [`SPAWN_FAILURE_EXIT_CODE`].
pub async fn run_build(
    job: BuildJob,
    runtime_tx: mpsc::Sender<DomainEvent>,
    cancel_rx: oneshot::Receiver<()>,
) {
    let package_name = job.package_name.clone();
    if let Err(err) = run_build_inner(job, &runtime_tx, cancel_rx).await {
        error!(
            package = %package_name,
            error = %err,
            "build execution error"
        );
        let _ = runtime_tx
            .send(DomainEvent::BuildFinished {
                package_name,
                exit_code: SPAWN_FAILURE_EXIT_CODE,
            })
            .await;
    }
}

async fn run_build_inner(
    job: BuildJob,
    runtime_tx: &mpsc::Sender<DomainEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<()> {
    runtime_tx
        .send(DomainEvent::BuildStarted {
            package_name: job.package_name.clone(),
        })
        .await
        .context("sending BuildStarted to runtime")?;

    info!(
        package = %job.package_name,
        cmd = %job.command,
        dir = %job.dir.display(),
        "starting build process"
    );

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&job.command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&job.command);
        c
    };

    cmd.current_dir(&job.dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning build for package '{}'", job.package_name))?;

    // Always drain output so pipe buffers never fill up.
    if let Some(stdout) = child.stdout.take() {
        forward_output(job.package_name.clone(), "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_output(job.package_name.clone(), "stderr", stderr);
    }

    tokio::select! {
        status_res = child.wait() => {
            let status = status_res.with_context(|| {
                format!("waiting for build of package '{}'", job.package_name)
            })?;

            let exit_code = status.code().unwrap_or(SPAWN_FAILURE_EXIT_CODE);

            info!(
                package = %job.package_name,
                exit_code,
                success = status.success(),
                "build process exited"
            );

            runtime_tx
                .send(DomainEvent::BuildFinished {
                    package_name: job.package_name.clone(),
                    exit_code,
                })
                .await
                .with_context(|| {
                    format!("sending BuildFinished for '{}' to runtime", job.package_name)
                })?;
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => {
                    info!(package = %job.package_name, "cancelling running build; killing process");
                    if let Err(e) = child.kill().await {
                        warn!(
                            package = %job.package_name,
                            error = %e,
                            "failed to kill build process on cancellation"
                        );
                    }
                }
                Err(e) => {
                    debug!(
                        package = %job.package_name,
                        error = %e,
                        "cancel channel closed without explicit cancellation"
                    );
                }
            }
        }
    }

    Ok(())
}

fn forward_output<R>(package: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(package = %package, stream, "{}", line);
        }
    });
}
