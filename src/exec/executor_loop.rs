// src/exec/executor_loop.rs

//! Main executor loop that manages running build processes.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::bus::DomainEvent;
use crate::exec::backend::BuildJob;
use crate::exec::build_runner::run_build;
use crate::types::PackageName;

/// Internal handle for a currently-running build process.
struct ActiveBuild {
    cancel: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

/// Spawn the background executor loop.
///
/// Each job runs in its own Tokio task, so independent packages build
/// concurrently. Per package there is never more than one process: a job for
/// a package whose previous build is still running cancels that build first.
/// The scheduler never requests such a job, so this only guards against a
/// misbehaving caller.
pub fn spawn_executor(runtime_tx: mpsc::Sender<DomainEvent>) -> mpsc::Sender<BuildJob> {
    let (tx, mut rx) = mpsc::channel::<BuildJob>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut active: HashMap<PackageName, ActiveBuild> = HashMap::new();

        while let Some(job) = rx.recv().await {
            handle_build_job(job, &mut active, &runtime_tx);
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

fn handle_build_job(
    job: BuildJob,
    active: &mut HashMap<PackageName, ActiveBuild>,
    runtime_tx: &mpsc::Sender<DomainEvent>,
) {
    let name = job.package_name.clone();

    if let Some(existing) = active.get_mut(&name) {
        if !existing.handle.is_finished() {
            cancel_existing_build(&name, existing);
        }
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let rt_tx = runtime_tx.clone();
    let spawn_name = name.clone();

    let handle = tokio::spawn(async move {
        run_build(job, rt_tx, cancel_rx).await;
        debug!(package = %spawn_name, "build runner future finished");
    });

    active.insert(
        name,
        ActiveBuild {
            cancel: Some(cancel_tx),
            handle,
        },
    );
}

fn cancel_existing_build(package: &str, existing: &mut ActiveBuild) {
    warn!(
        package = %package,
        "build requested while a previous build is running; cancelling the previous process"
    );

    match existing.cancel.take() {
        Some(cancel) => {
            if cancel.send(()).is_err() {
                debug!(package = %package, "previous build already finished while cancelling");
            }
        }
        None => {
            debug!(package = %package, "no cancel sender present; build may already be cancelled");
        }
    }
}
