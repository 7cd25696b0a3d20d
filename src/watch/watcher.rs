// src/watch/watcher.rs

use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::bus::DomainEvent;
use crate::watch::batch::ChangeBatch;
use crate::watch::locator::PackageLocator;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch every package directory known to `locator` and send one
/// `PackagesChanged` per debounce window into `runtime_tx`.
///
/// The window opens on the first relevant change and closes `debounce`
/// later; everything that arrives in between lands in the same event.
pub fn spawn_watcher(
    locator: PackageLocator,
    debounce: Duration,
    runtime_tx: mpsc::Sender<DomainEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // No tracing subscriber guarantees on the notify thread.
                    eprintln!("applink: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("applink: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for dir in locator.package_dirs() {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "package directory does not exist; not watching it");
            continue;
        }
        watcher
            .watch(&dir, RecursiveMode::Recursive)
            .with_context(|| format!("watching {}", dir.display()))?;
        debug!(dir = %dir.display(), "watching package directory");
    }

    info!(root = %locator.root().display(), "file watcher started");

    tokio::spawn(async move {
        let mut batch = ChangeBatch::new();

        while let Some(first) = event_rx.recv().await {
            record_event(&locator, &mut batch, first);
            if batch.is_empty() {
                continue;
            }

            let deadline = Instant::now() + debounce;
            while let Ok(Some(event)) = timeout_at(deadline, event_rx.recv()).await {
                record_event(&locator, &mut batch, event);
            }

            if let Some(changed) = batch.take_event() {
                debug!(?changed, "sending batched package changes");
                if runtime_tx.send(changed).await.is_err() {
                    debug!("runtime channel closed; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn record_event(locator: &PackageLocator, batch: &mut ChangeBatch, event: Event) {
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }
    for path in event.paths {
        if let Some(change) = locator.locate(&path) {
            debug!(package = %change.package_name, path = %change.path, "file changed");
            batch.record(change);
        }
    }
}
