// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use applink::bus::{DomainEvent, EventBus, PackageChange};
use applink::engine::{Runtime, RuntimeOptions};
use applink::errors::ApplinkError;
use applink::graph::DependencyGraph;
use applink::scheduler::BuildScheduler;
use applink_test_utils::builders::{chain_abc, sdk_workspace, GraphBuilder};
use applink_test_utils::fake_executor::FakeExecutor;
use applink_test_utils::recording::RecordingListener;
use applink_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn scheduler_bus(recorder: &RecordingListener) -> EventBus {
    let mut bus = EventBus::new();
    bus.subscribe(BuildScheduler::new());
    bus.subscribe(recorder.clone());
    bus
}

async fn seed(
    tx: &mpsc::Sender<DomainEvent>,
    graph: &DependencyGraph,
    changed: &[&str],
) -> TestResult {
    tx.send(DomainEvent::TargetSelected {
        package_scope: graph.packages().map(str::to_string).collect(),
        dependency_graph: Arc::new(graph.clone()),
    })
    .await?;
    tx.send(DomainEvent::PackagesChanged {
        changes: changed.iter().map(|n| PackageChange::new(*n)).collect(),
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn once_mode_builds_chain_and_exits() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        FakeExecutor::new(tx.clone(), Arc::clone(&executed)),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );

    seed(&tx, &chain_abc(), &["C"]).await?;
    let summary = with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec!["C", "B", "A"]);
    assert_eq!(summary.rebuilds, 1);
    assert!(summary.is_clean(), "{summary:?}");
    assert_eq!(
        recorder.rebuilt(),
        vec![vec!["A".to_string(), "B".into(), "C".into()]]
    );
    Ok(())
}

#[tokio::test]
async fn failed_build_stops_the_chain_and_is_summarised() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed)).with_exit_code("C", 1);
    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        executor,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );

    seed(&tx, &chain_abc(), &["C"]).await?;
    let summary = with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec!["C"]);
    assert_eq!(summary.failed, vec!["C".to_string()]);
    assert_eq!(summary.unbuilt, vec!["A".to_string(), "B".into()]);
    assert!(!summary.is_clean());
    assert_eq!(summary.rebuilds, 0);
    assert!(recorder.rebuilt().is_empty());
    Ok(())
}

#[tokio::test]
async fn once_mode_rebuilds_the_whole_sdk() -> TestResult {
    init_tracing();

    let graph = sdk_workspace();
    let all: Vec<String> = graph.packages().map(str::to_string).collect();
    let names: Vec<&str> = all.iter().map(String::as_str).collect();

    let (tx, rx) = mpsc::channel(256);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        FakeExecutor::new(tx.clone(), Arc::clone(&executed)),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );

    seed(&tx, &graph, &names).await?;
    let summary = with_timeout(runtime.run()).await?;

    let mut built = executed.lock().unwrap().clone();
    built.sort();
    assert_eq!(built, all);
    assert!(summary.is_clean(), "{summary:?}");
    assert_eq!(summary.rebuilds, 1);
    Ok(())
}

#[tokio::test]
async fn parallel_roots_are_requested_together() -> TestResult {
    let graph = GraphBuilder::new()
        .depends("app", "left")
        .depends("app", "right")
        .build();

    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        FakeExecutor::new(tx.clone(), Arc::clone(&executed)),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );

    seed(&tx, &graph, &["left", "right"]).await?;
    let summary = with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec!["left", "right", "app"]);
    assert_eq!(summary.rebuilds, 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_request_stops_watch_mode() -> TestResult {
    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        FakeExecutor::new(tx.clone(), Arc::clone(&executed)),
        RuntimeOptions::default(),
    );

    seed(&tx, &chain_abc(), &["A"]).await?;
    tx.send(DomainEvent::ShutdownRequested).await?;

    // The fake answers after the shutdown is already queued, so the build
    // is requested but its result is never processed.
    let summary = with_timeout(runtime.run()).await?;
    assert_eq!(*executed.lock().unwrap(), vec!["A"]);
    assert_eq!(summary.rebuilds, 0);
    assert_eq!(summary.unbuilt, vec!["A".to_string()]);
    Ok(())
}

#[tokio::test]
async fn scheduler_error_aborts_the_runtime() {
    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        FakeExecutor::new(tx.clone(), Arc::clone(&executed)),
        RuntimeOptions::default(),
    );

    seed(&tx, &chain_abc(), &["ghost"]).await.unwrap();

    let err = with_timeout(runtime.run()).await.unwrap_err();
    assert!(matches!(err, ApplinkError::UnknownPackage(name) if name == "ghost"));
    assert!(executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn closed_channel_ends_the_loop() -> TestResult {
    let (tx, rx) = mpsc::channel(64);
    let (exec_tx, _exec_rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        FakeExecutor::new(exec_tx, executed),
        RuntimeOptions::default(),
    );

    let graph = chain_abc();
    tx.send(DomainEvent::TargetSelected {
        package_scope: graph.packages().map(str::to_string).collect(),
        dependency_graph: Arc::new(graph),
    })
    .await?;
    drop(tx);

    let summary = with_timeout(runtime.run()).await?;
    assert_eq!(summary.rebuilds, 0);
    assert_eq!(recorder.events().len(), 1);
    Ok(())
}

#[tokio::test]
async fn change_during_build_keeps_package_unbuilt() -> TestResult {
    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let recorder = RecordingListener::new();

    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed)).without_reports();
    let runtime = Runtime::new(
        scheduler_bus(&recorder),
        rx,
        executor,
        RuntimeOptions::default(),
    );

    seed(&tx, &chain_abc(), &["C"]).await?;
    tx.send(DomainEvent::BuildStarted {
        package_name: "C".into(),
    })
    .await?;
    tx.send(DomainEvent::PackagesChanged {
        changes: vec![PackageChange::new("C")],
    })
    .await?;
    // Succeeds, but against sources that already changed again.
    tx.send(DomainEvent::BuildFinished {
        package_name: "C".into(),
        exit_code: 0,
    })
    .await?;
    tx.send(DomainEvent::ShutdownRequested).await?;

    let summary = with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec!["C", "C"]);
    assert!(summary.failed.is_empty());
    assert_eq!(
        summary.unbuilt,
        vec!["A".to_string(), "B".into(), "C".into()]
    );
    assert!(!summary.is_clean());
    Ok(())
}
