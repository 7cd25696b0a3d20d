use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use applink::bus::DomainEvent;
use applink::errors::Result;
use applink::exec::ExecutorBackend;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which packages were requested, in order
/// - immediately reports `BuildStarted` + `BuildFinished` for each of them,
///   with exit code 0 unless overridden per package
/// - or, with `without_reports`, only records and leaves reporting to the
///   test.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<DomainEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    exit_codes: HashMap<String, i32>,
    report: bool,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<DomainEvent>,
        executed: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            runtime_tx,
            executed,
            exit_codes: HashMap::new(),
            report: true,
        }
    }

    /// Make every build of `package` exit with `code`.
    pub fn with_exit_code(mut self, package: &str, code: i32) -> Self {
        self.exit_codes.insert(package.to_string(), code);
        self
    }

    /// Record requests without answering them.
    pub fn without_reports(mut self) -> Self {
        self.report = false;
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn request_builds(
        &mut self,
        packages: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let exit_codes = self.exit_codes.clone();
        let report = self.report;

        Box::pin(async move {
            for package_name in packages {
                executed.lock().unwrap().push(package_name.clone());
                if !report {
                    continue;
                }

                tx.send(DomainEvent::BuildStarted {
                    package_name: package_name.clone(),
                })
                .await
                .map_err(anyhow::Error::from)?;

                let exit_code = exit_codes.get(&package_name).copied().unwrap_or(0);
                tx.send(DomainEvent::BuildFinished {
                    package_name,
                    exit_code,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
