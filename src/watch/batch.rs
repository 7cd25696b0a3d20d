// src/watch/batch.rs

use std::collections::BTreeMap;

use crate::bus::{DomainEvent, PackageChange};
use crate::types::PackageName;
use crate::watch::locator::FileChange;

/// File changes collected over one debounce window.
///
/// A package's change is independent only if every file change recorded for
/// it in the batch was independent.
#[derive(Debug, Clone, Default)]
pub struct ChangeBatch {
    packages: BTreeMap<PackageName, bool>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: FileChange) {
        self.packages
            .entry(change.package_name)
            .and_modify(|independent| *independent &= change.independent)
            .or_insert(change.independent);
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Drain the batch into a `PackagesChanged` event.
    pub fn take_event(&mut self) -> Option<DomainEvent> {
        if self.packages.is_empty() {
            return None;
        }
        let changes = std::mem::take(&mut self.packages)
            .into_iter()
            .map(|(package_name, independent)| PackageChange {
                package_name,
                independent,
            })
            .collect();
        Some(DomainEvent::PackagesChanged { changes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(pkg: &str, independent: bool) -> FileChange {
        FileChange {
            package_name: pkg.into(),
            path: "src/x.ts".into(),
            independent,
        }
    }

    #[test]
    fn one_dependent_affecting_file_makes_the_change_propagating() {
        let mut batch = ChangeBatch::new();
        batch.record(change("ui", true));
        batch.record(change("ui", false));
        batch.record(change("model", true));

        assert_eq!(
            batch.take_event(),
            Some(DomainEvent::PackagesChanged {
                changes: vec![
                    PackageChange::independent("model"),
                    PackageChange::new("ui"),
                ]
            })
        );
        assert!(batch.is_empty());
        assert_eq!(batch.take_event(), None);
    }
}
