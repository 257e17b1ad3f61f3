use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{CollectionState, CollectionStatus};
use tracing::{debug, warn};

use crate::{api::EmployeeApi, error::SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A load issued later had already been applied; this result was dropped.
    Superseded,
}

struct StoreInner {
    collection: CollectionState,
    issued: u64,
    applied: u64,
    in_flight: BTreeSet<u64>,
    // Status to fall back to once nothing is in flight.
    settled: CollectionStatus,
}

impl StoreInner {
    fn has_newer_in_flight(&self, ticket: u64) -> bool {
        self.in_flight.range(ticket + 1..).next().is_some()
    }

    fn finish(&mut self, ticket: u64) {
        if !self.in_flight.remove(&ticket) {
            return;
        }
        if self.in_flight.is_empty() && self.collection.status == CollectionStatus::Loading {
            self.collection.status = self.settled;
        }
    }
}

fn lock(inner: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

// Releases the ticket when a load future is dropped before completing.
struct InFlight<'a> {
    inner: &'a Mutex<StoreInner>,
    ticket: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut guard = lock(self.inner);
        if guard.in_flight.contains(&self.ticket) {
            debug!(ticket = self.ticket, "store: load abandoned before completion");
            guard.finish(self.ticket);
        }
    }
}

/// The snapshot is only ever replaced wholesale by a full fetch. When several
/// loads overlap, the one issued last wins: a completion is applied only if no
/// newer load has been applied before it, and status stays `Loading` while a
/// newer load is still running.
pub struct DirectoryStore {
    api: Arc<dyn EmployeeApi>,
    inner: Mutex<StoreInner>,
}

impl DirectoryStore {
    pub fn new(api: Arc<dyn EmployeeApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(StoreInner {
                collection: CollectionState::default(),
                issued: 0,
                applied: 0,
                in_flight: BTreeSet::new(),
                settled: CollectionStatus::Loading,
            }),
        }
    }

    pub async fn load(&self) -> Result<LoadOutcome, SyncError> {
        let ticket = {
            let mut guard = lock(&self.inner);
            guard.issued += 1;
            let ticket = guard.issued;
            guard.in_flight.insert(ticket);
            guard.collection.status = CollectionStatus::Loading;
            ticket
        };
        let in_flight = InFlight {
            inner: &self.inner,
            ticket,
        };

        let result = self.api.fetch_all().await;

        let mut guard = lock(&self.inner);
        let superseded = ticket <= guard.applied;
        let newest = !guard.has_newer_in_flight(ticket);

        let outcome = if superseded {
            debug!(ticket, applied = guard.applied, "store: dropping superseded load");
            result.map(|_| LoadOutcome::Superseded)
        } else {
            match result {
                Ok(records) => {
                    guard.applied = ticket;
                    guard.settled = CollectionStatus::Ready;
                    debug!(ticket, count = records.len(), "store: collection replaced");
                    guard.collection.records = records;
                    guard.collection.error_message = None;
                    guard.collection.status = if newest {
                        CollectionStatus::Ready
                    } else {
                        CollectionStatus::Loading
                    };
                    Ok(LoadOutcome::Applied)
                }
                Err(err) if newest => {
                    guard.applied = ticket;
                    guard.settled = CollectionStatus::Failed;
                    warn!(ticket, error = %err, "store: load failed");
                    guard.collection.status = CollectionStatus::Failed;
                    guard.collection.error_message = Some(err.user_message());
                    Err(err)
                }
                Err(err) => {
                    debug!(ticket, error = %err, "store: older load failed while a newer one is in flight");
                    Err(err)
                }
            }
        };

        guard.finish(ticket);
        drop(guard);
        drop(in_flight);
        outcome
    }

    pub async fn snapshot(&self) -> CollectionState {
        lock(&self.inner).collection.clone()
    }

    pub async fn status(&self) -> CollectionStatus {
        lock(&self.inner).collection.status
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
