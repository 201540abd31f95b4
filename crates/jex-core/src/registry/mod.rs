//! Bidirectional job ↔ future registry with at-most-one live entry per job
//! identity.
//!
//! Locking discipline:
//! - mutations (`register_if_absent_else_reject`, `remove`, `clear`) hold the
//!   exclusive lock for their full duration;
//! - reads (`cancel`, `is_cancelled`, `get_future`, snapshots, size checks)
//!   hold the shared lock;
//! - caller-supplied code (submit callbacks excepted) never runs under a
//!   lock: `visit` copies a snapshot first, cancellation forwards after the
//!   guard is dropped.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use jex_model::Job;

use crate::error::{CoreError, CoreResult};
use crate::future::{CompletionPrimitive, JobFuture};

struct Indices<J, R> {
    jobs: HashMap<J, JobFuture<R>>,
    futures: HashMap<JobFuture<R>, J>,
}

/// Concurrent registry of job ↔ future pairs.
///
/// Owns the only shared mutable state of the core: two mutually consistent
/// indices behind one `RwLock`. An entry exists in one index iff it exists in
/// the other, and neither is ever exposed by reference: read accessors
/// return defensive copies.
pub struct JobMap<J, R> {
    indices: RwLock<Indices<J, R>>,
}

impl<J: Job, R> JobMap<J, R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            indices: RwLock::new(Indices {
                jobs: HashMap::new(),
                futures: HashMap::new(),
            }),
        }
    }

    // Poisoning is absorbed: a panicking submit callback must not brick the
    // registry for every later caller.
    fn read(&self) -> RwLockReadGuard<'_, Indices<J, R>> {
        self.indices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indices<J, R>> {
        self.indices.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit and record a job, unless the same identity is already live.
    ///
    /// The whole operation is one exclusive critical section: the presence
    /// check, the `submit` call and the conditional record happen without
    /// releasing the lock, so two callers deciding "not present" at once can
    /// never both submit. On a duplicate, the error is returned and `submit`
    /// is never invoked.
    ///
    /// The handle is recorded in both indices only if it is neither done nor
    /// cancelled at registration time: work that completed synchronously
    /// (an immediately-rejected pool submission, say) must not occupy a live
    /// slot nothing will ever clean up. The handle is returned either way.
    pub fn register_if_absent_else_reject<F>(&self, job: J, submit: F) -> CoreResult<JobFuture<R>>
    where
        F: FnOnce() -> Arc<dyn CompletionPrimitive<R>>,
    {
        let mut indices = self.write();

        if indices.jobs.contains_key(&job) {
            debug!(job = %job.name(), "registration rejected, job already running");
            return Err(CoreError::Rejected {
                job: job.name().to_string(),
            });
        }

        let future = JobFuture::new(submit(), job.name());
        if future.is_done() || future.is_cancelled() {
            debug!(job = %job.name(), "handle terminal at registration, not recorded");
            return Ok(future);
        }

        indices.jobs.insert(job.clone(), future.clone());
        indices.futures.insert(future.clone(), job);
        Ok(future)
    }

    /// Remove the entry keyed by `future` from both indices.
    ///
    /// Returns whether an entry existed; removing an already-removed handle
    /// is a benign no-op.
    pub fn remove(&self, future: &JobFuture<R>) -> bool {
        let mut indices = self.write();
        match indices.futures.remove(future) {
            Some(job) => {
                indices.jobs.remove(&job);
                trace!(job = %job.name(), "entry removed");
                true
            }
            None => false,
        }
    }

    /// Atomically empty both indices, returning every handle that was
    /// present so the caller can cancel or await them outside the lock.
    pub fn clear(&self) -> Vec<JobFuture<R>> {
        let mut indices = self.write();
        indices.jobs.clear();
        let drained: Vec<_> = indices.futures.drain().map(|(future, _)| future).collect();
        trace!(count = drained.len(), "registry cleared");
        drained
    }

    /// Invoke `visitor` once per job whose handle is not yet done, in
    /// arbitrary order, stopping the first time it returns `false`.
    ///
    /// Operates on a snapshot: the visitor runs outside any lock and never
    /// observes, or blocks, concurrent mutations. Cancelled-but-not-done
    /// jobs are still visited; only `is_done` skips.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&J) -> bool,
    {
        let snapshot: Vec<(J, JobFuture<R>)> = {
            let indices = self.read();
            indices
                .jobs
                .iter()
                .map(|(job, future)| (job.clone(), future.clone()))
                .collect()
        };

        for (job, future) in &snapshot {
            if future.is_done() {
                continue;
            }
            if !visitor(job) {
                break;
            }
        }
    }

    /// Forward a cancellation request to the live handle for `job`.
    ///
    /// Returns `false` if no live handle exists.
    pub fn cancel(&self, job: &J, interrupt_if_running: bool) -> bool {
        match self.get_future(job) {
            Some(future) => future.cancel(interrupt_if_running),
            None => false,
        }
    }

    /// Forward a cancellation request to every live handle.
    ///
    /// Returns `true` iff every forwarded cancel succeeded (vacuously true
    /// when the registry is empty).
    pub fn cancel_all(&self, interrupt_if_running: bool) -> bool {
        let futures: Vec<JobFuture<R>> = {
            let indices = self.read();
            indices.futures.keys().cloned().collect()
        };

        let mut all = true;
        for future in &futures {
            all = future.cancel(interrupt_if_running) && all;
        }
        all
    }

    /// Whether the live handle for `job` was cancelled; `false` if absent.
    pub fn is_cancelled(&self, job: &J) -> bool {
        match self.get_future(job) {
            Some(future) => future.is_cancelled(),
            None => false,
        }
    }

    /// Clone of the live handle for `job`, if any.
    pub fn get_future(&self, job: &J) -> Option<JobFuture<R>> {
        self.read().jobs.get(job).cloned()
    }

    /// Defensive copy of the job → future index.
    pub fn copy_job_map(&self) -> HashMap<J, JobFuture<R>> {
        self.read()
            .jobs
            .iter()
            .map(|(job, future)| (job.clone(), future.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.read().jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.read().jobs.len()
    }
}

impl<J: Job, R> Default for JobMap<J, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use jex_model::JobDesc;

    use crate::future::{CompletionCell, RunNowFuture};

    fn pending() -> Arc<dyn CompletionPrimitive<i32>> {
        Arc::new(CompletionCell::new())
    }

    fn register(map: &JobMap<JobDesc, i32>, job: &JobDesc) -> JobFuture<i32> {
        map.register_if_absent_else_reject(job.clone(), pending)
            .expect("registration of a fresh job must succeed")
    }

    #[test]
    fn duplicate_registration_is_rejected_without_submitting() {
        let map = JobMap::<JobDesc, i32>::new();
        let job = JobDesc::new("load-codes");
        register(&map, &job);

        let submissions = AtomicUsize::new(0);
        let result = map.register_if_absent_else_reject(job.clone(), || {
            submissions.fetch_add(1, Ordering::SeqCst);
            pending()
        });

        match result {
            Err(CoreError::Rejected { job: name }) => assert_eq!(name, "load-codes"),
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(submissions.load(Ordering::SeqCst), 0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn done_handle_is_not_recorded() {
        let map = JobMap::<JobDesc, i32>::new();

        let future = map
            .register_if_absent_else_reject(JobDesc::new("instant"), || {
                let cell = CompletionCell::new();
                cell.complete(1);
                Arc::new(cell) as Arc<dyn CompletionPrimitive<i32>>
            })
            .expect("handle returned even when not recorded");

        assert!(future.is_done());
        assert!(map.is_empty());
    }

    #[test]
    fn cancelled_handle_is_not_recorded() {
        let map = JobMap::<JobDesc, i32>::new();

        let future = map
            .register_if_absent_else_reject(JobDesc::new("rejected-by-pool"), || {
                let cell = CompletionCell::<i32>::new();
                cell.cancel(false);
                Arc::new(cell) as Arc<dyn CompletionPrimitive<i32>>
            })
            .expect("handle returned even when not recorded");

        assert!(future.is_cancelled());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn indices_stay_bidirectionally_consistent() {
        let map = JobMap::<JobDesc, i32>::new();
        let job = JobDesc::new("sync");
        let future = register(&map, &job);

        assert_eq!(map.get_future(&job), Some(future.clone()));
        assert!(map.copy_job_map().contains_key(&job));

        assert!(map.remove(&future));
        assert!(map.get_future(&job).is_none());
        assert!(!map.copy_job_map().contains_key(&job));
        assert!(!map.remove(&future));
    }

    #[test]
    fn clear_drains_both_indices() {
        let map = JobMap::<JobDesc, i32>::new();
        for i in 0..3 {
            register(&map, &JobDesc::new(format!("job-{i}")));
        }
        assert_eq!(map.len(), 3);

        let drained = map.clear();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());
        assert!(map.clear().is_empty());
    }

    #[test]
    fn visitor_stops_at_first_false() {
        let map = JobMap::<JobDesc, i32>::new();
        for i in 0..3 {
            register(&map, &JobDesc::new(format!("job-{i}")));
        }

        let mut visits = 0;
        map.visit(|_| {
            visits += 1;
            false
        });
        assert_eq!(visits, 1);
    }

    #[test]
    fn visit_skips_done_jobs_only() {
        let map = JobMap::<JobDesc, i32>::new();
        register(&map, &JobDesc::new("live"));

        let done_cell = Arc::new(CompletionCell::new());
        map.register_if_absent_else_reject(JobDesc::new("finishing"), || {
            Arc::clone(&done_cell) as Arc<dyn CompletionPrimitive<i32>>
        })
        .expect("pending at registration");
        done_cell.complete(1);

        let mut visited = Vec::new();
        map.visit(|job| {
            visited.push(job.name().to_string());
            true
        });
        assert_eq!(visited, vec!["live".to_string()]);
    }

    #[test]
    fn visit_still_sees_cancelled_but_not_done_jobs() {
        let map = JobMap::<JobDesc, i32>::new();
        let job = JobDesc::new("inline");
        map.register_if_absent_else_reject(job.clone(), || {
            Arc::new(RunNowFuture::new()) as Arc<dyn CompletionPrimitive<i32>>
        })
        .expect("inline handle is pending at registration");

        assert!(map.cancel(&job, false));
        assert!(map.is_cancelled(&job));

        let mut visits = 0;
        map.visit(|_| {
            visits += 1;
            true
        });
        assert_eq!(visits, 1, "cancelled-but-not-done job must still be visited");
    }

    #[test]
    fn cancel_by_job_is_idempotent_and_absent_is_false() {
        let map = JobMap::<JobDesc, i32>::new();
        let job = JobDesc::new("import");
        register(&map, &job);

        assert!(map.cancel(&job, false));
        assert!(!map.cancel(&job, false));

        let unknown = JobDesc::new("unknown");
        assert!(!map.cancel(&unknown, true));
        assert!(!map.is_cancelled(&unknown));
    }

    #[test]
    fn cancel_all_aggregates_per_handle_results() {
        let map = JobMap::<JobDesc, i32>::new();
        assert!(map.cancel_all(false), "vacuously true on empty registry");

        let job = JobDesc::new("a");
        register(&map, &job);
        register(&map, &JobDesc::new("b"));

        assert!(map.cancel(&job, false));
        // "a" is already cancelled, its second cancel reports false
        assert!(!map.cancel_all(false));
    }

    #[test]
    fn copy_job_map_is_a_defensive_copy() {
        let map = JobMap::<JobDesc, i32>::new();
        register(&map, &JobDesc::new("keep"));

        let mut copy = map.copy_job_map();
        copy.clear();

        assert_eq!(map.len(), 1);
    }

    #[test]
    fn concurrent_registration_admits_exactly_one() {
        let map = Arc::new(JobMap::<JobDesc, i32>::new());
        let job = JobDesc::new("contended");
        let submissions = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let map = Arc::clone(&map);
                let job = job.clone();
                let submissions = Arc::clone(&submissions);
                thread::spawn(move || {
                    map.register_if_absent_else_reject(job, move || {
                        submissions.fetch_add(1, Ordering::SeqCst);
                        pending()
                    })
                    .is_ok()
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().expect("registration thread must not panic"))
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 1);
        assert_eq!(submissions.load(Ordering::SeqCst), 1);
        assert_eq!(map.len(), 1);
    }
}
