use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;

use jex_core::prelude::*;
use jex_observe::{LoggerConfig, init_logger};

/// Submit a job backed by a worker thread that sleeps for `work` and then
/// completes with `value`, honoring cancellation between naps.
fn submit_worker(cell: Arc<CompletionCell<i32>>, value: i32, work: Duration) {
    thread::spawn(move || {
        let naps = (work.as_millis() / 10).max(1);
        for _ in 0..naps {
            if cell.is_cancelled() {
                info!(value, "worker observed cancellation, bailing out");
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        cell.complete(value);
    });
}

fn main() -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig {
        level: "debug".parse()?,
        ..Default::default()
    };
    init_logger(&cfg)?;
    info!("logger initialized");

    // 2) registry shared by every submitter
    let map = JobMap::<JobDesc, i32>::new();

    // 3) a quick job and a slow one
    let quick = JobDesc::new("quick-report");
    let quick_future = map.register_if_absent_else_reject(quick.clone(), || {
        let cell = Arc::new(CompletionCell::new());
        submit_worker(Arc::clone(&cell), 7, Duration::from_millis(50));
        cell as Arc<dyn CompletionPrimitive<i32>>
    })?;

    let slow = JobDesc::new("nightly-sync");
    let slow_future = map.register_if_absent_else_reject(slow.clone(), || {
        let cell = Arc::new(CompletionCell::new());
        submit_worker(Arc::clone(&cell), 99, Duration::from_secs(3600));
        cell as Arc<dyn CompletionPrimitive<i32>>
    })?;
    info!(live = map.len(), "jobs registered");

    // 4) a duplicate submission is rejected without side effects
    if let Err(e) = map.register_if_absent_else_reject(slow.clone(), || unreachable!()) {
        info!(job = e.job(), "duplicate submission rejected: {e}");
    }

    // 5) the quick job finishes on its own
    let value = quick_future.wait()?;
    info!(value, "quick job completed");
    map.remove(&quick_future);

    // 6) the slow one is not going to make it; time out, then cancel
    match slow_future.wait_for(Duration::from_millis(100)) {
        Ok(_) => unreachable!("an hour of naps does not fit into 100ms"),
        Err(e) => info!("timed wait expired as expected: {e}"),
    }
    map.cancel(&slow, true);

    map.visit(|job| {
        info!(job = job.name(), cancelled = map.is_cancelled(job), "still tracked");
        true
    });

    // 7) drain everything that is left
    let drained = map.clear();
    info!(drained = drained.len(), "registry cleared");
    assert!(map.is_empty());

    Ok(())
}
