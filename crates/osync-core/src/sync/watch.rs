//! Repeated passes at a fixed interval

use std::thread;
use std::time::Duration;

use super::engine::SyncEngine;
use super::report::SyncResult;
use crate::Result;

/// Run passes until `max_cycles` is reached (forever when `None`).
///
/// A failed pass is reported to `on_cycle` and the loop carries on after the
/// interval. Returns the number of passes run.
pub fn watch(
    engine: &mut SyncEngine<'_>,
    interval: Duration,
    max_cycles: Option<u64>,
    mut on_cycle: impl FnMut(u64, &Result<SyncResult>),
) -> u64 {
    let mut cycle = 0;
    loop {
        cycle += 1;
        tracing::debug!(cycle, "starting sync pass");
        let outcome = engine.run();
        on_cycle(cycle, &outcome);

        if max_cycles.is_some_and(|max| cycle >= max) {
            return cycle;
        }
        thread::sleep(interval);
    }
}
