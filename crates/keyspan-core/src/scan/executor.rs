use crate::{
    codec::key_successor,
    error::InternalError,
    key::RowKey,
    obs::sink::{self, MetricsEvent},
    scan::{Navigation, ScanPlan, ScanRange, SkipScanFilter, store::OrderedStore},
};
use std::thread;
use tracing::debug;

///
/// ScanStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanStats {
    pub rows_scanned: u64,
    pub rows_matched: u64,
    pub seeks: u64,
}

impl ScanStats {
    const fn absorb(&mut self, other: Self) {
        self.rows_scanned = self.rows_scanned.saturating_add(other.rows_scanned);
        self.rows_matched = self.rows_matched.saturating_add(other.rows_matched);
        self.seeks = self.seeks.saturating_add(other.seeks);
    }
}

///
/// ScanOutput
///
/// Matched rows in ascending key order.
///

#[derive(Clone, Debug)]
pub struct ScanOutput<V> {
    pub rows: Vec<(RowKey, V)>,
    pub stats: ScanStats,
}

///
/// RangeOutcome
///

struct RangeOutcome<V> {
    rows: Vec<(RowKey, V)>,
    stats: ScanStats,
    done: bool,
}

/// Scan every range of `plan` in order on the calling thread.
pub fn execute<S: OrderedStore>(store: &S, plan: &ScanPlan) -> ScanOutput<S::Value> {
    let outcome = scan_ranges(store, plan.ranges(), plan.key_filter());
    record_stats(outcome.stats);

    ScanOutput {
        rows: outcome.rows,
        stats: outcome.stats,
    }
}

/// Scan contiguous chunks of ranges on up to `workers` threads.
///
/// Chunk output is concatenated in range order regardless of which worker
/// finishes first, so rows stay in ascending key order.
pub fn execute_parallel<S>(
    store: &S,
    plan: &ScanPlan,
    workers: usize,
) -> Result<ScanOutput<S::Value>, InternalError>
where
    S: OrderedStore + Sync,
    S::Value: Send,
{
    let ranges = plan.ranges();
    let workers = workers.clamp(1, ranges.len().max(1));
    if workers == 1 {
        return Ok(execute(store, plan));
    }

    let chunk_len = ranges.len().div_ceil(workers);
    let filter = plan.key_filter();

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .chunks(chunk_len)
            .map(|chunk| scope.spawn(move || scan_ranges(store, chunk, filter)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| InternalError::scan_invariant("scan worker panicked"))
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    debug!(workers, chunks = outcomes.len(), "parallel scan joined");

    let mut rows = Vec::new();
    let mut stats = ScanStats::default();
    for outcome in outcomes {
        rows.extend(outcome.rows);
        stats.absorb(outcome.stats);
        // A later chunk cannot match once an earlier one reached the end of
        // the matching key space.
        if outcome.done {
            break;
        }
    }
    record_stats(stats);

    Ok(ScanOutput { rows, stats })
}

fn scan_ranges<S: OrderedStore>(
    store: &S,
    ranges: &[ScanRange],
    filter: Option<&SkipScanFilter>,
) -> RangeOutcome<S::Value> {
    let mut outcome = RangeOutcome {
        rows: Vec::new(),
        stats: ScanStats::default(),
        done: false,
    };

    for range in ranges {
        scan_range(store, range, filter, &mut outcome);
        if outcome.done {
            break;
        }
    }

    outcome
}

fn scan_range<S: OrderedStore>(
    store: &S,
    range: &ScanRange,
    filter: Option<&SkipScanFilter>,
    outcome: &mut RangeOutcome<S::Value>,
) {
    let mut cursor = range.start.clone();

    while let Some((key, value)) = store.first_in(&cursor, &range.stop) {
        outcome.stats.rows_scanned += 1;

        match filter.map_or(Navigation::Include, |filter| filter.navigate(&key)) {
            Navigation::Include => {
                outcome.stats.rows_matched += 1;
                cursor = key_successor(&key);
                outcome.rows.push((RowKey::from_bytes(key), value));
            }
            Navigation::Seek(hint) => {
                outcome.stats.seeks += 1;
                if range.is_past(&hint) {
                    return;
                }
                cursor = hint;
            }
            Navigation::Done => {
                outcome.done = true;
                return;
            }
        }
    }
}

fn record_stats(stats: ScanStats) {
    sink::record(MetricsEvent::RowsScanned {
        rows_scanned: stats.rows_scanned,
        rows_matched: stats.rows_matched,
    });
    if stats.seeks > 0 {
        sink::record(MetricsEvent::Seeks { seeks: stats.seeks });
    }
}
