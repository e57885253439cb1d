use crate::{
    config::ScanConfig,
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
    predicate::{ColumnPredicate, KeyRange, Slot, lower_column},
    scan::{
        ScanPlan, ScanRange,
        framing::{Framing, bound_bytes},
        skip::SkipScanFilter,
    },
    schema::TableSchema,
};
use std::iter;
use tracing::debug;

///
/// CompiledScan
///
/// Plan plus whether the scanned rows still need the caller's predicate
/// evaluator.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledScan {
    pub plan: ScanPlan,
    pub residual: bool,
}

///
/// Alternatives
///

#[derive(Clone, Copy)]
enum Alternatives<'a> {
    Points(&'a [Vec<u8>]),
    Ranges(&'a [KeyRange]),
}

impl Alternatives<'_> {
    const fn len(self) -> usize {
        match self {
            Self::Points(points) => points.len(),
            Self::Ranges(ranges) => ranges.len(),
        }
    }
}

///
/// Component
///
/// One primary-key position inside the bound prefix.
///

#[derive(Clone, Copy)]
struct Component<'a> {
    framing: Framing,
    alternatives: Alternatives<'a>,
}

///
/// ComboBounds
///

struct ComboBounds {
    prefix: Vec<u8>,
    start: Option<Vec<u8>>,
    stop: Vec<u8>,
}

/// Compile one slot per primary-key column into a scan plan.
///
/// Missing trailing slots are unconstrained. Ranges come out disjoint and
/// ascending; an `Empty` slot anywhere yields a plan with no ranges.
pub fn compile(
    schema: &TableSchema,
    slots: &[Slot],
    config: &ScanConfig,
) -> Result<ScanPlan, InternalError> {
    if slots.len() > schema.pk_len() {
        return Err(InternalError::scan_invariant(format!(
            "table '{}' has {} primary-key columns but {} slots were supplied",
            schema.name(),
            schema.pk_len(),
            slots.len()
        )));
    }

    // Phase 1: pad to one slot per primary-key column.
    let slots: Vec<Slot> = slots
        .iter()
        .cloned()
        .chain(iter::repeat(Slot::All))
        .take(schema.pk_len())
        .collect();

    if slots.iter().any(Slot::is_empty) {
        sink::record(MetricsEvent::PlanCompiled {
            ranges: 0,
            skip_scan: false,
        });
        return Ok(ScanPlan::empty());
    }

    // Phase 2: the bound prefix is the leading run of point slots, plus at
    // most one range slot that ends it.
    let components = bound_prefix(schema, &slots);

    // Phase 3: enumerate combinations, or collapse past the cap.
    let combinations = components
        .iter()
        .try_fold(1usize, |acc, c| acc.checked_mul(c.alternatives.len()));
    let degraded = combinations.is_none_or(|count| count > config.max_scan_ranges);

    let ranges = if degraded {
        let count = combinations.unwrap_or(usize::MAX);
        debug!(
            table = schema.name(),
            combinations = count,
            cap = config.max_scan_ranges,
            "scan plan collapsed to one spanning range"
        );
        sink::record(MetricsEvent::PlanDegraded {
            combinations: u64::try_from(count).unwrap_or(u64::MAX),
            cap: u64::try_from(config.max_scan_ranges).unwrap_or(u64::MAX),
        });
        spanning_range(&components).into_iter().collect()
    } else {
        merge_ranges(enumerate_ranges(&components))
    };

    // Phase 4: constrained columns the ranges do not enforce go to the key
    // filter. A collapsed plan enforces none of them.
    let enforced = if degraded { 0 } else { components.len() };
    let key_filter = if config.skip_scan && !ranges.is_empty() {
        SkipScanFilter::new(schema, &slots, enforced)
    } else {
        None
    };

    sink::record(MetricsEvent::PlanCompiled {
        ranges: u64::try_from(ranges.len()).unwrap_or(u64::MAX),
        skip_scan: key_filter.is_some(),
    });

    Ok(ScanPlan {
        ranges,
        key_filter,
        degraded,
    })
}

/// Lower named column predicates and compile them.
///
/// Predicates on key-value columns never narrow the scan and always leave a
/// residual.
pub fn compile_predicates(
    schema: &TableSchema,
    predicates: &[(&str, ColumnPredicate)],
    config: &ScanConfig,
) -> Result<CompiledScan, InternalError> {
    if let Some((name, _)) = predicates
        .iter()
        .find(|(name, _)| schema.column(name).is_none())
    {
        return Err(InternalError::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Predicate,
            format!("table '{}' has no column '{name}'", schema.name()),
        ));
    }

    let mut residual = predicates
        .iter()
        .any(|(name, _)| schema.column(name).is_some_and(|column| !column.is_pk()));

    let mut slots = Vec::with_capacity(schema.pk_len());
    for column in schema.pk_columns() {
        let on_column: Vec<ColumnPredicate> = predicates
            .iter()
            .filter(|(name, _)| *name == column.name())
            .map(|(_, predicate)| predicate.clone())
            .collect();
        let built = lower_column(column, &on_column);
        residual |= built.residual;
        slots.push(built.slot);
    }

    let plan = compile(schema, &slots, config)?;

    // Without a key filter, constrained slots past the enforced prefix are
    // only checked by the caller.
    if !plan.is_empty() && !plan.uses_skip_scan() {
        let enforced = if plan.is_degraded() {
            0
        } else {
            bound_prefix(schema, &slots).len()
        };
        residual |= slots[enforced..].iter().any(|slot| !slot.is_all());
    }

    Ok(CompiledScan { plan, residual })
}

fn bound_prefix<'a>(schema: &TableSchema, slots: &'a [Slot]) -> Vec<Component<'a>> {
    let mut components = Vec::new();

    for (ordinal, (column, slot)) in schema.pk_columns().zip(slots).enumerate() {
        let framing = Framing::of(column.column_type(), schema.is_last_pk(ordinal));
        match slot {
            Slot::Points(points) => components.push(Component {
                framing,
                alternatives: Alternatives::Points(points),
            }),
            Slot::Ranges(ranges) => {
                components.push(Component {
                    framing,
                    alternatives: Alternatives::Ranges(ranges),
                });
                break;
            }
            Slot::All | Slot::Empty => break,
        }
    }

    components
}

// Bounds of one combination; `choice[i]` picks the alternative of component i.
fn combo_bounds(components: &[Component<'_>], choice: &[usize]) -> ComboBounds {
    let mut prefix = Vec::new();

    for (index, component) in components.iter().enumerate() {
        let is_final = index + 1 == components.len();
        match component.alternatives {
            Alternatives::Points(points) => {
                component.framing.push_point(&mut prefix, &points[choice[index]]);
                if is_final {
                    let stop = component.framing.point_stop(&prefix);
                    return ComboBounds {
                        start: Some(prefix.clone()),
                        prefix,
                        stop,
                    };
                }
            }
            Alternatives::Ranges(ranges) => {
                let range = &ranges[choice[index]];
                let start = component
                    .framing
                    .lower_key(&prefix, bound_bytes(&range.lower));
                let stop = component
                    .framing
                    .upper_key(&prefix, bound_bytes(&range.upper));
                return ComboBounds {
                    prefix,
                    start,
                    stop,
                };
            }
        }
    }

    ComboBounds {
        start: Some(Vec::new()),
        prefix: Vec::new(),
        stop: Vec::new(),
    }
}

fn enumerate_ranges(components: &[Component<'_>]) -> Vec<ScanRange> {
    let mut ranges = Vec::new();
    let mut choice = vec![0usize; components.len()];

    loop {
        let bounds = combo_bounds(components, &choice);
        if let Some(start) = bounds.start
            && (bounds.stop.is_empty() || start < bounds.stop)
        {
            ranges.push(ScanRange::new(start, bounds.stop));
        }

        // Odometer: advance the rightmost position that still has room.
        let mut position = components.len();
        loop {
            if position == 0 {
                return ranges;
            }
            position -= 1;
            choice[position] += 1;
            if choice[position] < components[position].alternatives.len() {
                break;
            }
            choice[position] = 0;
        }
    }
}

// One range from the first combination's start to the last one's stop.
fn spanning_range(components: &[Component<'_>]) -> Option<ScanRange> {
    let first = combo_bounds(components, &vec![0usize; components.len()]);
    let last_choice: Vec<usize> = components
        .iter()
        .map(|c| c.alternatives.len().saturating_sub(1))
        .collect();
    let last = combo_bounds(components, &last_choice);

    let start = first.start.unwrap_or(first.prefix);
    (last.stop.is_empty() || start < last.stop).then(|| ScanRange::new(start, last.stop))
}

/// Sort by start and coalesce ranges whose stop reaches the next start.
pub(crate) fn merge_ranges(mut ranges: Vec<ScanRange>) -> Vec<ScanRange> {
    ranges.sort_by(|a, b| a.start.cmp(&b.start));

    let mut merged: Vec<ScanRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut()
            && (last.stop.is_empty() || last.stop >= range.start)
        {
            if !last.stop.is_empty() && (range.stop.is_empty() || range.stop > last.stop) {
                last.stop = range.stop;
            }
            continue;
        }
        merged.push(range);
    }

    merged
}
