use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, ops::Bound};

///
/// KeyRange
///
/// One contiguous interval over column-local encoded bytes.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeyRange {
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
}

impl KeyRange {
    #[must_use]
    pub const fn new(lower: Bound<Vec<u8>>, upper: Bound<Vec<u8>>) -> Self {
        Self { lower, upper }
    }

    /// True when no byte string satisfies both bounds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
            (Bound::Included(lo) | Bound::Excluded(lo), Bound::Excluded(hi))
            | (Bound::Excluded(lo), Bound::Included(hi)) => lo >= hi,
        }
    }

    #[must_use]
    pub fn contains(&self, point: &[u8]) -> bool {
        let above_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(lo) => point >= lo.as_slice(),
            Bound::Excluded(lo) => point > lo.as_slice(),
        };
        let below_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(hi) => point <= hi.as_slice(),
            Bound::Excluded(hi) => point < hi.as_slice(),
        };

        above_lower && below_upper
    }

    /// Intersection of two ranges, `None` when they do not overlap.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let lower = if cmp_lower(&self.lower, &other.lower) == Ordering::Less {
            other.lower.clone()
        } else {
            self.lower.clone()
        };
        let upper = if cmp_upper(&self.upper, &other.upper) == Ordering::Greater {
            other.upper.clone()
        } else {
            self.upper.clone()
        };

        let range = Self { lower, upper };
        (!range.is_empty()).then_some(range)
    }
}

// Lower bounds: Unbounded < Included(x) < Excluded(x).
pub(crate) fn cmp_lower(a: &Bound<Vec<u8>>, b: &Bound<Vec<u8>>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Less,
        (_, Bound::Unbounded) => Ordering::Greater,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            x.cmp(y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => x.cmp(y).then(Ordering::Less),
        (Bound::Excluded(x), Bound::Included(y)) => x.cmp(y).then(Ordering::Greater),
    }
}

// Upper bounds: Excluded(x) < Included(x) < Unbounded.
fn cmp_upper(a: &Bound<Vec<u8>>, b: &Bound<Vec<u8>>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Greater,
        (_, Bound::Unbounded) => Ordering::Less,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            x.cmp(y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => x.cmp(y).then(Ordering::Greater),
        (Bound::Excluded(x), Bound::Included(y)) => x.cmp(y).then(Ordering::Less),
    }
}

///
/// Slot
///
/// Predicate-normalized form of one primary-key column.
/// `Points` are sorted and deduplicated; `Ranges` are sorted and disjoint.
/// Both are non-empty; an impossible predicate is `Empty`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Slot {
    #[default]
    All,
    Empty,
    Points(Vec<Vec<u8>>),
    Ranges(Vec<KeyRange>),
}

impl Slot {
    /// Build a point slot, collapsing to `Empty` when no points remain.
    #[must_use]
    pub fn points(mut points: Vec<Vec<u8>>) -> Self {
        points.sort();
        points.dedup();

        if points.is_empty() {
            Self::Empty
        } else {
            Self::Points(points)
        }
    }

    /// Build a range slot, dropping empty ranges and coalescing overlaps.
    #[must_use]
    pub fn ranges(ranges: Vec<KeyRange>) -> Self {
        let mut ranges: Vec<_> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        ranges.sort_by(|a, b| cmp_lower(&a.lower, &b.lower));

        let mut merged: Vec<KeyRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            if let Some(last) = merged.last_mut()
                && touches(&last.upper, &range.lower)
            {
                if cmp_upper(&range.upper, &last.upper) == Ordering::Greater {
                    last.upper = range.upper;
                }
                continue;
            }
            merged.push(range);
        }

        if merged.is_empty() {
            Self::Empty
        } else {
            Self::Ranges(merged)
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of alternatives the compiler enumerates for this slot.
    #[must_use]
    pub const fn alternatives(&self) -> usize {
        match self {
            Self::All | Self::Empty => 1,
            Self::Points(points) => points.len(),
            Self::Ranges(ranges) => ranges.len(),
        }
    }

    /// True when `value` (column-local bytes) satisfies this slot.
    #[must_use]
    pub fn matches(&self, value: &[u8]) -> bool {
        match self {
            Self::All => true,
            Self::Empty => false,
            Self::Points(points) => points.binary_search_by(|p| p.as_slice().cmp(value)).is_ok(),
            Self::Ranges(ranges) => ranges.iter().any(|range| range.contains(value)),
        }
    }

    /// Conjunction of two slots over the same column.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Empty, _) | (_, Self::Empty) => Self::Empty,
            (Self::All, slot) | (slot, Self::All) => slot.clone(),
            (Self::Points(points), slot @ Self::Ranges(_))
            | (slot @ Self::Ranges(_), Self::Points(points)) => Self::points(
                points
                    .iter()
                    .filter(|point| slot.matches(point))
                    .cloned()
                    .collect(),
            ),
            (Self::Points(a), slot @ Self::Points(_)) => {
                Self::points(a.iter().filter(|point| slot.matches(point)).cloned().collect())
            }
            (Self::Ranges(a), Self::Ranges(b)) => Self::ranges(
                a.iter()
                    .flat_map(|left| b.iter().filter_map(|right| left.intersect(right)))
                    .collect(),
            ),
        }
    }
}

// True when a range ending at `upper` overlaps or abuts one starting at `lower`.
fn touches(upper: &Bound<Vec<u8>>, lower: &Bound<Vec<u8>>) -> bool {
    match (upper, lower) {
        (Bound::Unbounded, _) | (_, Bound::Unbounded) => true,
        (Bound::Included(hi), Bound::Included(lo) | Bound::Excluded(lo))
        | (Bound::Excluded(hi), Bound::Included(lo)) => lo <= hi,
        (Bound::Excluded(hi), Bound::Excluded(lo)) => lo < hi,
    }
}
