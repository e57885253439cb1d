use crate::{
    error::InternalError,
    group::GroupKey,
    obs::sink::{self, MetricsEvent},
};

/// Fold an ascending stream of keyed rows into one accumulator per
/// contiguous run of equal keys.
///
/// The stream must already be in group-key order; a key that sorts before
/// its predecessor is an error.
pub fn fold_contiguous_groups<V, A>(
    rows: impl IntoIterator<Item = (GroupKey, V)>,
    mut init: impl FnMut() -> A,
    mut fold: impl FnMut(&mut A, V),
) -> Result<Vec<(GroupKey, A)>, InternalError> {
    let mut groups: Vec<(GroupKey, A)> = Vec::new();

    for (key, value) in rows {
        match groups.last_mut() {
            Some((current, acc)) if *current == key => {
                fold(acc, value);
                continue;
            }
            Some((current, _)) if key < *current => {
                return Err(InternalError::group_invariant(
                    "group keys arrived out of order",
                ));
            }
            _ => {}
        }

        let mut acc = init();
        fold(&mut acc, value);
        groups.push((key, acc));
    }

    sink::record(MetricsEvent::GroupsEmitted {
        groups: u64::try_from(groups.len()).unwrap_or(u64::MAX),
    });

    Ok(groups)
}
