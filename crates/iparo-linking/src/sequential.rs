//! Strategies that pick links by sequence number.

use std::collections::BTreeSet;

use iparo_retrieval::Navigator;
use iparo_store::ContentStore;
use iparo_types::SnapshotLink;
use rand::Rng;

use crate::context::LinkContext;
use crate::error::LinkingResult;

/// Resolve `indices` together with the head and sequence 0.
pub(crate) fn resolve_with_ends<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    ctx: &LinkContext<'_>,
    mut indices: BTreeSet<u64>,
) -> LinkingResult<BTreeSet<SnapshotLink>> {
    let latest = ctx.latest_link;
    indices.insert(latest.seq);
    match ctx.first_link {
        Some(first) => {
            indices.remove(&0);
            let mut links = nav.from_indices(latest, indices)?;
            links.insert(first);
            Ok(links)
        }
        None => {
            indices.insert(0);
            Ok(nav.from_indices(latest, indices)?)
        }
    }
}

/// The head's own links plus the head, minus the one that fell out of the window.
pub(crate) fn k_previous(ctx: &LinkContext<'_>, k: usize) -> BTreeSet<SnapshotLink> {
    let latest = ctx.latest_link;
    let mut links = ctx.latest_snapshot.links.clone();
    links.insert(latest);
    if let Some(drop_seq) = latest.seq.checked_sub(k as u64).filter(|s| *s > 0) {
        links.retain(|l| l.seq != drop_seq);
    }
    links
}

/// Up to `k` distinct interior sequence numbers drawn uniformly.
pub(crate) fn random_indices<R: Rng + ?Sized>(latest_seq: u64, k: usize, rng: &mut R) -> BTreeSet<u64> {
    let interior = latest_seq.saturating_sub(1) as usize;
    let amount = k.min(interior);
    rand::seq::index::sample(rng, interior, amount)
        .into_iter()
        .map(|i| i as u64 + 1)
        .collect()
}

/// `(latest + 1) - floor(base^i)` for every power below `latest + 1`.
///
/// Powers sharing a floor collapse to one index, so the loop runs at most
/// once per distinct index however close `base` is to 1.
pub(crate) fn exponential_indices(latest_seq: u64, base: f64) -> BTreeSet<u64> {
    let next = latest_seq + 1;
    let mut indices: BTreeSet<u64> = [0, latest_seq].into_iter().collect();
    let mut exp = 0.0_f64;
    loop {
        let step = base.powf(exp);
        if !(step < next as f64) {
            break;
        }
        let floor = step.floor();
        indices.insert(next - floor as u64);
        exp = next_exponent(base, 1.0, exp, floor);
    }
    indices
}

/// Smallest exponent after `exp` at which `scale * base^exp` floors above
/// `floor`. Skipped exponents would only repeat `floor`.
pub(crate) fn next_exponent(base: f64, scale: f64, exp: f64, floor: f64) -> f64 {
    let mut jump = (((floor + 1.0) / scale).ln() / base.ln()).ceil();
    // The logarithm can land just above a whole number.
    if jump - 1.0 > exp && (scale * base.powf(jump - 1.0)).floor() > floor {
        jump -= 1.0;
    }
    if jump > exp {
        jump
    } else {
        exp + 1.0
    }
}

/// `floor(latest * i / (n + 1))` for `i` in `0..=n+1`.
pub(crate) fn uniform_indices(latest_seq: u64, n: usize) -> BTreeSet<u64> {
    let parts = n as u128 + 1;
    if parts >= u128::from(latest_seq) {
        // Steps of at most one hit every index.
        return (0..=latest_seq).collect();
    }
    (0..=parts)
        .map(|i| (u128::from(latest_seq) * i / parts) as u64)
        .collect()
}

/// Links of the node `s - 1` hops behind the head, plus first and head.
pub(crate) fn s_max_gap<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    ctx: &LinkContext<'_>,
    s: u64,
) -> LinkingResult<BTreeSet<SnapshotLink>> {
    let latest = ctx.latest_link;
    let mut links = BTreeSet::new();

    if s <= latest.seq {
        let anchor_seq = latest.seq + 1 - s;
        if anchor_seq == latest.seq {
            links.extend(ctx.latest_snapshot.links.iter().copied());
        } else {
            let anchor = nav.locate_by_sequence(anchor_seq, latest)?;
            links.extend(nav.snapshot(&anchor)?.links);
        }
    }

    links.insert(nav.first_of(latest, ctx.first_link)?);
    links.insert(latest);
    Ok(links)
}
