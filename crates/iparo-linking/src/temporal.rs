//! Strategies that pick links by capture time.

use std::collections::BTreeSet;

use iparo_retrieval::{Mode, Navigator};
use iparo_store::ContentStore;
use iparo_types::{SnapshotLink, Timestamp};

use crate::context::LinkContext;
use crate::error::LinkingResult;
use crate::sequential::next_exponent;

fn window(first: SnapshotLink, latest: SnapshotLink) -> i128 {
    i128::from(latest.timestamp.as_micros()) - i128::from(first.timestamp.as_micros())
}

/// `n` closest matches for evenly spaced points between first and head.
///
/// With more points than snapshots the chain is walked once and each capture
/// is tested against the points falling nearest to it, so the cost never
/// depends on `n`.
pub(crate) fn uniform<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    ctx: &LinkContext<'_>,
    n: usize,
) -> LinkingResult<BTreeSet<SnapshotLink>> {
    let latest = ctx.latest_link;
    let first = nav.first_of(latest, ctx.first_link)?;
    let window = window(first, latest);
    let parts = n as i128 + 1;

    let mut links = if n as u128 > u128::from(latest.seq) {
        let origin = i128::from(first.timestamp.as_micros());
        let span = window.max(0) as u128;
        let parts = parts as u128;
        closest_matches(&capture_times(nav, latest)?, |lo, hi| {
            let lo = lo.saturating_sub(origin).max(0);
            let hi = hi.saturating_sub(origin).min(span as i128);
            if lo > hi {
                return false;
            }
            if span == 0 {
                return lo == 0;
            }
            // Smallest i with floor(i * span / parts) >= lo.
            let i = (lo as u128).saturating_mul(parts).div_ceil(span).max(1);
            i < parts && i.saturating_mul(span) / parts <= hi as u128
        })
    } else {
        let targets =
            (1..=n as i128).map(|i| first.timestamp.offset((i * window / parts) as i64));
        nav.from_timestamps(latest, targets, Mode::Closest)?
    };
    links.insert(first);
    links.insert(latest);
    Ok(links)
}

/// Walk back in fixed time steps from the head, keeping captures at least
/// `gap` apart where the chain allows it.
pub(crate) fn min_gap<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    ctx: &LinkContext<'_>,
    gap: i64,
) -> LinkingResult<BTreeSet<SnapshotLink>> {
    let latest = ctx.latest_link;
    let mut links: BTreeSet<SnapshotLink> = [latest].into_iter().collect();
    let mut known = BTreeSet::new();
    let mut current = latest;
    let mut target = latest.timestamp;

    while current.seq > 0 {
        target = target - gap;
        let after = nav.resume_by_timestamp(target, current, known, Mode::EarliestAfter)?;
        known = after.known_links;
        let mut next = after.link;
        if next == current {
            let before = nav.resume_by_timestamp(target, current, known, Mode::LatestBefore)?;
            known = before.known_links;
            next = before.link;
        }
        if next.seq >= current.seq {
            break;
        }
        links.insert(next);
        current = next;
    }

    links.insert(nav.first_of(latest, ctx.first_link)?);
    Ok(links)
}

/// Walk back from the head, each step to the furthest capture still within
/// `gap` of the current one, or to the predecessor when none is.
pub(crate) fn max_gap<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    ctx: &LinkContext<'_>,
    gap: i64,
) -> LinkingResult<BTreeSet<SnapshotLink>> {
    let latest = ctx.latest_link;
    let mut links: BTreeSet<SnapshotLink> = [latest].into_iter().collect();
    let mut known = BTreeSet::new();
    let mut current = latest;

    while current.seq > 0 {
        let target = current.timestamp - gap;
        let located = nav.resume_by_timestamp(target, current, known, Mode::EarliestAfter)?;
        known = located.known_links;
        let next = if located.link.seq < current.seq {
            located.link
        } else {
            nav.locate_by_sequence(current.seq - 1, current)?
        };
        links.insert(next);
        current = next;
    }

    Ok(links)
}

/// Closest matches for `head - unit * base^i` while the offset stays inside
/// the window between first and head.
///
/// Offsets sharing a whole microsecond collapse into one target. When there
/// are more powers than snapshots the chain is walked once instead.
pub(crate) fn exponential<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    ctx: &LinkContext<'_>,
    base: f64,
    unit: i64,
) -> LinkingResult<BTreeSet<SnapshotLink>> {
    let latest = ctx.latest_link;
    let first = nav.first_of(latest, ctx.first_link)?;
    let window = window(first, latest) as f64;
    let unit = unit as f64;
    let powers = ((window / unit).ln() / base.ln()).ceil();

    let mut links = if powers > latest.seq as f64 {
        let head = i128::from(latest.timestamp.as_micros());
        closest_matches(&capture_times(nav, latest)?, |lo, hi| {
            let (lo, hi) = (head.saturating_sub(hi), head.saturating_sub(lo));
            let lo = lo.max(1) as f64;
            let mut exp = if lo <= unit {
                0.0
            } else {
                ((lo / unit).ln() / base.ln()).ceil()
            };
            if exp > 0.0 && unit * base.powf(exp - 1.0) >= lo {
                exp -= 1.0;
            } else if unit * base.powf(exp) < lo {
                exp += 1.0;
            }
            let offset = unit * base.powf(exp);
            offset < window && offset.floor() <= hi as f64
        })
    } else {
        let mut targets: Vec<Timestamp> = Vec::new();
        let mut exp = 0.0_f64;
        loop {
            let offset = unit * base.powf(exp);
            if !(offset < window) {
                break;
            }
            let floor = offset.floor();
            targets.push(latest.timestamp - floor as i64);
            exp = next_exponent(base, unit, exp, floor);
        }
        nav.from_timestamps(latest, targets, Mode::Closest)?
    };
    links.insert(first);
    links.insert(latest);
    Ok(links)
}

/// The newest capture of every distinct timestamp in the chain, oldest first.
fn capture_times<S: ContentStore + ?Sized>(
    nav: &Navigator<'_, S>,
    latest: SnapshotLink,
) -> LinkingResult<Vec<SnapshotLink>> {
    let mut captures: Vec<SnapshotLink> = Vec::new();
    for link in nav.list_all(latest)?.into_iter().rev() {
        match captures.last_mut() {
            Some(last) if last.timestamp == link.timestamp => *last = link,
            _ => captures.push(link),
        }
    }
    Ok(captures)
}

/// Captures that are the closest match for at least one target, ties going
/// to the earlier capture. `hit(lo, hi)` reports whether a target lies in
/// the inclusive microsecond range `[lo, hi]`.
fn closest_matches(
    captures: &[SnapshotLink],
    mut hit: impl FnMut(i128, i128) -> bool,
) -> BTreeSet<SnapshotLink> {
    let micros = |i: usize| i128::from(captures[i].timestamp.as_micros());
    let mut found = BTreeSet::new();
    for (i, link) in captures.iter().enumerate() {
        let lo = if i == 0 {
            i128::MIN
        } else {
            (micros(i - 1) + micros(i)).div_euclid(2) + 1
        };
        let hi = if i + 1 == captures.len() {
            i128::MAX
        } else {
            (micros(i) + micros(i + 1)).div_euclid(2)
        };
        if lo <= hi && hit(lo, hi) {
            found.insert(*link);
        }
    }
    found
}
