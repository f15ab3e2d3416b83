use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use iparo_retrieval::Navigator;
use iparo_store::ContentStore;
use iparo_types::{SnapshotLink, TimeUnit};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::LinkContext;
use crate::error::{LinkingError, LinkingResult};
use crate::{sequential, temporal};

/// How a new snapshot chooses the earlier snapshots it links to.
///
/// Durations (`gap`, `unit`) are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkingStrategy {
    /// Only the immediate predecessor.
    #[default]
    Single,
    /// Every earlier snapshot.
    Comprehensive,
    /// The `k` most recent snapshots, plus the first.
    KPrevious { k: usize },
    /// Shorthand for `KPrevious { k: 1 }`.
    Previous,
    /// First, head, and `k` interior snapshots sampled uniformly.
    KRandom { k: usize },
    /// Snapshots `base^i` positions back.
    SequentialExponential { base: f64 },
    /// `n` snapshots evenly spaced by sequence number.
    SequentialUniformNPrior { n: usize },
    /// Links inherited from the node `s - 1` positions back.
    SequentialSMaxGap { s: u64 },
    /// `n` snapshots evenly spaced in time.
    TemporallyUniform { n: usize },
    /// A backward walk in steps of at least `gap`.
    TemporallyMinGap { gap: i64 },
    /// A backward walk in steps of at most `gap` where possible.
    TemporallyMaxGap { gap: i64 },
    /// Snapshots `unit * base^i` back in time.
    TemporallyExponential { base: f64, unit: i64 },
}

impl LinkingStrategy {
    /// Check the parameters.
    pub fn validate(&self) -> LinkingResult<()> {
        let bad = |msg: String| Err(LinkingError::Configuration(msg));
        match *self {
            Self::KPrevious { k } | Self::KRandom { k } if k == 0 => bad(format!("{self:?}: k must be at least 1")),
            Self::SequentialUniformNPrior { n } | Self::TemporallyUniform { n } if n == 0 => {
                bad(format!("{self:?}: n must be at least 1"))
            }
            Self::SequentialSMaxGap { s } if s == 0 => bad(format!("{self:?}: s must be at least 1")),
            Self::SequentialExponential { base } if !(base > 1.0) => {
                bad(format!("{self:?}: base must be greater than 1"))
            }
            Self::TemporallyExponential { base, .. } if !(base > 1.0) => {
                bad(format!("{self:?}: base must be greater than 1"))
            }
            Self::TemporallyExponential { unit, .. } if unit <= 0 => {
                bad(format!("{self:?}: unit must be positive"))
            }
            Self::TemporallyMinGap { gap } | Self::TemporallyMaxGap { gap } if gap <= 0 => {
                bad(format!("{self:?}: gap must be positive"))
            }
            _ => Ok(()),
        }
    }

    /// Representative instances of every variant, as listed by the CLI.
    pub fn catalog() -> Vec<Self> {
        let minute = TimeUnit::Minutes.micros();
        vec![
            Self::Single,
            Self::Comprehensive,
            Self::Previous,
            Self::KPrevious { k: 3 },
            Self::KRandom { k: 3 },
            Self::SequentialExponential { base: 2.0 },
            Self::SequentialUniformNPrior { n: 4 },
            Self::SequentialSMaxGap { s: 4 },
            Self::TemporallyUniform { n: 4 },
            Self::TemporallyMinGap { gap: minute },
            Self::TemporallyMaxGap { gap: minute },
            Self::TemporallyExponential {
                base: 2.0,
                unit: TimeUnit::Seconds.micros(),
            },
        ]
    }

    /// Choose links for the snapshot that will follow `ctx.latest_link`,
    /// drawing randomness from the thread-local generator.
    pub fn select_links<S: ContentStore + ?Sized>(
        &self,
        nav: &Navigator<'_, S>,
        ctx: &LinkContext<'_>,
    ) -> LinkingResult<BTreeSet<SnapshotLink>> {
        self.select_links_with_rng(nav, ctx, &mut rand::thread_rng())
    }

    /// Choose links for the snapshot that will follow `ctx.latest_link`.
    pub fn select_links_with_rng<S, R>(
        &self,
        nav: &Navigator<'_, S>,
        ctx: &LinkContext<'_>,
        rng: &mut R,
    ) -> LinkingResult<BTreeSet<SnapshotLink>>
    where
        S: ContentStore + ?Sized,
        R: Rng + ?Sized,
    {
        self.validate()?;
        let latest = ctx.latest_link;

        let links = match *self {
            Self::Single => [latest].into_iter().collect(),
            Self::Comprehensive => {
                let mut links = ctx.latest_snapshot.links.clone();
                links.insert(latest);
                links
            }
            Self::KPrevious { k } => sequential::k_previous(ctx, k),
            Self::Previous => sequential::k_previous(ctx, 1),
            Self::KRandom { k } => {
                let indices = sequential::random_indices(latest.seq, k, rng);
                sequential::resolve_with_ends(nav, ctx, indices)?
            }
            Self::SequentialExponential { base } => {
                let indices = sequential::exponential_indices(latest.seq, base);
                sequential::resolve_with_ends(nav, ctx, indices)?
            }
            Self::SequentialUniformNPrior { n } => {
                let indices = sequential::uniform_indices(latest.seq, n);
                sequential::resolve_with_ends(nav, ctx, indices)?
            }
            Self::SequentialSMaxGap { s } => sequential::s_max_gap(nav, ctx, s)?,
            Self::TemporallyUniform { n } => temporal::uniform(nav, ctx, n)?,
            Self::TemporallyMinGap { gap } => temporal::min_gap(nav, ctx, gap)?,
            Self::TemporallyMaxGap { gap } => temporal::max_gap(nav, ctx, gap)?,
            Self::TemporallyExponential { base, unit } => temporal::exponential(nav, ctx, base, unit)?,
        };

        debug!(strategy = %self, next_seq = ctx.next_seq(), count = links.len(), "selected links");
        Ok(links)
    }
}

fn secs(micros: i64) -> f64 {
    micros as f64 / TimeUnit::Seconds.micros() as f64
}

impl fmt::Display for LinkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "Single"),
            Self::Comprehensive => write!(f, "Comprehensive"),
            Self::KPrevious { k } => write!(f, "{k}-Previous"),
            Self::Previous => write!(f, "Previous"),
            Self::KRandom { k } => write!(f, "{k}-Random"),
            Self::SequentialExponential { base } => write!(f, "Base-{base} Sequential Exponential"),
            Self::SequentialUniformNPrior { n } => write!(f, "Sequential Uniform {n}-Prior"),
            Self::SequentialSMaxGap { s } => write!(f, "Sequential {s}-Max-Gap"),
            Self::TemporallyUniform { n } => write!(f, "Temporally Uniform ({n} Nodes)"),
            Self::TemporallyMinGap { gap } => write!(f, "Temporally Min Gap ({} Seconds)", secs(*gap)),
            Self::TemporallyMaxGap { gap } => write!(f, "Temporally Max Gap ({} Seconds)", secs(*gap)),
            Self::TemporallyExponential { base, unit } => write!(
                f,
                "Temporally Exponential ({} Second(s), Base {base})",
                secs(*unit)
            ),
        }
    }
}

/// Parse a duration such as `90`, `90s`, `500ms`, `5m`, `2h` or `1d`.
/// A bare number is read as seconds. Returns microseconds.
fn parse_duration(s: &str) -> Result<i64, String> {
    let s = s.trim();
    let split = s.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);
    let unit = match suffix {
        "" | "s" => TimeUnit::Seconds,
        "ms" => TimeUnit::Milliseconds,
        "m" => TimeUnit::Minutes,
        "h" => TimeUnit::Hours,
        "d" => TimeUnit::Days,
        other => return Err(format!("unknown duration unit `{other}` in `{s}`")),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration `{s}`"))?;
    Ok((value * unit.micros() as f64).round() as i64)
}

fn parse_param<T: FromStr>(name: &str, raw: Option<&str>) -> Result<T, String> {
    let raw = raw.ok_or_else(|| format!("strategy `{name}` needs a parameter, e.g. `{name}:3`"))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid parameter `{raw}` for strategy `{name}`"))
}

/// Parses the compact CLI form `kind[:param[,param]]`, e.g. `single`,
/// `k_previous:3`, `temporally_min_gap:10m`, `temporally_exponential:2,1s`.
impl FromStr for LinkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, params) = match s.split_once(':') {
            Some((kind, params)) => (kind, Some(params)),
            None => (s, None),
        };
        let kind = kind.trim().to_ascii_lowercase().replace('-', "_");
        let mut parts = params.map(|p| p.split(',')).into_iter().flatten();
        let mut next = || parts.next();

        let strategy = match kind.as_str() {
            "single" => Self::Single,
            "comprehensive" => Self::Comprehensive,
            "previous" => Self::Previous,
            "k_previous" => Self::KPrevious { k: parse_param(&kind, next())? },
            "k_random" => Self::KRandom { k: parse_param(&kind, next())? },
            "sequential_exponential" => Self::SequentialExponential {
                base: parse_param(&kind, next())?,
            },
            "sequential_uniform_n_prior" => Self::SequentialUniformNPrior {
                n: parse_param(&kind, next())?,
            },
            "sequential_s_max_gap" => Self::SequentialSMaxGap { s: parse_param(&kind, next())? },
            "temporally_uniform" => Self::TemporallyUniform { n: parse_param(&kind, next())? },
            "temporally_min_gap" => Self::TemporallyMinGap {
                gap: parse_duration(next().ok_or("temporally_min_gap needs a gap")?)?,
            },
            "temporally_max_gap" => Self::TemporallyMaxGap {
                gap: parse_duration(next().ok_or("temporally_max_gap needs a gap")?)?,
            },
            "temporally_exponential" => {
                let base = parse_param(&kind, next())?;
                let unit = next().map(parse_duration).transpose()?;
                Self::TemporallyExponential {
                    base,
                    unit: unit.unwrap_or(TimeUnit::Seconds.micros()),
                }
            }
            other => return Err(format!("unknown linking strategy `{other}`")),
        };
        strategy.validate().map_err(|e| e.to_string())?;
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iparo_store::InMemoryContentStore;
    use iparo_types::{Snapshot, Timestamp};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Write `count` snapshots with `strategy`, the way the archive does,
    /// and return the stored links in sequence order.
    fn grow(
        strategy: &LinkingStrategy,
        timestamps: &[Timestamp],
    ) -> (InMemoryContentStore, Vec<SnapshotLink>) {
        let store = InMemoryContentStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut links: Vec<SnapshotLink> = Vec::new();

        for (seq, ts) in timestamps.iter().enumerate() {
            let embedded = match links.last() {
                None => BTreeSet::new(),
                Some(latest) => {
                    let latest_snapshot = store.retrieve(&latest.id).unwrap();
                    let ctx = LinkContext::new(*latest, &latest_snapshot);
                    strategy
                        .select_links_with_rng(&Navigator::new(&store), &ctx, &mut rng)
                        .unwrap()
                }
            };
            let snapshot = Snapshot::new(
                "example.com",
                *ts,
                seq as u64,
                format!("Node {seq}").into_bytes(),
                embedded,
            );
            let id = store.store(&snapshot).unwrap();
            links.push(snapshot.link(id));
        }
        (store, links)
    }

    fn every_ten_secs(n: i64) -> Vec<Timestamp> {
        (0..n).map(|i| Timestamp::from_secs(i * 10)).collect()
    }

    fn linked_seqs(store: &InMemoryContentStore, link: &SnapshotLink) -> Vec<u64> {
        let mut seqs: Vec<u64> = store
            .retrieve(&link.id)
            .unwrap()
            .links
            .iter()
            .map(|l| l.seq)
            .collect();
        seqs.sort_unstable();
        seqs
    }

    // -----------------------------------------------------------------------
    // Sequential strategies
    // -----------------------------------------------------------------------

    #[test]
    fn single_links_only_the_predecessor() {
        let (store, links) = grow(&LinkingStrategy::Single, &every_ten_secs(100));
        for (i, link) in links.iter().enumerate() {
            let seqs = linked_seqs(&store, link);
            assert_eq!(seqs.len(), i.min(1));
            if i > 0 {
                assert_eq!(seqs, vec![i as u64 - 1]);
            }
        }
    }

    #[test]
    fn comprehensive_links_everything_before() {
        let (store, links) = grow(&LinkingStrategy::Comprehensive, &every_ten_secs(30));
        for (i, link) in links.iter().enumerate() {
            assert_eq!(linked_seqs(&store, link), (0..i as u64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn k_previous_keeps_a_window_and_the_first() {
        let (store, links) = grow(&LinkingStrategy::KPrevious { k: 3 }, &every_ten_secs(12));
        assert_eq!(linked_seqs(&store, &links[1]), vec![0]);
        assert_eq!(linked_seqs(&store, &links[4]), vec![0, 1, 2, 3]);
        assert_eq!(linked_seqs(&store, &links[5]), vec![0, 2, 3, 4]);
        assert_eq!(linked_seqs(&store, &links[10]), vec![0, 7, 8, 9]);
    }

    #[test]
    fn previous_is_one_previous() {
        let (store, links) = grow(&LinkingStrategy::Previous, &every_ten_secs(6));
        assert_eq!(linked_seqs(&store, &links[1]), vec![0]);
        assert_eq!(linked_seqs(&store, &links[2]), vec![0, 1]);
        assert_eq!(linked_seqs(&store, &links[5]), vec![0, 4]);
    }

    #[test]
    fn k_random_bounds_link_count() {
        let (store, links) = grow(&LinkingStrategy::KRandom { k: 3 }, &every_ten_secs(40));
        for (i, link) in links.iter().enumerate().skip(1) {
            let seqs = linked_seqs(&store, link);
            assert!(seqs.len() <= 5, "node {i} has {} links", seqs.len());
            assert_eq!(seqs.first(), Some(&0));
            assert_eq!(seqs.last(), Some(&(i as u64 - 1)));
        }
        assert_eq!(linked_seqs(&store, &links[39]).len(), 5);
    }

    #[test]
    fn sequential_exponential_base_two() {
        let (store, links) = grow(
            &LinkingStrategy::SequentialExponential { base: 2.0 },
            &every_ten_secs(100),
        );
        for (i, link) in links.iter().enumerate() {
            let seqs = linked_seqs(&store, link);
            if i == 0 {
                assert!(seqs.is_empty());
                continue;
            }
            let i = i as u64;
            let expected_len = 1 + (i as f64).log2().ceil() as usize;
            assert_eq!(seqs.len(), expected_len, "node {i}");

            let mut expected: BTreeSet<u64> = [0, i - 1].into_iter().collect();
            let mut step = 1u64;
            while step < i {
                expected.insert(i - step);
                step *= 2;
            }
            assert_eq!(seqs, expected.into_iter().collect::<Vec<_>>(), "node {i}");
        }
    }

    #[test]
    fn sequential_uniform_n_prior_spreads_links() {
        let (store, links) = grow(
            &LinkingStrategy::SequentialUniformNPrior { n: 3 },
            &every_ten_secs(10),
        );
        assert_eq!(linked_seqs(&store, &links[9]), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn s_max_gap_of_one_matches_comprehensive() {
        let (store, links) = grow(&LinkingStrategy::SequentialSMaxGap { s: 1 }, &every_ten_secs(15));
        for (i, link) in links.iter().enumerate() {
            assert_eq!(linked_seqs(&store, link), (0..i as u64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn s_max_gap_inherits_from_anchor() {
        let (store, links) = grow(&LinkingStrategy::SequentialSMaxGap { s: 3 }, &every_ten_secs(8));
        // Until the anchor exists only first and head are linked.
        assert_eq!(linked_seqs(&store, &links[2]), vec![0, 1]);
        assert_eq!(linked_seqs(&store, &links[3]), vec![0, 2]);
        // Node 4: anchor #1 links {0}, plus first and head #3.
        assert_eq!(linked_seqs(&store, &links[4]), vec![0, 3]);
        // Node 5: anchor #2 links {0, 1}, plus head #4.
        assert_eq!(linked_seqs(&store, &links[5]), vec![0, 1, 4]);
    }

    // -----------------------------------------------------------------------
    // Temporal strategies
    // -----------------------------------------------------------------------

    #[test]
    fn temporally_uniform_spreads_over_the_window() {
        let (store, links) = grow(&LinkingStrategy::TemporallyUniform { n: 3 }, &every_ten_secs(10));
        // Head #8 at 80 s, window 80 s: targets 20, 40, 60.
        assert_eq!(linked_seqs(&store, &links[9]), vec![0, 2, 4, 6, 8]);
    }

    fn irregular_secs() -> Vec<Timestamp> {
        [0, 7, 9, 30, 31, 55, 80, 81, 90, 140, 150]
            .into_iter()
            .map(Timestamp::from_secs)
            .collect()
    }

    /// Closest capture for each target by linear scan, ties to the earlier.
    fn closest_by_scan(times: &[Timestamp], targets: &[Timestamp]) -> BTreeSet<u64> {
        targets
            .iter()
            .map(|t| {
                let mut best = 0;
                for (j, ts) in times.iter().enumerate() {
                    if (ts.as_micros() - t.as_micros()).abs()
                        < (times[best].as_micros() - t.as_micros()).abs()
                    {
                        best = j;
                    }
                }
                best as u64
            })
            .collect()
    }

    fn expected_with_ends(times: &[Timestamp], targets: &[Timestamp]) -> Vec<u64> {
        let mut expected = closest_by_scan(times, targets);
        expected.insert(0);
        expected.insert(times.len() as u64 - 1);
        expected.into_iter().collect()
    }

    #[test]
    fn temporally_uniform_matches_a_linear_scan() {
        let times = irregular_secs();
        // Node 10 links against head #9; n = 5 resolves point by point,
        // n = 12 exceeds the chain and takes the single walk.
        for n in [5usize, 12, 40] {
            let (store, links) = grow(&LinkingStrategy::TemporallyUniform { n }, &times);
            let head = &times[..10];
            let window = head[9].as_micros() - head[0].as_micros();
            let parts = n as i64 + 1;
            let targets: Vec<Timestamp> = (1..=n as i64)
                .map(|i| head[0] + i * window / parts)
                .collect();
            assert_eq!(linked_seqs(&store, &links[10]), expected_with_ends(head, &targets), "n = {n}");
        }
    }

    #[test]
    fn temporally_exponential_matches_a_linear_scan() {
        let times = irregular_secs();
        let unit = TimeUnit::Seconds.micros();
        // Base 4 has fewer powers than snapshots; base 1.5 has more.
        for base in [4.0, 1.5] {
            let strategy = LinkingStrategy::TemporallyExponential { base, unit };
            let (store, links) = grow(&strategy, &times);
            let head = &times[..10];
            let window = (head[9].as_micros() - head[0].as_micros()) as f64;
            let mut targets = Vec::new();
            let mut k = 0;
            while unit as f64 * base.powi(k) < window {
                targets.push(head[9] - (unit as f64 * base.powi(k)).floor() as i64);
                k += 1;
            }
            assert_eq!(linked_seqs(&store, &links[10]), expected_with_ends(head, &targets), "base = {base}");
        }
    }

    #[test]
    fn extreme_parameters_stay_bounded_by_the_chain() {
        let everything: Vec<u64> = (0..9).collect();
        for strategy in [
            LinkingStrategy::SequentialUniformNPrior { n: usize::MAX },
            LinkingStrategy::SequentialExponential { base: 1.0 + 1e-9 },
            LinkingStrategy::TemporallyUniform { n: usize::MAX },
            LinkingStrategy::TemporallyExponential {
                base: 1.0 + 1e-9,
                unit: 1,
            },
            LinkingStrategy::KRandom { k: usize::MAX },
        ] {
            let (store, links) = grow(&strategy, &every_ten_secs(10));
            assert_eq!(linked_seqs(&store, &links[9]), everything, "{strategy}");
        }
    }

    #[test]
    fn temporally_exponential_doubles_the_offset() {
        let strategy = LinkingStrategy::TemporallyExponential {
            base: 2.0,
            unit: TimeUnit::Seconds.micros() * 10,
        };
        let (store, links) = grow(&strategy, &every_ten_secs(10));
        // Head at 80 s: offsets 10, 20, 40 s.
        assert_eq!(linked_seqs(&store, &links[9]), vec![0, 4, 6, 7, 8]);
    }

    #[test]
    fn temporally_max_gap_walks_in_bounded_steps() {
        let strategy = LinkingStrategy::TemporallyMaxGap {
            gap: TimeUnit::Seconds.micros() * 25,
        };
        let (store, links) = grow(&strategy, &every_ten_secs(10));
        assert_eq!(linked_seqs(&store, &links[9]), vec![0, 2, 4, 6, 8]);

        let tight = LinkingStrategy::TemporallyMaxGap {
            gap: TimeUnit::Seconds.micros() * 5,
        };
        let (store, links) = grow(&tight, &every_ten_secs(10));
        assert_eq!(linked_seqs(&store, &links[9]), (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn temporally_min_gap_steps_back_from_head() {
        let strategy = LinkingStrategy::TemporallyMinGap {
            gap: TimeUnit::Seconds.micros() * 25,
        };
        let (store, links) = grow(&strategy, &every_ten_secs(10));
        // Targets 55, 30, 5, -20 s from the head at 80 s.
        assert_eq!(linked_seqs(&store, &links[9]), vec![0, 1, 3, 6, 8]);
    }

    // -----------------------------------------------------------------------
    // Every strategy
    // -----------------------------------------------------------------------

    #[test]
    fn every_strategy_keeps_the_chain_connected() {
        // Irregular, with repeated timestamps.
        let secs = [0, 3, 3, 4, 20, 21, 21, 21, 60, 61, 90, 200, 200, 201, 500, 501, 502, 900];
        let timestamps: Vec<Timestamp> = secs.iter().map(|s| Timestamp::from_secs(*s)).collect();

        for strategy in LinkingStrategy::catalog() {
            let (store, links) = grow(&strategy, &timestamps);
            for (i, link) in links.iter().enumerate().skip(1) {
                let snapshot = store.retrieve(&link.id).unwrap();
                assert!(snapshot.links_point_backwards(), "{strategy}: node {i}");
                assert!(snapshot.predecessor().is_some(), "{strategy}: node {i}");
            }
            let head = *links.last().unwrap();
            let all = Navigator::new(&store).list_all(head).unwrap();
            assert_eq!(all.len(), links.len(), "{strategy}");
        }
    }

    #[test]
    fn known_first_link_is_used_as_is() {
        let (store, links) = grow(&LinkingStrategy::Single, &every_ten_secs(20));
        let head = links[19];
        let head_snapshot = store.retrieve(&head.id).unwrap();
        let ctx = LinkContext::new(head, &head_snapshot).with_first(links[0]);

        store.reset_counts();
        let selected = LinkingStrategy::SequentialExponential { base: 2.0 }
            .select_links(&Navigator::new(&store), &ctx)
            .unwrap();
        assert!(selected.contains(&links[0]));
        // Indices 19, 18, 16, 12, 4: the walk stops at #4.
        assert_eq!(store.counts().retrieves, 15);
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    #[test]
    fn invalid_parameters_are_rejected() {
        let bad = [
            LinkingStrategy::KPrevious { k: 0 },
            LinkingStrategy::KRandom { k: 0 },
            LinkingStrategy::SequentialExponential { base: 1.0 },
            LinkingStrategy::SequentialExponential { base: f64::NAN },
            LinkingStrategy::SequentialUniformNPrior { n: 0 },
            LinkingStrategy::SequentialSMaxGap { s: 0 },
            LinkingStrategy::TemporallyUniform { n: 0 },
            LinkingStrategy::TemporallyMinGap { gap: 0 },
            LinkingStrategy::TemporallyMaxGap { gap: -1 },
            LinkingStrategy::TemporallyExponential { base: 0.5, unit: 1 },
            LinkingStrategy::TemporallyExponential { base: 2.0, unit: 0 },
        ];
        for strategy in bad {
            assert!(
                matches!(strategy.validate(), Err(LinkingError::Configuration(_))),
                "{strategy:?} should be rejected"
            );
        }
        for strategy in LinkingStrategy::catalog() {
            strategy.validate().unwrap();
        }
    }

    #[test]
    fn select_links_validates_first() {
        let store = InMemoryContentStore::new();
        let first = Snapshot::first("example.com", Timestamp::EPOCH, vec![]);
        let id = store.store(&first).unwrap();
        let ctx = LinkContext::new(first.link(id), &first);
        let err = LinkingStrategy::KPrevious { k: 0 }
            .select_links(&Navigator::new(&store), &ctx)
            .unwrap_err();
        assert!(matches!(err, LinkingError::Configuration(_)));
    }

    #[test]
    fn display_names() {
        assert_eq!(LinkingStrategy::KPrevious { k: 3 }.to_string(), "3-Previous");
        assert_eq!(
            LinkingStrategy::SequentialExponential { base: 2.0 }.to_string(),
            "Base-2 Sequential Exponential"
        );
        assert_eq!(
            LinkingStrategy::TemporallyMinGap {
                gap: TimeUnit::Minutes.micros()
            }
            .to_string(),
            "Temporally Min Gap (60 Seconds)"
        );
    }

    #[test]
    fn parse_compact_form() {
        assert_eq!("single".parse::<LinkingStrategy>().unwrap(), LinkingStrategy::Single);
        assert_eq!(
            "K-Previous:3".parse::<LinkingStrategy>().unwrap(),
            LinkingStrategy::KPrevious { k: 3 }
        );
        assert_eq!(
            "temporally_min_gap:10m".parse::<LinkingStrategy>().unwrap(),
            LinkingStrategy::TemporallyMinGap {
                gap: 10 * TimeUnit::Minutes.micros()
            }
        );
        assert_eq!(
            "temporally_exponential:1.5,500ms".parse::<LinkingStrategy>().unwrap(),
            LinkingStrategy::TemporallyExponential {
                base: 1.5,
                unit: 500 * TimeUnit::Milliseconds.micros()
            }
        );
        assert!("k_previous".parse::<LinkingStrategy>().is_err());
        assert!("k_previous:0".parse::<LinkingStrategy>().is_err());
        assert!("temporally_max_gap:5y".parse::<LinkingStrategy>().is_err());
        assert!("fancy".parse::<LinkingStrategy>().is_err());
    }

    #[test]
    fn serde_uses_kind_tag() {
        let json = serde_json::to_string(&LinkingStrategy::KPrevious { k: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"k_previous","k":2}"#);

        #[derive(Deserialize)]
        struct Wrapper {
            strategy: LinkingStrategy,
        }
        let parsed: Wrapper = toml::from_str(
            r#"
            [strategy]
            kind = "temporally_exponential"
            base = 2.0
            unit = 1000000
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.strategy,
            LinkingStrategy::TemporallyExponential {
                base: 2.0,
                unit: 1_000_000
            }
        );
    }
}
