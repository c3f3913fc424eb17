//! The generic three-phase decision pipeline.
//!
//! Many independent decisions share one external, high-latency decision
//! service. The pipeline keeps store access strictly sequential while the
//! service calls fan out in parallel:
//!
//! 1. **Gather** (sequential, read-only): collect per-candidate context; a
//!    gather failure drops that candidate only.
//! 2. **Decide** (parallel, no store access): one future per survivor via
//!    `join_all`; a failed call is "no decision" for that candidate.
//! 3. **Apply** (sequential, writes, original candidate order): a failed
//!    apply is logged and processing continues.
//!
//! Cognition, interaction, and culture all reuse this shape unmodified.

use std::collections::BTreeSet;
use std::future::Future;

use futures::future::join_all;
use rand::rngs::StdRng;
use tracing::{debug, warn};

/// Per-phase counts from one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineReport {
    /// Candidates handed to the pipeline (after any sampling).
    pub candidates: usize,
    /// Candidates whose context gather succeeded.
    pub gathered: usize,
    /// Candidates for which the service produced a decision.
    pub decided: usize,
    /// Decisions applied without error.
    pub applied: usize,
}

/// Randomly sample `candidates` down to at most `batch_size`, preserving
/// the original relative order.
pub fn sample_batch<C>(candidates: Vec<C>, batch_size: usize, rng: &mut StdRng) -> Vec<C> {
    if candidates.len() <= batch_size || batch_size == 0 {
        return candidates;
    }
    let keep: BTreeSet<usize> = rand::seq::index::sample(rng, candidates.len(), batch_size)
        .into_iter()
        .collect();
    candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, c)| c)
        .collect()
}

/// Run the three phases over a bounded candidate set.
///
/// `state` is the only route to the store: `gather` reads it, `apply`
/// mutates it, and `decide` cannot touch it at all -- the signature
/// enforces the no-store-access window structurally.
pub async fn run<S, C, Ctx, D, E, G, DF, Fut, A>(
    phase: &'static str,
    state: &mut S,
    candidates: Vec<C>,
    mut gather: G,
    decide: DF,
    mut apply: A,
) -> PipelineReport
where
    G: FnMut(&S, &C) -> Result<Ctx, E>,
    DF: Fn(Ctx) -> Fut,
    Fut: Future<Output = Option<D>>,
    A: FnMut(&mut S, &C, D) -> Result<(), E>,
    E: core::fmt::Display,
{
    let mut report = PipelineReport {
        candidates: candidates.len(),
        ..PipelineReport::default()
    };

    // Phase 1: sequential reads.
    let mut survivors: Vec<(C, Ctx)> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match gather(state, &candidate) {
            Ok(ctx) => survivors.push((candidate, ctx)),
            Err(e) => {
                debug!(phase, error = %e, "context gather failed, dropping candidate");
            }
        }
    }
    report.gathered = survivors.len();

    // Phase 2: parallel fan-out, fan-in. No store access here.
    let (kept, contexts): (Vec<C>, Vec<Ctx>) = survivors.into_iter().unzip();
    let decisions = join_all(contexts.into_iter().map(|ctx| decide(ctx))).await;

    // Phase 3: sequential writes in original candidate order.
    for (candidate, decision) in kept.iter().zip(decisions) {
        let Some(decision) = decision else {
            continue;
        };
        report.decided += 1;
        match apply(state, candidate, decision) {
            Ok(()) => report.applied += 1,
            Err(e) => warn!(phase, error = %e, "apply failed, continuing"),
        }
    }

    debug!(
        phase,
        candidates = report.candidates,
        gathered = report.gathered,
        decided = report.decided,
        applied = report.applied,
        "pipeline run complete"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[tokio::test]
    async fn one_gather_failure_drops_only_that_candidate() {
        let mut store: Vec<u32> = Vec::new();
        let report = run(
            "test",
            &mut store,
            vec![1u32, 2, 3, 4, 5],
            |_, c| {
                if *c == 3 {
                    Err("unreadable")
                } else {
                    Ok(*c * 10)
                }
            },
            |ctx| async move { Some(ctx + 1) },
            |store, _, decision| {
                store.push(decision);
                Ok(())
            },
        )
        .await;

        assert_eq!(report.candidates, 5);
        assert_eq!(report.gathered, 4);
        assert_eq!(report.decided, 4);
        assert_eq!(report.applied, 4);
        // Original candidate order is preserved through apply.
        assert_eq!(store, vec![11, 21, 41, 51]);
    }

    #[tokio::test]
    async fn no_decision_skips_apply_without_failing_the_batch() {
        let mut store: Vec<u32> = Vec::new();
        let report = run(
            "test",
            &mut store,
            vec![1u32, 2, 3],
            |_, c| Ok::<u32, &str>(*c),
            |ctx| async move { if ctx == 2 { None } else { Some(ctx) } },
            |store, _, decision| {
                store.push(decision);
                Ok(())
            },
        )
        .await;

        assert_eq!(report.gathered, 3);
        assert_eq!(report.decided, 2);
        assert_eq!(report.applied, 2);
        assert_eq!(store, vec![1, 3]);
    }

    #[tokio::test]
    async fn apply_failure_is_isolated() {
        let mut store: Vec<u32> = Vec::new();
        let report = run(
            "test",
            &mut store,
            vec![1u32, 2, 3],
            |_, c| Ok::<u32, &str>(*c),
            |ctx| async move { Some(ctx) },
            |store, _, decision| {
                if decision == 2 {
                    return Err("write failed");
                }
                store.push(decision);
                Ok(())
            },
        )
        .await;

        assert_eq!(report.decided, 3);
        assert_eq!(report.applied, 2);
        assert_eq!(store, vec![1, 3]);
    }

    #[test]
    fn sample_batch_bounds_and_preserves_order() {
        let mut rng = StdRng::seed_from_u64(9);
        let sampled = sample_batch((0..100).collect(), 10, &mut rng);
        assert_eq!(sampled.len(), 10);
        let mut sorted = sampled.clone();
        sorted.sort_unstable();
        assert_eq!(sampled, sorted);

        // Under the cap, the batch passes through untouched.
        let small = sample_batch(vec![1, 2, 3], 10, &mut rng);
        assert_eq!(small, vec![1, 2, 3]);
    }
}
