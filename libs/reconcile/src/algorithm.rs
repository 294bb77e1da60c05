//! The designation reconciliation procedure.
//!
//! One call brings a job's [`LocalDesignations`] back in line with the host
//! registry and then closes the gap between stock and target:
//!
//! 1. **Sync**: forget local entries the registry no longer has.
//! 2. **Adopt**: take over matching designations placed by someone else.
//! 3. **Prune**: cancel entries whose target no longer fits any pass.
//! 4. **Resolve**: per pass, issue designations on the best candidates while
//!    short, then withdraw the newest ones while over. A call ends at a
//!    fixed point: nothing left to issue and nothing safe to withdraw.
//!
//! Every registry mutation is applied immediately, so the registry is
//! consistent with the job's bookkeeping at every step.

use std::collections::{BTreeSet, HashSet};

use steward_id::DesignationKind;
use tracing::debug;

use crate::designations::LocalDesignations;
use crate::host::{Designation, DesignationRegistry, Position, Thing, WorldMap};

/// How candidates are ranked. Distances below one cell count as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Expected yield alone; ties keep host order.
    Yield,
    /// `yield / distance`.
    YieldPerDistance,
    /// `yield / distance²`, favouring nearby targets more strongly.
    YieldPerDistanceSquared,
}

impl Scoring {
    pub fn score(self, expected_yield: u32, distance: f64) -> f64 {
        let distance = distance.max(1.0);
        let expected_yield = f64::from(expected_yield);
        match self {
            Scoring::Yield => expected_yield,
            Scoring::YieldPerDistance => expected_yield / distance,
            Scoring::YieldPerDistanceSquared => expected_yield / (distance * distance),
        }
    }
}

type Predicate<'a> = Box<dyn Fn(&Thing) -> bool + 'a>;
type YieldFn<'a> = Box<dyn Fn(&Thing) -> u32 + 'a>;

/// One target the job maintains with one designation kind.
///
/// Simple jobs use a single pass; jobs with several sub-targets (livestock
/// buckets) use one pass per sub-target. A designation belongs to the first
/// pass whose kind matches and whose predicate accepts its target.
pub struct ReconcilePass<'a> {
    pub kind: DesignationKind,
    pub target: i64,
    pub current: i64,
    pub scoring: Scoring,
    eligible: Predicate<'a>,
    expected_yield: YieldFn<'a>,
}

impl<'a> ReconcilePass<'a> {
    /// A pass that accepts nothing until given a predicate and yields one
    /// unit per designation.
    pub fn new(kind: DesignationKind, target: i64, current: i64) -> Self {
        Self {
            kind,
            target,
            current,
            scoring: Scoring::YieldPerDistance,
            eligible: Box::new(|_: &Thing| false),
            expected_yield: Box::new(|_: &Thing| 1),
        }
    }

    pub fn eligible<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Thing) -> bool + 'a,
    {
        self.eligible = Box::new(predicate);
        self
    }

    pub fn yields<F>(mut self, expected_yield: F) -> Self
    where
        F: Fn(&Thing) -> u32 + 'a,
    {
        self.expected_yield = Box::new(expected_yield);
        self
    }

    pub fn scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn accepts(&self, thing: &Thing) -> bool {
        (self.eligible)(thing)
    }

    pub fn yield_of(&self, thing: &Thing) -> u32 {
        (self.expected_yield)(thing)
    }
}

impl std::fmt::Debug for ReconcilePass<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcilePass")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("current", &self.current)
            .field("scoring", &self.scoring)
            .finish_non_exhaustive()
    }
}

/// Where one pass stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassBalance {
    pub kind: DesignationKind,
    pub target: i64,
    pub current: i64,
    /// Yield promised by the pass's outstanding designations.
    pub pending: i64,
    /// At least one designation could be withdrawn without opening a deficit.
    pub retractable: bool,
}

impl PassBalance {
    /// Positive when short, negative when over.
    pub fn deficit(&self) -> i64 {
        self.target - (self.current + self.pending)
    }

    pub fn is_short(&self) -> bool {
        self.deficit() > 0
    }

    /// Nothing to issue and nothing to withdraw.
    pub fn is_balanced(&self) -> bool {
        !self.is_short() && !self.retractable
    }
}

/// What one reconciliation call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Forgotten because the registry no longer had them.
    pub released: Vec<Designation>,
    /// Taken over from the registry.
    pub adopted: Vec<Designation>,
    /// Cancelled because the target no longer fits the configuration.
    pub pruned: Vec<Designation>,
    /// Newly placed.
    pub issued: Vec<Designation>,
    /// Cancelled to reduce a surplus.
    pub withdrawn: Vec<Designation>,
    /// Per-pass standing after all changes, in pass order.
    pub balances: Vec<PassBalance>,
}

impl ReconcileOutcome {
    /// True if the registry was modified.
    pub fn mutated_registry(&self) -> bool {
        !(self.issued.is_empty() && self.withdrawn.is_empty() && self.pruned.is_empty())
    }

    /// True if neither the registry nor the local set changed.
    pub fn is_noop(&self) -> bool {
        !self.mutated_registry() && self.released.is_empty() && self.adopted.is_empty()
    }

    pub fn total_pending(&self) -> i64 {
        self.balances.iter().map(|b| b.pending).sum()
    }
}

/// Local designations grouped by the pass they count toward, oldest first.
struct Assignment {
    per_pass: Vec<Vec<(Designation, u32)>>,
    unmatched: Vec<Designation>,
}

fn matching_pass(passes: &[ReconcilePass<'_>], kind: DesignationKind, thing: &Thing) -> Option<usize> {
    passes
        .iter()
        .position(|pass| pass.kind == kind && pass.accepts(thing))
}

fn assign(local: &LocalDesignations, map: &dyn WorldMap, passes: &[ReconcilePass<'_>]) -> Assignment {
    let mut per_pass = vec![Vec::new(); passes.len()];
    let mut unmatched = Vec::new();

    for d in local.iter() {
        let slot = map.thing(d.target).and_then(|thing| {
            matching_pass(passes, d.kind, &thing).map(|index| (index, passes[index].yield_of(&thing)))
        });
        match slot {
            Some((index, expected)) => per_pass[index].push((*d, expected)),
            None => unmatched.push(*d),
        }
    }

    Assignment { per_pass, unmatched }
}

fn balance(pass: &ReconcilePass<'_>, assigned: &[(Designation, u32)]) -> PassBalance {
    let pending: i64 = assigned.iter().map(|(_, y)| i64::from(*y)).sum();
    let deficit = pass.target - (pass.current + pending);
    PassBalance {
        kind: pass.kind,
        target: pass.target,
        current: pass.current,
        pending,
        retractable: deficit < 0 && assigned.iter().any(|(_, y)| deficit + i64::from(*y) <= 0),
    }
}

/// Read-only standing of every pass, without touching the registry.
pub fn assess(local: &LocalDesignations, map: &dyn WorldMap, passes: &[ReconcilePass<'_>]) -> Vec<PassBalance> {
    let assignment = assign(local, map, passes);
    passes
        .iter()
        .zip(&assignment.per_pass)
        .map(|(pass, assigned)| balance(pass, assigned))
        .collect()
}

/// A scored candidate.
struct Ranked {
    thing: Thing,
    score: f64,
}

/// Eligible, undesignated candidates for a pass, best first.
///
/// The sort is stable, so equal scores keep the host's order.
fn rank_candidates(
    pass: &ReconcilePass<'_>,
    map: &dyn WorldMap,
    registry: &dyn DesignationRegistry,
    base: Position,
) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = map
        .candidates(pass.kind)
        .into_iter()
        .filter(|thing| pass.accepts(thing) && registry.designation_on(thing.id).is_none())
        .filter_map(|thing| {
            let expected = pass.yield_of(&thing);
            (expected > 0).then(|| Ranked {
                score: pass.scoring.score(expected, thing.position.distance(base)),
                thing,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Run one reconciliation pass set for a job.
///
/// `siblings` holds designations owned by other jobs; they are never adopted.
pub fn reconcile(
    local: &mut LocalDesignations,
    registry: &mut dyn DesignationRegistry,
    map: &dyn WorldMap,
    siblings: &HashSet<Designation>,
    passes: &[ReconcilePass<'_>],
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    // Kinds the passes use plus kinds still held locally, so entries of a
    // kind the configuration dropped survive sync and get pruned below.
    let kinds: BTreeSet<DesignationKind> = passes
        .iter()
        .map(|p| p.kind)
        .chain(local.iter().map(|d| d.kind))
        .collect();

    let mut global_in_order: Vec<Designation> = Vec::new();
    for kind in &kinds {
        global_in_order.extend(registry.by_kind(*kind));
    }
    let global: HashSet<Designation> = global_in_order.iter().copied().collect();

    // Sync.
    outcome.released = local.retain_in(&global);

    // Prune.
    let mut assignment = assign(local, map, passes);
    for d in assignment.unmatched.drain(..) {
        registry.delete(&d);
        local.remove(&d);
        outcome.pruned.push(d);
    }

    // Adopt.
    for d in global_in_order {
        if local.contains(&d) || siblings.contains(&d) {
            continue;
        }
        let Some(thing) = map.thing(d.target) else {
            continue;
        };
        if let Some(index) = matching_pass(passes, d.kind, &thing) {
            local.push(d);
            assignment.per_pass[index].push((d, passes[index].yield_of(&thing)));
            outcome.adopted.push(d);
        }
    }

    // Resolve.
    let base = map.base_position();
    for (index, pass) in passes.iter().enumerate() {
        let assigned = &mut assignment.per_pass[index];
        let mut deficit = balance(pass, assigned).deficit();

        if deficit > 0 {
            for candidate in rank_candidates(pass, map, registry, base) {
                if deficit <= 0 {
                    break;
                }
                // Re-check against the live world: an earlier pass may have
                // designated it, or it may have left.
                let Some(thing) = map.thing(candidate.thing.id) else {
                    continue;
                };
                if !pass.accepts(&thing) || registry.designation_on(thing.id).is_some() {
                    continue;
                }
                let expected = pass.yield_of(&thing);
                if expected == 0 {
                    continue;
                }
                let Some(d) = registry.add_designation(thing.id, pass.kind) else {
                    continue;
                };
                local.push(d);
                assigned.push((d, expected));
                outcome.issued.push(d);
                deficit -= i64::from(expected);
            }
        }

        // Also runs after issuing: the last candidate can overshoot far
        // enough that an earlier designation is no longer needed.
        if deficit < 0 {
            let mut i = assigned.len();
            while deficit < 0 && i > 0 {
                i -= 1;
                let (d, expected) = assigned[i];
                if deficit + i64::from(expected) > 0 {
                    continue;
                }
                registry.delete(&d);
                local.remove(&d);
                assigned.remove(i);
                // Issued and withdrawn in one call nets out to nothing.
                match outcome.issued.iter().position(|issued| *issued == d) {
                    Some(at) => {
                        outcome.issued.remove(at);
                    }
                    None => outcome.withdrawn.push(d),
                }
                deficit += i64::from(expected);
            }
        }

        let standing = balance(pass, assigned);
        debug!(
            kind = %pass.kind,
            target = standing.target,
            current = standing.current,
            pending = standing.pending,
            deficit = standing.deficit(),
            "Pass resolved"
        );
        outcome.balances.push(standing);
    }

    outcome
}
