//! Load-balancing rule in the style of Phragmen.
//!
//! Each candidate is assigned the minimal consistent average load its
//! supporters would carry if it won: starting from all approvers, the
//! load `(1 + sum of supporter weights) / |supporters|` is recomputed
//! on the approvers at or below the current load until it no longer
//! undercuts the heaviest supporter.  Candidates with no supporters get
//! an infinite load, the sanctioned sentinel of this family.  The
//! candidate with the globally minimal load wins, and its supporters
//! below that load are raised to it.

use crate::error::RuleError;
use crate::profile::{ApprovalProfile, Candidate, Voter};
use crate::weights::{whole, Weight};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A candidate's supporter load: finite and exact, or infinite for a
/// candidate nobody supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Load {
    /// Consistent average load of the supporter set.
    Finite(Weight),
    /// No supporters at all.
    Infinite,
}

impl PartialOrd for Load {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Load {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Load::Finite(a), Load::Finite(b)) => a.cmp(b),
            (Load::Finite(_), Load::Infinite) => Ordering::Less,
            (Load::Infinite, Load::Finite(_)) => Ordering::Greater,
            (Load::Infinite, Load::Infinite) => Ordering::Equal,
        }
    }
}

/// Computes the consistent load of `cand` given the current weights.
///
/// Invariant (checked by the engine): every profile voter is present
/// in `weights`.
fn candidate_load(
    profile: &ApprovalProfile,
    cand: Candidate,
    weights: &BTreeMap<Voter, Weight>,
) -> Load {
    let mut supporters = profile.supporters(cand);
    if supporters.is_empty() {
        return Load::Infinite;
    }
    loop {
        let total: Weight = supporters.iter().map(|v| weights[v].clone()).sum();
        let load = (whole(1) + total) / BigRational::from_integer(BigInt::from(supporters.len()));
        // The load exceeds the lightest supporter's weight, so the
        // restricted set below is never empty.
        let heaviest = supporters
            .iter()
            .map(|v| weights[v].clone())
            .max()
            .unwrap_or_else(|| whole(0));
        if load >= heaviest {
            return Load::Finite(load);
        }
        supporters = profile
            .voters()
            .iter()
            .copied()
            .filter(|&v| profile.approves(v, cand) && weights[&v] <= load)
            .collect();
    }
}

/// The load-balancing rule: minimal load wins, first candidate in
/// declared order on ties (an all-infinite round keeps the weights
/// untouched).
pub(crate) fn phragmen(
    profile: &ApprovalProfile,
    weights: &mut BTreeMap<Voter, Weight>,
) -> Result<Candidate, RuleError> {
    let loads: Vec<Load> = profile
        .cands()
        .iter()
        .map(|&c| candidate_load(profile, c, weights))
        .collect();
    let mut best: Option<(usize, &Load)> = None;
    for (idx, load) in loads.iter().enumerate() {
        let replace = match best {
            None => true,
            Some((_, top)) => load < top,
        };
        if replace {
            best = Some((idx, load));
        }
    }
    let (winner_idx, _) =
        best.ok_or(RuleError::DegenerateInput("profile has no candidates"))?;
    let winner = profile.cands()[winner_idx];

    if let Load::Finite(load) = &loads[winner_idx] {
        for &v in profile.voters() {
            if profile.approves(v, winner) && &weights[&v] < load {
                if let Some(w) = weights.get_mut(&v) {
                    *w = load.clone();
                }
            }
        }
    }
    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleId;
    use crate::weights::{frac, WeightState};
    use std::collections::BTreeMap as Map;

    fn profile(voters: &[u64], cands: &[u64], sets: &[(u64, &[u64])]) -> ApprovalProfile {
        let approval_sets: Map<u64, Vec<u64>> =
            sets.iter().map(|(v, a)| (*v, a.to_vec())).collect();
        ApprovalProfile::new(voters.to_vec(), cands.to_vec(), approval_sets).unwrap()
    }

    fn init_weights(voters: &[u64]) -> Map<Voter, Weight> {
        match WeightState::init(RuleId::PerPhragmen, voters) {
            WeightState::Scalar(map) => map,
            WeightState::Paired { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_load_ordering_places_infinite_last() {
        assert!(Load::Finite(whole(100)) < Load::Infinite);
        assert_eq!(Load::Infinite, Load::Infinite);
        assert!(Load::Finite(frac(1, 2)) < Load::Finite(whole(1)));
    }

    #[test]
    fn test_unsupported_candidate_gets_infinite_load() {
        let round = profile(&[1], &[1, 2], &[(1, &[1])]);
        let weights = init_weights(round.voters());
        assert_eq!(candidate_load(&round, 2, &weights), Load::Infinite);
        assert_eq!(
            candidate_load(&round, 1, &weights),
            Load::Finite(whole(1))
        );
    }

    #[test]
    fn test_six_round_scenario() {
        let round = profile(&[1, 2, 3], &[1, 2, 3, 4], &[(1, &[3]), (2, &[3]), (3, &[2])]);
        let mut weights = init_weights(round.voters());
        let mut winners = Vec::new();
        for _ in 0..6 {
            winners.push(phragmen(&round, &mut weights).unwrap());
        }
        assert_eq!(winners, vec![3, 2, 3, 3, 2, 3]);
    }

    #[test]
    fn test_supporters_are_raised_to_the_winning_load() {
        let round = profile(&[1, 2, 3], &[1, 2], &[(1, &[1]), (2, &[1]), (3, &[2])]);
        let mut weights = init_weights(round.voters());
        assert_eq!(phragmen(&round, &mut weights).unwrap(), 1);
        assert_eq!(weights[&1], frac(1, 2));
        assert_eq!(weights[&2], frac(1, 2));
        assert_eq!(weights[&3], whole(0));
    }

    #[test]
    fn test_restriction_drops_overloaded_supporters() {
        // Voter 3 already carries weight 2; candidate 1's load settles
        // on its two light supporters alone.
        let round = profile(&[1, 2, 3], &[1], &[(1, &[1]), (2, &[1]), (3, &[1])]);
        let mut weights = init_weights(round.voters());
        weights.insert(3, whole(2));
        assert_eq!(
            candidate_load(&round, 1, &weights),
            Load::Finite(frac(1, 2))
        );
    }
}
