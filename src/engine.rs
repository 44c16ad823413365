//! Rule dispatch and round sequencing.
//!
//! This module is the public entry point of the engine.  It wires the
//! pieces together in a fixed order: reconcile the round's profile
//! against the electorate of the weight state, validate that the state
//! has the shape the rule owns, then hand off to the rule's algorithm.
//! Sequencing a whole experiment is a strict left fold over the
//! profiles; rounds are causally ordered because each one observes the
//! exact state its predecessor left behind, so nothing here may
//! reorder, parallelize or skip rounds.

use crate::dictatorship;
use crate::error::RuleError;
use crate::missing::{self, MissingVoterPolicy};
use crate::phragmen;
use crate::profile::{ApprovalProfile, Candidate, Voter};
use crate::quota;
use crate::rules::RuleId;
use crate::scoring;
use crate::weights::{Weight, WeightState};
use rand::Rng;
use std::collections::BTreeMap;

/// Creates the freshly shaped weight state `rule` expects for the
/// given electorate.  See [`WeightState::init`].
pub fn init_weights(rule: RuleId, voters: &[Voter]) -> WeightState {
    WeightState::init(rule, voters)
}

/// Checks that every profile voter is tracked by the state, so the
/// algorithms may index the weight maps without further checks.
fn ensure_electorate(
    profile: &ApprovalProfile,
    tracked: &BTreeMap<Voter, Weight>,
) -> Result<(), RuleError> {
    for &v in profile.voters() {
        if !tracked.contains_key(&v) {
            return Err(RuleError::StateShapeMismatch(format!(
                "voter {v} is not tracked by the weight state"
            )));
        }
    }
    Ok(())
}

/// Computes one round of `rule` on `profile`, mutating `state` in
/// place and returning the winning candidate.
///
/// The missing-voter `policy` is applied first and never touches the
/// state.  The random source is consulted only by the randomized
/// dictatorships; every other rule is a deterministic function of the
/// profile and the state.  On failure the state is left exactly as it
/// was.
///
/// # Examples
///
/// ```
/// use perpetual_voting::{compute_rule, init_weights, ApprovalProfile, MissingVoterPolicy, RuleId};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use std::collections::BTreeMap;
///
/// let approvals = BTreeMap::from([
///     (1, vec![1]), (2, vec![1]), (3, vec![1]),
///     (4, vec![2]), (5, vec![2]), (6, vec![3]),
/// ]);
/// let profile = ApprovalProfile::new((1..=6).collect(), vec![1, 2, 3], approvals).unwrap();
/// let mut state = init_weights(RuleId::PerUnitcost, profile.voters());
/// let mut rng = StdRng::seed_from_u64(0);
///
/// let mut winners = Vec::new();
/// for _ in 0..6 {
///     winners.push(
///         compute_rule(RuleId::PerUnitcost, &profile, &mut state,
///                      MissingVoterPolicy::Strict, &mut rng).unwrap(),
///     );
/// }
/// assert_eq!(winners, vec![1, 2, 1, 1, 2, 1]);
/// ```
pub fn compute_rule<R: Rng + ?Sized>(
    rule: RuleId,
    profile: &ApprovalProfile,
    state: &mut WeightState,
    policy: MissingVoterPolicy,
    rng: &mut R,
) -> Result<Candidate, RuleError> {
    let reconciled = missing::reconcile(profile, state, policy)?;
    let profile = reconciled.as_ref();

    match rule {
        RuleId::Av => scoring::approval_voting(profile),
        RuleId::RandomDictatorship => dictatorship::random_dictatorship(profile, rng),
        RuleId::SerialDictatorship => dictatorship::serial_dictatorship(profile, rng),
        RuleId::PerQuota | RuleId::PerQuotaMin | RuleId::PerQuotaNew => {
            let (quota, satisfaction) = state.paired_mut(rule)?;
            ensure_electorate(profile, quota)?;
            quota::quota_family(rule, profile, quota, satisfaction)
        }
        _ => {
            let weights = state.scalar_mut(rule)?;
            ensure_electorate(profile, weights)?;
            match rule {
                RuleId::PerPav | RuleId::PerJan => {
                    scoring::score_accumulation(rule, profile, weights)
                }
                RuleId::PerUnitcost
                | RuleId::PerReset
                | RuleId::PerConsensus
                | RuleId::PerMajority
                | RuleId::Per2ndPrize => scoring::subtractive(rule, profile, weights),
                RuleId::PerNash => scoring::nash(profile, weights),
                RuleId::PerEquality => scoring::equality(profile, weights),
                RuleId::PerPhragmen => phragmen::phragmen(profile, weights),
                RuleId::PerMinmaxDryspell => scoring::minmax_dryspell(profile, weights),
                RuleId::RotatingDictatorship => {
                    dictatorship::rotating_dictatorship(profile, weights)
                }
                RuleId::RotatingSerialDictatorship => {
                    dictatorship::rotating_serial_dictatorship(profile, weights)
                }
                RuleId::WeightedRandomDictatorship => {
                    dictatorship::weighted_random_dictatorship(profile, weights, rng)
                }
                RuleId::Av
                | RuleId::RandomDictatorship
                | RuleId::SerialDictatorship
                | RuleId::PerQuota
                | RuleId::PerQuotaMin
                | RuleId::PerQuotaNew => unreachable!("dispatched above"),
            }
        }
    }
}

/// Folds [`compute_rule`] over an ordered profile sequence, returning
/// the ordered winner sequence.  This is the only place where round
/// ordering is enforced; a failing round aborts the fold with the
/// state of all completed rounds intact.
pub fn compute_rule_sequence<R: Rng + ?Sized>(
    rule: RuleId,
    profiles: &[ApprovalProfile],
    state: &mut WeightState,
    policy: MissingVoterPolicy,
    rng: &mut R,
) -> Result<Vec<Candidate>, RuleError> {
    let mut winners = Vec::with_capacity(profiles.len());
    for profile in profiles {
        winners.push(compute_rule(rule, profile, state, policy, rng)?);
    }
    Ok(winners)
}
