//! Dictatorship rules, rotating and randomized.
//!
//! The rotating variants are fully deterministic: a binary eligibility
//! flag per voter rotates the dictatorship through the electorate in
//! ascending identifier order, resetting once everyone with a nonempty
//! ballot has had a turn.  The randomized variants draw the dictator
//! from an explicitly passed random source, so nothing else in the
//! engine depends on seeding order.  Voters with empty approval sets
//! never become dictators.

use crate::error::RuleError;
use crate::profile::{ApprovalProfile, Candidate, Voter};
use crate::weights::{whole, Weight};
use num_traits::{One, Signed, ToPrimitive};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Voters able to dictate this round: nonempty ballot, in ballot order.
fn candidates_for_dictator(profile: &ApprovalProfile) -> Vec<Voter> {
    profile
        .voters()
        .iter()
        .copied()
        .filter(|&v| !profile.approvals(v).is_empty())
        .collect()
}

/// Selects the next rotating dictator: the smallest eligible voter
/// identifier, resetting the eligibility flags when no one is left.
/// The dictator's flag is cleared before returning.
fn rotate_dictator(
    profile: &ApprovalProfile,
    weights: &mut BTreeMap<Voter, Weight>,
) -> Result<Voter, RuleError> {
    let pool = candidates_for_dictator(profile);
    if pool.is_empty() {
        return Err(RuleError::DegenerateInput(
            "every approval set is empty",
        ));
    }
    let eligible = |weights: &BTreeMap<Voter, Weight>| {
        pool.iter()
            .copied()
            .filter(|v| weights[v].is_one())
            .min()
    };
    let dictator = match eligible(weights) {
        Some(v) => v,
        None => {
            for &v in &pool {
                if let Some(w) = weights.get_mut(&v) {
                    *w = whole(1);
                }
            }
            eligible(weights).ok_or(RuleError::DegenerateInput(
                "every approval set is empty",
            ))?
        }
    };
    if let Some(w) = weights.get_mut(&dictator) {
        *w = whole(0);
    }
    Ok(dictator)
}

/// Rotating dictatorship: the eligible voter with the smallest
/// identifier dictates their first declared approval.
pub(crate) fn rotating_dictatorship(
    profile: &ApprovalProfile,
    weights: &mut BTreeMap<Voter, Weight>,
) -> Result<Candidate, RuleError> {
    let dictator = rotate_dictator(profile, weights)?;
    Ok(profile.approvals(dictator)[0])
}

/// Rotating serial dictatorship: starting at the dictator and walking
/// the electorate in ascending identifier order with wrap-around, the
/// candidate set shrinks to each voter's approvals whenever the
/// intersection stays nonempty; the smallest remaining candidate
/// identifier wins.
pub(crate) fn rotating_serial_dictatorship(
    profile: &ApprovalProfile,
    weights: &mut BTreeMap<Voter, Weight>,
) -> Result<Candidate, RuleError> {
    let dictator = rotate_dictator(profile, weights)?;
    let mut order: Vec<Voter> = profile.voters().to_vec();
    order.sort_unstable();
    let start = order.iter().position(|&v| v == dictator).unwrap_or(0);
    order.rotate_left(start);

    let mut remaining: Vec<Candidate> = profile.cands().to_vec();
    for &v in &order {
        let intersection: Vec<Candidate> = remaining
            .iter()
            .copied()
            .filter(|&c| profile.approves(v, c))
            .collect();
        if !intersection.is_empty() {
            remaining = intersection;
        }
    }
    remaining
        .iter()
        .copied()
        .min()
        .ok_or(RuleError::DegenerateInput("profile has no candidates"))
}

/// Uniformly random dictatorship: a voter with a nonempty ballot is
/// drawn uniformly and one of their approvals is drawn uniformly.
/// Stateless.
pub(crate) fn random_dictatorship<R: Rng + ?Sized>(
    profile: &ApprovalProfile,
    rng: &mut R,
) -> Result<Candidate, RuleError> {
    let pool = candidates_for_dictator(profile);
    let dictator = *pool
        .choose(rng)
        .ok_or(RuleError::DegenerateInput("every approval set is empty"))?;
    let approvals = profile.approvals(dictator);
    Ok(approvals[rng.gen_range(0..approvals.len())])
}

/// Random serial dictatorship: the electorate is shuffled, approval
/// sets are intersected in shuffled order (skipping any voter whose
/// ballot would empty the set), and the winner is drawn uniformly from
/// what remains.  Stateless.
pub(crate) fn serial_dictatorship<R: Rng + ?Sized>(
    profile: &ApprovalProfile,
    rng: &mut R,
) -> Result<Candidate, RuleError> {
    let mut order: Vec<Voter> = profile.voters().to_vec();
    order.shuffle(rng);
    let mut remaining: Vec<Candidate> = profile.cands().to_vec();
    for &v in &order {
        let intersection: Vec<Candidate> = remaining
            .iter()
            .copied()
            .filter(|&c| profile.approves(v, c))
            .collect();
        if !intersection.is_empty() {
            remaining = intersection;
        }
    }
    remaining
        .choose(rng)
        .copied()
        .ok_or(RuleError::DegenerateInput("profile has no candidates"))
}

/// Weighted random dictatorship: the dictator is drawn proportionally
/// to the voters' weights (normalized in floating point, by design),
/// one of their approvals is drawn uniformly, and the winner's
/// supporters are reweighted `x -> x/(x+1)`.
pub(crate) fn weighted_random_dictatorship<R: Rng + ?Sized>(
    profile: &ApprovalProfile,
    weights: &mut BTreeMap<Voter, Weight>,
    rng: &mut R,
) -> Result<Candidate, RuleError> {
    let pool = candidates_for_dictator(profile);
    if pool.is_empty() {
        return Err(RuleError::DegenerateInput("every approval set is empty"));
    }
    let masses: Vec<f64> = pool
        .iter()
        .map(|v| weights[v].to_f64().unwrap_or(0.0).max(0.0))
        .collect();
    let total: f64 = masses.iter().sum();
    if total <= 0.0 {
        return Err(RuleError::DegenerateInput("total weight is zero"));
    }
    let mut draw = rng.gen::<f64>() * total;
    let mut dictator = pool[pool.len() - 1];
    for (&v, mass) in pool.iter().zip(&masses) {
        if draw < *mass {
            dictator = v;
            break;
        }
        draw -= mass;
    }
    let approvals = profile.approvals(dictator);
    let winner = approvals[rng.gen_range(0..approvals.len())];
    for &v in profile.voters() {
        if profile.approves(v, winner) {
            if let Some(w) = weights.get_mut(&v) {
                if w.is_positive() {
                    *w = &*w / (&*w + whole(1));
                }
            }
        }
    }
    Ok(winner)
}
