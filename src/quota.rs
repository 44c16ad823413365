//! The quota family of perpetual rules.
//!
//! Quota rules track two accumulators per voter: a quota, the
//! entitlement a voter accumulates each round in proportion to how
//! popular their ballot was, and a satisfaction count of the rounds in
//! which the voter approved the winner.  A candidate's score sums its
//! approvers' outstanding entitlement (`quota - satisfaction`), so
//! voters who have been underserved pull the outcome toward their
//! ballots.  The `per_quota_min` variant clips each voter's
//! contribution at one round's worth; `per_quota_new` floors every
//! contribution at a small positivity epsilon and accumulates quota
//! only after scoring.

use crate::error::RuleError;
use crate::profile::{ApprovalProfile, Candidate, Voter};
use crate::rules::RuleId;
use crate::scoring::first_at_max;
use crate::weights::{whole, Weight};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::collections::BTreeMap;

/// Per-round support of each voter: the maximal approver count among
/// the voter's approved candidates, 0 for an empty approval set.
fn round_supports(profile: &ApprovalProfile) -> BTreeMap<Voter, i64> {
    profile
        .voters()
        .iter()
        .map(|&v| {
            let best = profile
                .approvals(v)
                .iter()
                .map(|&c| profile.support(c) as i64)
                .max()
                .unwrap_or(0);
            (v, best)
        })
        .collect()
}

/// Positivity epsilon of `per_quota_new`: half the minimum nonzero
/// fractional-part difference between any two voters' quotas, scaled
/// down by the voter count; `1 / (2n^2)` when every fractional part
/// coincides.  Quota terms are multiples of `1/n`, so the result never
/// disturbs a genuine score gap.
fn positivity_epsilon(
    profile: &ApprovalProfile,
    quota: &BTreeMap<Voter, Weight>,
    num_voters: i64,
) -> Weight {
    let fracs: Vec<Weight> = profile
        .voters()
        .iter()
        .map(|v| &quota[v] - quota[v].floor())
        .collect();
    let mut min_gap: Option<Weight> = None;
    for (i, a) in fracs.iter().enumerate() {
        for b in fracs.iter().skip(i + 1) {
            let gap = if a >= b { a - b } else { b - a };
            if gap == whole(0) {
                continue;
            }
            let smaller = match &min_gap {
                None => true,
                Some(current) => &gap < current,
            };
            if smaller {
                min_gap = Some(gap);
            }
        }
    }
    match min_gap {
        Some(gap) => gap / BigRational::from_integer(BigInt::from(2 * num_voters)),
        None => BigRational::new(BigInt::from(1), BigInt::from(2 * num_voters * num_voters)),
    }
}

/// Picks the winner among `scores`, optionally breaking first-place
/// ties by descending approver count (stable, so remaining ties fall
/// back to declared candidate order).
fn pick_winner(
    profile: &ApprovalProfile,
    scores: &[Weight],
    support_tie_break: bool,
) -> Result<Candidate, RuleError> {
    let first = first_at_max(scores)?;
    if !support_tie_break {
        return Ok(profile.cands()[first]);
    }
    let top = &scores[first];
    let mut winner = profile.cands()[first];
    let mut best_support = profile.support(winner);
    for (idx, &cand) in profile.cands().iter().enumerate() {
        if &scores[idx] == top {
            let support = profile.support(cand);
            if support > best_support {
                winner = cand;
                best_support = support;
            }
        }
    }
    Ok(winner)
}

/// Computes one round of a quota-family rule, mutating the paired
/// accumulators in place.
///
/// Invariant (checked by the engine): every profile voter is present
/// in both maps.
pub(crate) fn quota_family(
    rule: RuleId,
    profile: &ApprovalProfile,
    quota: &mut BTreeMap<Voter, Weight>,
    satisfaction: &mut BTreeMap<Voter, Weight>,
) -> Result<Candidate, RuleError> {
    let num_voters = profile.voters().len() as i64;
    if num_voters == 0 {
        return Err(RuleError::DegenerateInput("profile has no voters"));
    }
    if profile.cands().is_empty() {
        return Err(RuleError::DegenerateInput("profile has no candidates"));
    }
    let supports = round_supports(profile);

    // per_quota and per_quota_min accumulate entitlement before
    // scoring; per_quota_new scores on the previous round's quotas.
    if rule != RuleId::PerQuotaNew {
        for &v in profile.voters() {
            if let Some(q) = quota.get_mut(&v) {
                *q += BigRational::new(BigInt::from(supports[&v]), BigInt::from(num_voters));
            }
        }
    }

    let floor = match rule {
        RuleId::PerQuotaNew => positivity_epsilon(profile, quota, num_voters),
        _ => whole(0),
    };
    let scores: Vec<Weight> = profile
        .cands()
        .iter()
        .map(|&c| {
            let mut score = whole(0);
            for &v in profile.voters() {
                if !profile.approves(v, c) {
                    continue;
                }
                let mut term = &quota[&v] - &satisfaction[&v];
                if term < floor {
                    term = floor.clone();
                }
                if rule == RuleId::PerQuotaMin && term > whole(1) {
                    term = whole(1);
                }
                score += term;
            }
            score
        })
        .collect();
    let winner = pick_winner(profile, &scores, rule == RuleId::PerQuotaNew)?;

    for &v in profile.voters() {
        if profile.approves(v, winner) {
            if let Some(s) = satisfaction.get_mut(&v) {
                *s += whole(1);
            }
        }
    }
    if rule == RuleId::PerQuotaNew {
        for &v in profile.voters() {
            if let Some(q) = quota.get_mut(&v) {
                *q += BigRational::new(BigInt::from(supports[&v]), BigInt::from(num_voters));
            }
        }
    }
    Ok(winner)
}
