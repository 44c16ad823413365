//! Registry of perpetual voting rule identifiers.
//!
//! This module defines the closed set of rules the engine can compute.
//! Dispatch over rules is an exhaustive match on [`RuleId`], so an
//! unknown rule can only arise while parsing an identifier string, never
//! at computation time.  Reporting collaborators consume the registry
//! ([`RuleId::ALL`]) and the short display names; neither has any effect
//! on rule behavior.

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a perpetual voting rule.
///
/// Each variant selects one algorithm together with the weight-state
/// shape it owns.  Identifier strings follow the names used in the
/// perpetual voting literature (`per_pav`, `per_phragmen`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Plain approval voting; stateless.
    #[serde(rename = "av")]
    Av,
    /// Perpetual PAV: supporters of the winner are reweighted `x -> x/(x+1)`.
    #[serde(rename = "per_pav")]
    PerPav,
    /// Score-accumulation variant combining the PAV winner reweighting
    /// with unit-cost compensation of the losers.
    #[serde(rename = "per_jan")]
    PerJan,
    /// Perpetual unit-cost: winning costs one unit of weight.
    #[serde(rename = "per_unitcost")]
    PerUnitcost,
    /// Perpetual reset: supporters of the winner restart at weight 1.
    #[serde(rename = "per_reset")]
    PerReset,
    /// Subtractive rule charging the winner's supporters `n / support`.
    #[serde(rename = "per_consensus")]
    PerConsensus,
    /// Subtractive rule charging the winner's supporters `n / (2 * support)`.
    #[serde(rename = "per_majority")]
    PerMajority,
    /// Subtractive rule scaling the winner's supporters by the gap to the
    /// runner-up score.
    #[serde(rename = "per_2nd_prize")]
    Per2ndPrize,
    /// Multiplicative (Nash) welfare rule.
    #[serde(rename = "per_nash")]
    PerNash,
    /// Bounded-equality rule: approvals are counted under an increasing
    /// weight bound until the winner is unique.
    #[serde(rename = "per_equality")]
    PerEquality,
    /// Phragmen-style load balancing: the candidate with the minimal
    /// consistent supporter load wins.
    #[serde(rename = "per_phragmen")]
    PerPhragmen,
    /// Quota compliance rule (accumulated entitlement minus satisfaction).
    #[serde(rename = "per_quota")]
    PerQuota,
    /// Quota variant clipping each voter's contribution at 1.
    #[serde(rename = "per_quota_min")]
    PerQuotaMin,
    /// Quota variant with strictly positive score terms and post-round
    /// quota accumulation.
    #[serde(rename = "per_quota_new")]
    PerQuotaNew,
    /// Minimax dry-spell rule: only the longest-unsatisfied voters count.
    #[serde(rename = "per_minmax_dryspell")]
    PerMinmaxDryspell,
    /// Deterministic rotating dictatorship over eligible voters.
    #[serde(rename = "rotating_dictatorship")]
    RotatingDictatorship,
    /// Rotating dictatorship refined by intersecting approval sets in
    /// voter order starting at the dictator.
    #[serde(rename = "rotating_serial_dictatorship")]
    RotatingSerialDictatorship,
    /// Uniformly random dictatorship; stateless.
    #[serde(rename = "random_dictatorship")]
    RandomDictatorship,
    /// Random serial dictatorship over a shuffled voter order; stateless.
    #[serde(rename = "serial_dictatorship")]
    SerialDictatorship,
    /// Random dictatorship drawing voters proportionally to their weight.
    #[serde(rename = "weighted_random_dictatorship")]
    WeightedRandomDictatorship,
}

impl RuleId {
    /// All recognized rules, in registry order.
    pub const ALL: [RuleId; 20] = [
        RuleId::Av,
        RuleId::PerPav,
        RuleId::PerJan,
        RuleId::PerUnitcost,
        RuleId::PerReset,
        RuleId::PerConsensus,
        RuleId::PerMajority,
        RuleId::Per2ndPrize,
        RuleId::PerNash,
        RuleId::PerEquality,
        RuleId::PerPhragmen,
        RuleId::PerQuota,
        RuleId::PerQuotaMin,
        RuleId::PerQuotaNew,
        RuleId::PerMinmaxDryspell,
        RuleId::RotatingDictatorship,
        RuleId::RotatingSerialDictatorship,
        RuleId::RandomDictatorship,
        RuleId::SerialDictatorship,
        RuleId::WeightedRandomDictatorship,
    ];

    /// Returns the canonical identifier string of the rule.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::Av => "av",
            RuleId::PerPav => "per_pav",
            RuleId::PerJan => "per_jan",
            RuleId::PerUnitcost => "per_unitcost",
            RuleId::PerReset => "per_reset",
            RuleId::PerConsensus => "per_consensus",
            RuleId::PerMajority => "per_majority",
            RuleId::Per2ndPrize => "per_2nd_prize",
            RuleId::PerNash => "per_nash",
            RuleId::PerEquality => "per_equality",
            RuleId::PerPhragmen => "per_phragmen",
            RuleId::PerQuota => "per_quota",
            RuleId::PerQuotaMin => "per_quota_min",
            RuleId::PerQuotaNew => "per_quota_new",
            RuleId::PerMinmaxDryspell => "per_minmax_dryspell",
            RuleId::RotatingDictatorship => "rotating_dictatorship",
            RuleId::RotatingSerialDictatorship => "rotating_serial_dictatorship",
            RuleId::RandomDictatorship => "random_dictatorship",
            RuleId::SerialDictatorship => "serial_dictatorship",
            RuleId::WeightedRandomDictatorship => "weighted_random_dictatorship",
        }
    }

    /// Returns a short display name suitable for plot axes and tables.
    pub fn short_name(self) -> &'static str {
        match self {
            RuleId::Av => "AV",
            RuleId::PerPav => "Per. PAV",
            RuleId::PerJan => "Per. Jan",
            RuleId::PerUnitcost => "Per. Unit-Cost",
            RuleId::PerReset => "Per. Reset",
            RuleId::PerConsensus => "Per. Cons.",
            RuleId::PerMajority => "p-Subn/2",
            RuleId::Per2ndPrize => "p-2nd",
            RuleId::PerNash => "Per. Nash",
            RuleId::PerEquality => "Per. Equality",
            RuleId::PerPhragmen => "Per. Phrag.",
            RuleId::PerQuota => "Per. Quota",
            RuleId::PerQuotaMin => "p-Quo-min",
            RuleId::PerQuotaNew => "p-Quo-new",
            RuleId::PerMinmaxDryspell => "p-Dryspell",
            RuleId::RotatingDictatorship => "Rot. Dict.",
            RuleId::RotatingSerialDictatorship => "Rot. Serial Dict.",
            RuleId::RandomDictatorship => "Rand. Dict.",
            RuleId::SerialDictatorship => "Rand. Serial Dict.",
            RuleId::WeightedRandomDictatorship => "Weighted Rand. Dict.",
        }
    }

    /// Returns `true` for the rules whose outcome depends on the random
    /// source passed to the engine.
    pub fn is_randomized(self) -> bool {
        matches!(
            self,
            RuleId::RandomDictatorship
                | RuleId::SerialDictatorship
                | RuleId::WeightedRandomDictatorship
        )
    }

    /// Returns `true` for the quota family, which owns a paired
    /// (quota, satisfaction) state instead of a scalar one.
    pub fn uses_paired_state(self) -> bool {
        matches!(
            self,
            RuleId::PerQuota | RuleId::PerQuotaMin | RuleId::PerQuotaNew
        )
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .iter()
            .copied()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| RuleError::UnknownRule(s.to_string()))
    }
}
