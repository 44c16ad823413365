//! Per-voter weight state threaded across rounds.
//!
//! Every perpetual rule owns hidden per-voter state that lets future
//! rounds compensate voters who were not satisfied in the past.  The
//! shape of that state depends on the rule family: most rules keep one
//! exact rational per voter, the quota family keeps a pair of maps
//! (accumulated entitlement and satisfaction count).  The voter-key set
//! is fixed when the state is initialized and never changes afterwards;
//! only the values mutate.

use crate::error::RuleError;
use crate::profile::Voter;
use crate::rules::RuleId;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::collections::BTreeMap;

/// Exact rational weight of a single voter.
pub type Weight = BigRational;

/// Builds an exact rational from an integer.
pub(crate) fn whole(n: i64) -> Weight {
    BigRational::from_integer(BigInt::from(n))
}

/// Builds the exact rational `num / den`.
///
/// Invariant: `den` is nonzero.
pub(crate) fn frac(num: i64, den: i64) -> Weight {
    BigRational::new(BigInt::from(num), BigInt::from(den))
}

/// The mutable per-voter state of one rule over one profile sequence.
///
/// A `WeightState` is created once per experiment via
/// [`init_weights`](crate::init_weights) and mutated in place by every
/// subsequent round.  It is owned by exactly one engine at a time and
/// is deliberately not serializable: persistence belongs to external
/// experiment drivers, not to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightState {
    /// One rational per voter (score-accumulation, subtractive,
    /// multiplicative, load-balancing, dictatorship and dry-spell
    /// families).
    Scalar(BTreeMap<Voter, Weight>),
    /// The quota family's paired accumulators.
    Paired {
        /// Monotonically non-decreasing accumulated entitlement.
        quota: BTreeMap<Voter, Weight>,
        /// Count of rounds in which the voter approved the winner.
        satisfaction: BTreeMap<Voter, Weight>,
    },
}

impl WeightState {
    /// Creates the freshly shaped state `rule` expects for `voters`.
    ///
    /// Scalar state starts at 0 for the Nash, equality and Phragmen
    /// rules, at the paired zeros for the quota family, and at 1 for
    /// every other rule (including the dictatorship eligibility flag
    /// and the dry-spell counter).
    pub fn init(rule: RuleId, voters: &[Voter]) -> Self {
        if rule.uses_paired_state() {
            return WeightState::Paired {
                quota: voters.iter().map(|&v| (v, whole(0))).collect(),
                satisfaction: voters.iter().map(|&v| (v, whole(0))).collect(),
            };
        }
        let start = match rule {
            RuleId::PerNash | RuleId::PerEquality | RuleId::PerPhragmen => whole(0),
            _ => whole(1),
        };
        WeightState::Scalar(voters.iter().map(|&v| (v, start.clone())).collect())
    }

    /// Iterates over the voters this state was initialized for, in
    /// ascending identifier order.
    pub fn voters(&self) -> impl Iterator<Item = Voter> + '_ {
        let map = match self {
            WeightState::Scalar(weights) => weights,
            WeightState::Paired { quota, .. } => quota,
        };
        map.keys().copied()
    }

    /// Read access to the scalar map, if this is a scalar state.
    pub fn scalar(&self) -> Option<&BTreeMap<Voter, Weight>> {
        match self {
            WeightState::Scalar(weights) => Some(weights),
            WeightState::Paired { .. } => None,
        }
    }

    /// Read access to the (quota, satisfaction) pair, if this is a
    /// paired state.
    pub fn paired(&self) -> Option<(&BTreeMap<Voter, Weight>, &BTreeMap<Voter, Weight>)> {
        match self {
            WeightState::Scalar(_) => None,
            WeightState::Paired {
                quota,
                satisfaction,
            } => Some((quota, satisfaction)),
        }
    }

    /// Mutable access to the scalar map; fails with
    /// [`RuleError::StateShapeMismatch`] if the state is paired.
    pub(crate) fn scalar_mut(
        &mut self,
        rule: RuleId,
    ) -> Result<&mut BTreeMap<Voter, Weight>, RuleError> {
        match self {
            WeightState::Scalar(weights) => Ok(weights),
            WeightState::Paired { .. } => Err(RuleError::StateShapeMismatch(format!(
                "rule {rule} expects a scalar weight state"
            ))),
        }
    }

    /// Mutable access to the (quota, satisfaction) pair; fails with
    /// [`RuleError::StateShapeMismatch`] if the state is scalar.
    pub(crate) fn paired_mut(
        &mut self,
        rule: RuleId,
    ) -> Result<(&mut BTreeMap<Voter, Weight>, &mut BTreeMap<Voter, Weight>), RuleError> {
        match self {
            WeightState::Scalar(_) => Err(RuleError::StateShapeMismatch(format!(
                "rule {rule} expects a paired weight state"
            ))),
            WeightState::Paired {
                quota,
                satisfaction,
            } => Ok((quota, satisfaction)),
        }
    }
}
