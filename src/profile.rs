//! Approval profiles: one round's ballots.
//!
//! This module provides the immutable per-round input of the engine.
//! An [`ApprovalProfile`] holds an ordered voter list, an ordered
//! candidate list and each voter's approval set.  Candidate order is
//! significant: every deterministic tie-break in the engine selects the
//! first candidate, in declared order, attaining the extremal score.
//! Approval sets are ordered as well, because the rotating dictatorship
//! outputs a voter's first declared approval.

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifier of a voter.
pub type Voter = u64;

/// Identifier of a candidate.
pub type Candidate = u64;

/// A validated approval profile for a single round.
///
/// Construction checks the two inclusion invariants (approval-set keys
/// are declared voters, approval-set members are declared candidates)
/// and rejects duplicate identifiers.  After construction the profile
/// is read-only; the missing-voter policy clones it before injecting
/// synthetic voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalProfile {
    pub(crate) voters: Vec<Voter>,
    pub(crate) cands: Vec<Candidate>,
    pub(crate) approval_sets: BTreeMap<Voter, Vec<Candidate>>,
}

impl ApprovalProfile {
    /// Creates a profile from a voter list, a candidate list and the
    /// approval sets.
    ///
    /// Voters without an entry in `approval_sets` are given an empty
    /// approval set.  Fails with [`RuleError::InvalidProfile`] naming
    /// the offender if an approval-set key is not a declared voter, an
    /// approved candidate is not declared, or a voter or candidate
    /// identifier is duplicated.
    ///
    /// # Examples
    ///
    /// ```
    /// use perpetual_voting::ApprovalProfile;
    /// use std::collections::BTreeMap;
    ///
    /// let approvals = BTreeMap::from([(1, vec![1]), (2, vec![1]), (3, vec![2])]);
    /// let profile = ApprovalProfile::new(vec![1, 2, 3], vec![1, 2], approvals).unwrap();
    /// assert_eq!(profile.approvals(1), &[1]);
    /// ```
    pub fn new(
        voters: Vec<Voter>,
        cands: Vec<Candidate>,
        mut approval_sets: BTreeMap<Voter, Vec<Candidate>>,
    ) -> Result<Self, RuleError> {
        let voter_set: BTreeSet<Voter> = voters.iter().copied().collect();
        if voter_set.len() != voters.len() {
            return Err(RuleError::InvalidProfile(
                "duplicate voter identifier".to_string(),
            ));
        }
        let cand_set: BTreeSet<Candidate> = cands.iter().copied().collect();
        if cand_set.len() != cands.len() {
            return Err(RuleError::InvalidProfile(
                "duplicate candidate identifier".to_string(),
            ));
        }
        for (voter, approvals) in &approval_sets {
            if !voter_set.contains(voter) {
                return Err(RuleError::InvalidProfile(format!(
                    "{voter} is not a declared voter"
                )));
            }
            for cand in approvals {
                if !cand_set.contains(cand) {
                    return Err(RuleError::InvalidProfile(format!(
                        "{cand} is not a declared candidate (approved by voter {voter})"
                    )));
                }
            }
        }
        for voter in &voters {
            approval_sets.entry(*voter).or_default();
        }
        Ok(Self {
            voters,
            cands,
            approval_sets,
        })
    }

    /// The declared voters, in ballot order.
    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    /// The declared candidates, in tie-break order.
    pub fn cands(&self) -> &[Candidate] {
        &self.cands
    }

    /// The approval set of `voter`, in declaration order.  Unknown
    /// voters have an empty approval set.
    pub fn approvals(&self, voter: Voter) -> &[Candidate] {
        self.approval_sets
            .get(&voter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns `true` if `voter` approves of `cand` in this round.
    pub fn approves(&self, voter: Voter, cand: Candidate) -> bool {
        self.approvals(voter).contains(&cand)
    }

    /// Number of declared voters approving of `cand`.
    pub fn support(&self, cand: Candidate) -> usize {
        self.voters
            .iter()
            .filter(|&&v| self.approves(v, cand))
            .count()
    }

    /// The declared voters approving of `cand`, in ballot order.
    pub fn supporters(&self, cand: Candidate) -> Vec<Voter> {
        self.voters
            .iter()
            .copied()
            .filter(|&v| self.approves(v, cand))
            .collect()
    }
}
