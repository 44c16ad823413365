//! Reconciliation of a round's profile against the full electorate.
//!
//! A weight state is initialized for a fixed voter set, but real ballot
//! data is often incomplete: some rounds miss some voters.  The
//! [`MissingVoterPolicy`] decides how the engine bridges that gap before
//! any rule algorithm runs.  Reconciliation is copy-on-write: the
//! caller's profile is never mutated, and a new profile is only
//! allocated when voters actually have to be injected.

use crate::error::RuleError;
use crate::profile::ApprovalProfile;
use crate::weights::WeightState;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Policy for voters the state tracks but the profile lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingVoterPolicy {
    /// Fail with [`RuleError::MissingVoter`] if any tracked voter is
    /// absent, and with [`RuleError::DegenerateProfile`] if any voter
    /// has an empty approval set.  This is the default.
    #[default]
    Strict,
    /// Proceed with the profile's own, possibly smaller, voter set.
    Ignore,
    /// Inject each absent voter with an empty approval set.
    Empty,
    /// Inject each absent voter approving every candidate, as if
    /// abstaining positively.
    All,
}

/// Applies `policy` to `profile` given the electorate of `state`.
///
/// Returns the profile to run the round on: borrowed when nothing had
/// to change, owned when voters were injected.  Never touches the
/// weight state.
pub(crate) fn reconcile<'a>(
    profile: &'a ApprovalProfile,
    state: &WeightState,
    policy: MissingVoterPolicy,
) -> Result<Cow<'a, ApprovalProfile>, RuleError> {
    let present: BTreeSet<_> = profile.voters().iter().copied().collect();
    let absent: Vec<_> = state.voters().filter(|v| !present.contains(v)).collect();

    match policy {
        MissingVoterPolicy::Ignore => Ok(Cow::Borrowed(profile)),
        MissingVoterPolicy::Strict => {
            if let Some(&voter) = absent.first() {
                return Err(RuleError::MissingVoter(voter));
            }
            for &voter in profile.voters() {
                if profile.approvals(voter).is_empty() {
                    return Err(RuleError::DegenerateProfile(voter));
                }
            }
            Ok(Cow::Borrowed(profile))
        }
        MissingVoterPolicy::Empty | MissingVoterPolicy::All => {
            if absent.is_empty() {
                return Ok(Cow::Borrowed(profile));
            }
            let mut patched = profile.clone();
            for voter in absent {
                let approvals = match policy {
                    MissingVoterPolicy::All => patched.cands.clone(),
                    _ => Vec::new(),
                };
                patched.voters.push(voter);
                patched.approval_sets.insert(voter, approvals);
            }
            Ok(Cow::Owned(patched))
        }
    }
}
