//! Error taxonomy for the rule engine.
//!
//! Every fallible operation in this crate surfaces one of the variants
//! below.  No error is ever swallowed or converted into an approximate
//! answer: the winner of a round and the arithmetic state behind it are
//! exact or they are not produced at all.

use crate::profile::Voter;
use thiserror::Error;

/// Errors surfaced by profile construction, policy application and the
/// rule algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A profile invariant was violated at construction time.  The
    /// message names the offending voter or candidate.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A voter the weight state was initialized for is absent from the
    /// round's profile and the missing-voter policy is strict.
    #[error("voter {0} is missing from the profile")]
    MissingVoter(Voter),

    /// A voter ended up with an empty approval set under the strict
    /// missing-voter policy.
    #[error("voter {0} has an empty approval set")]
    DegenerateProfile(Voter),

    /// A rule identifier string was not recognized.
    #[error("rule `{0}` is unknown")]
    UnknownRule(String),

    /// A rule was invoked with a weight state of the wrong shape, or
    /// with a state initialized for a different electorate.
    #[error("state shape mismatch: {0}")]
    StateShapeMismatch(String),

    /// A score computation ran into an empty denominator or an
    /// otherwise unresolvable input (no candidates, no voter with a
    /// nonempty approval set, zero total weight for a weighted draw).
    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),
}
