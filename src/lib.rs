#![deny(missing_docs)]

//! # perpetual_voting
//!
//! **perpetual_voting** implements perpetual voting rules: multiwinner-style
//! approval rules stretched over time.  In each round every voter submits an
//! approval set over the round's candidates and exactly one candidate wins;
//! the rules carry hidden per-voter state (weights, quotas, dry spells)
//! across rounds so that voters who were outvoted in the past gain influence
//! over future decisions.  All bookkeeping uses exact rational arithmetic,
//! so two runs over the same profile sequence can never diverge by rounding.
//!
//! ## Features
//!
//! * **Validated round inputs** via [`ApprovalProfile`]: ordered voter and
//!   candidate lists with per-voter approval sets, checked at construction.
//! * **Twenty rules** behind a single closed registry, [`RuleId`]: plain
//!   approval voting, the score-accumulation family (`per_pav`, `per_jan`,
//!   `per_unitcost`, `per_reset`), the subtractive family (`per_consensus`,
//!   `per_majority`, `per_2nd_prize`), the multiplicative Nash rule,
//!   bounded equality, Phragmen-style load balancing, the quota family,
//!   the minimax dry-spell rule and five dictatorship variants.
//! * **Explicit state** via [`WeightState`]: the per-voter accumulators are
//!   an ordinary value the caller owns, initializes with [`init_weights`]
//!   and threads through [`compute_rule`] round by round.
//! * **Missing-voter policies** via [`MissingVoterPolicy`]: strict
//!   rejection, ignoring absentees, or injecting them with empty or full
//!   approval sets.
//! * **Deterministic tie-breaks**: every deterministic rule resolves ties
//!   toward the first candidate in declared order, and the randomized
//!   dictatorships draw from a caller-supplied [`rand::Rng`], so a seeded
//!   generator reproduces a whole experiment.
//!
//! ## Usage
//!
//! Three voters decide six times over the same ballots.  Under plain
//! approval voting the majority candidate would win every round; the
//! perpetual unit-cost rule instead lets the minority voter win every
//! third round:
//!
//! ```rust
//! use perpetual_voting::{
//!     compute_rule_sequence, init_weights, ApprovalProfile, MissingVoterPolicy, RuleId,
//! };
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::collections::BTreeMap;
//!
//! let approvals = BTreeMap::from([(1, vec![1]), (2, vec![1]), (3, vec![2])]);
//! let round = ApprovalProfile::new(vec![1, 2, 3], vec![1, 2], approvals).unwrap();
//! let rounds = vec![round; 6];
//!
//! let mut state = init_weights(RuleId::PerUnitcost, &[1, 2, 3]);
//! let mut rng = StdRng::seed_from_u64(0);
//! let winners = compute_rule_sequence(
//!     RuleId::PerUnitcost,
//!     &rounds,
//!     &mut state,
//!     MissingVoterPolicy::Strict,
//!     &mut rng,
//! )
//! .unwrap();
//! assert_eq!(winners, vec![1, 1, 2, 1, 1, 2]);
//! ```

mod dictatorship;
mod engine;
mod error;
mod missing;
mod phragmen;
mod profile;
mod quota;
mod rules;
mod scoring;
mod weights;

pub use engine::{compute_rule, compute_rule_sequence, init_weights};
pub use error::RuleError;
pub use missing::MissingVoterPolicy;
pub use profile::{ApprovalProfile, Candidate, Voter};
pub use rules::RuleId;
pub use weights::{Weight, WeightState};
