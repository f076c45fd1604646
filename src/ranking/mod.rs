//! Multi-criteria ranking of shipments and candidate routes.
//!
//! Operators often order items by several criteria at once. A [`Ranker`]
//! composes [`RankRule`]s in one of two ways:
//!
//! - **Lexicographic**: rules are consulted in order; a later rule only
//!   breaks ties left by the earlier ones.
//! - **Weighted**: every rule contributes to a weighted sum.
//!
//! Scores follow one convention throughout: lower ranks first.
//!
//! # References
//!
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", ch. 14
//! (composite priority rules)

mod ranker;
mod rule;

pub use ranker::{Composition, Ranker};
pub use rule::RankRule;
