//! Removal by slack tier.

use rand::Rng;

use super::Placed;
use crate::model::ShipmentId;
use crate::random::partial_shuffle;

/// Upper slack bound of the low tier, in hours.
pub(crate) const LOW_SLACK_HOURS: f64 = 8.0;

/// Upper slack bound of the medium tier, in hours.
pub(crate) const MEDIUM_SLACK_HOURS: f64 = 32.0;

const SHUFFLE_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlackTier {
    Low,
    Medium,
    High,
    Delivered,
}

pub(crate) fn tier(p: &Placed<'_>) -> SlackTier {
    if p.is_delivered() {
        SlackTier::Delivered
    } else if p.slack <= LOW_SLACK_HOURS {
        SlackTier::Low
    } else if p.slack <= MEDIUM_SLACK_HOURS {
        SlackTier::Medium
    } else {
        SlackTier::High
    }
}

/// Takes `count` shipments from the first of high, medium and delivered
/// tiers holding at least `count` members. The low tier is left alone.
pub(super) fn select<R: Rng>(
    placed: &[Placed<'_>],
    count: usize,
    rng: &mut R,
) -> Option<Vec<ShipmentId>> {
    for wanted in [SlackTier::High, SlackTier::Medium, SlackTier::Delivered] {
        let mut members: Vec<&Placed<'_>> = placed.iter().filter(|p| tier(p) == wanted).collect();
        if members.len() < count {
            continue;
        }
        members.sort_by(|a, b| b.slack.total_cmp(&a.slack));
        partial_shuffle(&mut members, SHUFFLE_FRACTION, rng);
        return Some(members.into_iter().take(count).map(|p| p.id).collect());
    }
    None
}
