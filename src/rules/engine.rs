//! Threshold rule evaluation for a single observation.

use crate::models::alert::{AlertThresholds, Decision};
use crate::rules::change::percent_change;
use std::fmt;

pub const ALWAYS_NOTIFY_REASON: &str = "always_notify=true";

pub struct RuleEngine;

impl RuleEngine {
    /// Evaluate the threshold rules for `current` against the previous bid.
    ///
    /// Rules run in a fixed order (drop, rise, buy target) so the reasons are
    /// reproducible. `always_notify` short-circuits everything else.
    pub fn evaluate(current: f64, previous: Option<f64>, thresholds: &AlertThresholds) -> Decision {
        if thresholds.always_notify {
            return Decision::from_reasons(vec![ALWAYS_NOTIFY_REASON.to_string()]);
        }

        let hits = Self::collect_hits(current, previous, thresholds);
        Decision::from_reasons(hits.iter().map(ToString::to_string).collect())
    }

    fn collect_hits(current: f64, previous: Option<f64>, thresholds: &AlertThresholds) -> Vec<RuleHit> {
        let mut hits = Vec::new();

        if let Some(change) = percent_change(current, previous) {
            if let Some(drop_pct) = thresholds.alert_drop_pct {
                let limit = drop_pct.abs();
                if change <= -limit {
                    hits.push(RuleHit::Drop { change, limit });
                }
            }
            if let Some(rise_pct) = thresholds.alert_rise_pct {
                let limit = rise_pct.abs();
                if change >= limit {
                    hits.push(RuleHit::Rise { change, limit });
                }
            }
        }

        if let Some(level) = thresholds.buy_below {
            if current <= level {
                hits.push(RuleHit::BelowBuyTarget { level });
            }
        }

        hits
    }
}

/// A rule that fired, rendered as its human-readable reason.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RuleHit {
    Drop { change: f64, limit: f64 },
    Rise { change: f64, limit: f64 },
    BelowBuyTarget { level: f64 },
}

impl fmt::Display for RuleHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleHit::Drop { change, limit } => write!(f, "drop {:.2}% <= -{:.2}%", change, limit),
            RuleHit::Rise { change, limit } => write!(f, "rise {:+.2}% >= +{:.2}%", change, limit),
            RuleHit::BelowBuyTarget { level } => write!(f, "below buy target (<= {:.4})", level),
        }
    }
}
