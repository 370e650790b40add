use serde::{Deserialize, Serialize};

/// Threshold rules applied to one pair. Every rule is independent and an
/// absent value disables it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Alert when the bid is at or below this level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_below: Option<f64>,
    /// Alert when the change is at or below `-|alert_drop_pct|` percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_drop_pct: Option<f64>,
    /// Alert when the change is at or above `+|alert_rise_pct|` percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_rise_pct: Option<f64>,
    /// Notify on every observation, skipping all other rules.
    #[serde(default)]
    pub always_notify: bool,
}

impl AlertThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buy_below(mut self, level: f64) -> Self {
        self.buy_below = Some(level);
        self
    }

    pub fn with_drop_pct(mut self, pct: f64) -> Self {
        self.alert_drop_pct = Some(pct);
        self
    }

    pub fn with_rise_pct(mut self, pct: f64) -> Self {
        self.alert_rise_pct = Some(pct);
        self
    }

    pub fn with_always_notify(mut self, always_notify: bool) -> Self {
        self.always_notify = always_notify;
        self
    }
}

/// Outcome of evaluating one observation against its thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub notify: bool,
    pub reasons: Vec<String>,
}

impl Decision {
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            notify: !reasons.is_empty(),
            reasons,
        }
    }
}
