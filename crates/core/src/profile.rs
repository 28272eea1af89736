//! Saved-search configuration profile.
//!
//! One profile is applied uniformly to every alert registered in a run; it
//! is never derived per-document. Defaults schedule the search every minute
//! over a one-hour dispatch window and trigger on any event, so a stimulus
//! issued just before the wait window is guaranteed to be in range.

use serde::{Deserialize, Serialize};

/// Static attributes of a registered scheduled alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertProfile {
    /// Evaluation cadence, cron syntax.
    #[serde(default = "default_cron_schedule")]
    pub cron_schedule: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Relative start of the dispatch window.
    #[serde(default = "default_dispatch_earliest")]
    pub dispatch_earliest: String,

    /// Relative end of the dispatch window.
    #[serde(default = "default_dispatch_latest")]
    pub dispatch_latest: String,

    /// Trigger comparator, e.g. "greater than".
    #[serde(default = "default_alert_comparator")]
    pub alert_comparator: String,

    /// Trigger threshold the comparator is applied against.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: String,

    /// Quantity the trigger condition measures.
    #[serde(default = "default_alert_type")]
    pub alert_type: String,

    /// Whether the search runs on its schedule at all.
    #[serde(default = "default_true")]
    pub is_scheduled: bool,

    /// Whether fired instances are tracked (required for reconciliation).
    #[serde(default = "default_true")]
    pub track: bool,
}

impl Default for AlertProfile {
    fn default() -> Self {
        AlertProfile {
            cron_schedule: default_cron_schedule(),
            description: default_description(),
            dispatch_earliest: default_dispatch_earliest(),
            dispatch_latest: default_dispatch_latest(),
            alert_comparator: default_alert_comparator(),
            alert_threshold: default_alert_threshold(),
            alert_type: default_alert_type(),
            is_scheduled: true,
            track: true,
        }
    }
}

impl AlertProfile {
    /// Flatten into the form attributes the backend's saved-search endpoint
    /// expects. Booleans serialize as "1"/"0".
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cron_schedule", self.cron_schedule.clone()),
            ("description", self.description.clone()),
            ("dispatch.earliest_time", self.dispatch_earliest.clone()),
            ("dispatch.latest_time", self.dispatch_latest.clone()),
            ("alert_comparator", self.alert_comparator.clone()),
            ("alert_threshold", self.alert_threshold.clone()),
            ("alert_type", self.alert_type.clone()),
            ("is_scheduled", flag(self.is_scheduled)),
            ("alert.track", flag(self.track)),
        ]
    }
}

fn flag(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

fn default_cron_schedule() -> String {
    "*/1 * * * *".to_string()
}

fn default_description() -> String {
    "Managed by the detection validation pipeline".to_string()
}

fn default_dispatch_earliest() -> String {
    "-1h".to_string()
}

fn default_dispatch_latest() -> String {
    "now".to_string()
}

fn default_alert_comparator() -> String {
    "greater than".to_string()
}

fn default_alert_threshold() -> String {
    "0".to_string()
}

fn default_alert_type() -> String {
    "number of events".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_schedules_every_minute_over_an_hour() {
        let p = AlertProfile::default();
        assert_eq!(p.cron_schedule, "*/1 * * * *");
        assert_eq!(p.dispatch_earliest, "-1h");
        assert_eq!(p.dispatch_latest, "now");
        assert_eq!(p.alert_comparator, "greater than");
        assert_eq!(p.alert_threshold, "0");
        assert!(p.is_scheduled);
        assert!(p.track);
    }

    #[test]
    fn form_params_use_backend_attribute_names() {
        let params = AlertProfile::default().form_params();
        let lookup = |k: &str| {
            params
                .iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(lookup("dispatch.earliest_time"), Some("-1h"));
        assert_eq!(lookup("dispatch.latest_time"), Some("now"));
        assert_eq!(lookup("alert.track"), Some("1"));
        assert_eq!(lookup("is_scheduled"), Some("1"));
        assert_eq!(lookup("alert_type"), Some("number of events"));
    }
}
