//! Goal thresholds shown as progress bars.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The singleton targets document.
///
/// Missing fields default to zero, which disables that progress bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Targets {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub avg_revenue: f64,
    pub avg_upfront: f64,
}

/// A KPI metric with a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Daily,
    Weekly,
    Monthly,
    AvgRevenue,
    AvgUpfront,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Daily,
        Metric::Weekly,
        Metric::Monthly,
        Metric::AvgRevenue,
        Metric::AvgUpfront,
    ];

    /// Stable key used by the display.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Daily => "daily",
            Metric::Weekly => "weekly",
            Metric::Monthly => "monthly",
            Metric::AvgRevenue => "avg-revenue",
            Metric::AvgUpfront => "avg-upfront",
        }
    }

    /// Monetary metrics render with a currency sign.
    pub fn is_monetary(&self) -> bool {
        matches!(self, Metric::AvgRevenue | Metric::AvgUpfront)
    }
}

impl Targets {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Daily => self.daily,
            Metric::Weekly => self.weekly,
            Metric::Monthly => self.monthly,
            Metric::AvgRevenue => self.avg_revenue,
            Metric::AvgUpfront => self.avg_upfront,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Daily => self.daily = value,
            Metric::Weekly => self.weekly = value,
            Metric::Monthly => self.monthly = value,
            Metric::AvgRevenue => self.avg_revenue = value,
            Metric::AvgUpfront => self.avg_upfront = value,
        }
    }

    /// Build targets from entered text, one value per metric in `Metric::ALL` order.
    /// Every value must be numeric.
    pub fn parse_entered(values: [&str; 5]) -> Result<Self, TargetInputError> {
        let mut targets = Targets::default();
        for (metric, raw) in Metric::ALL.into_iter().zip(values) {
            let value = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| TargetInputError {
                    metric,
                    raw: raw.to_string(),
                })?;
            targets.set(metric, value);
        }
        Ok(targets)
    }
}

/// A target value that is not a number.
#[derive(Debug, Error, PartialEq)]
#[error("Invalid {} target: {raw:?}", .metric.key())]
pub struct TargetInputError {
    pub metric: Metric,
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_document_shape() {
        let json = r#"{"daily":10,"weekly":50,"monthly":200,"avgRevenue":300.5,"avgUpfront":150}"#;
        let targets: Targets = serde_json::from_str(json).unwrap();

        assert_eq!(targets.daily, 10.0);
        assert_eq!(targets.avg_revenue, 300.5);
        assert_eq!(targets.get(Metric::AvgUpfront), 150.0);
    }

    #[test]
    fn test_targets_missing_fields_default_to_zero() {
        let targets: Targets = serde_json::from_str(r#"{"daily":4}"#).unwrap();
        assert_eq!(targets.daily, 4.0);
        assert_eq!(targets.weekly, 0.0);
        assert_eq!(targets.avg_upfront, 0.0);
    }

    #[test]
    fn test_targets_serialize_camel_case() {
        let json = serde_json::to_string(&Targets::default()).unwrap();
        assert!(json.contains("avgRevenue"));
        assert!(json.contains("avgUpfront"));
    }

    #[test]
    fn test_parse_entered() {
        let targets = Targets::parse_entered(["5", "25", "100", "250.5", "180"]).unwrap();
        assert_eq!(targets.monthly, 100.0);
        assert_eq!(targets.avg_revenue, 250.5);

        let err = Targets::parse_entered(["5", "x", "100", "250", "180"]).unwrap_err();
        assert_eq!(err.metric, Metric::Weekly);
        assert_eq!(err.to_string(), "Invalid weekly target: \"x\"");
    }

    #[test]
    fn test_metric_keys() {
        let keys: Vec<_> = Metric::ALL.iter().map(Metric::key).collect();
        assert_eq!(
            keys,
            vec!["daily", "weekly", "monthly", "avg-revenue", "avg-upfront"]
        );
    }
}
