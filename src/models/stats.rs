//! Per-agent statistics derived from a snapshot.

use serde::{Deserialize, Serialize};

/// Which reporting windows a sale falls into. Windows are not exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Windows {
    pub today: bool,
    pub this_week: bool,
    pub this_month: bool,
    pub this_year: bool,
}

/// Statistics for one agent, rebuilt from scratch on every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Sales dated today
    pub daily_count: u32,

    /// Sales dated this week (Monday to Sunday)
    pub weekly_count: u32,

    /// Sales dated this calendar month
    pub monthly_count: u32,

    /// Sales dated this calendar year
    pub yearly_count: u32,

    /// Sum of upfront amounts
    pub upfront_total: f64,

    /// Sum of monitoring amounts
    pub monitoring_total: f64,

    /// All sales, regardless of date
    pub record_count: u32,

    /// `upfront_total / record_count`, or 0 with no sales
    pub avg_upfront: f64,

    /// `monitoring_total / record_count`, or 0 with no sales
    pub avg_monitoring: f64,
}

impl AgentStats {
    /// Add one sale.
    pub fn add_sale(&mut self, upfront: f64, monitoring: f64, windows: Windows) {
        self.record_count += 1;
        self.upfront_total += upfront;
        self.monitoring_total += monitoring;

        if windows.today {
            self.daily_count += 1;
        }
        if windows.this_week {
            self.weekly_count += 1;
        }
        if windows.this_month {
            self.monthly_count += 1;
        }
        if windows.this_year {
            self.yearly_count += 1;
        }
    }

    /// Compute averages from the totals.
    pub fn finalize(&mut self) {
        if self.record_count > 0 {
            let count = self.record_count as f64;
            self.avg_upfront = self.upfront_total / count;
            self.avg_monitoring = self.monitoring_total / count;
        } else {
            self.avg_upfront = 0.0;
            self.avg_monitoring = 0.0;
        }
    }

    /// Average revenue per sale (upfront plus monitoring).
    pub fn avg_revenue(&self) -> f64 {
        self.avg_upfront + self.avg_monitoring
    }
}
