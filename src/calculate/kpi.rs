//! Board-wide KPIs and progress against targets.

use std::collections::BTreeMap;

use crate::models::{AgentStats, KpiProgress, KpiView, Metric, Progress, ProgressTier, Targets};

/// Percentage of `target` reached, clamped to `[0, 100]`.
/// A target of zero or less disables the bar.
pub fn progress_percent(value: f64, target: f64) -> f64 {
    if target > 0.0 {
        let percent = value / target * 100.0;
        if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        }
    } else {
        0.0
    }
}

/// Build a progress bar for one metric.
pub fn progress(value: f64, target: f64) -> Progress {
    let percent = progress_percent(value, target);
    Progress {
        value,
        target,
        percent,
        tier: ProgressTier::from_percent(percent),
    }
}

/// Roll per-agent stats of both teams into board totals.
pub fn compute_kpis(stats: &BTreeMap<String, AgentStats>, targets: &Targets) -> KpiView {
    let mut daily = 0u32;
    let mut weekly = 0u32;
    let mut monthly = 0u32;
    let mut upfront_total = 0.0;
    let mut monitoring_total = 0.0;
    let mut record_count = 0u32;

    for s in stats.values() {
        daily += s.daily_count;
        weekly += s.weekly_count;
        monthly += s.monthly_count;
        upfront_total += s.upfront_total;
        monitoring_total += s.monitoring_total;
        record_count += s.record_count;
    }

    let (avg_revenue, avg_upfront) = if record_count > 0 {
        let count = record_count as f64;
        ((upfront_total + monitoring_total) / count, upfront_total / count)
    } else {
        (0.0, 0.0)
    };

    let bar = |metric: Metric, value: f64| progress(value, targets.get(metric));

    KpiView {
        daily,
        weekly,
        monthly,
        avg_revenue,
        avg_upfront,
        progress: KpiProgress {
            daily: bar(Metric::Daily, daily as f64),
            weekly: bar(Metric::Weekly, weekly as f64),
            monthly: bar(Metric::Monthly, monthly as f64),
            avg_revenue: bar(Metric::AvgRevenue, avg_revenue),
            avg_upfront: bar(Metric::AvgUpfront, avg_upfront),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats(daily: u32, weekly: u32, monthly: u32, upfront: f64, monitoring: f64, count: u32) -> AgentStats {
        let mut s = AgentStats {
            daily_count: daily,
            weekly_count: weekly,
            monthly_count: monthly,
            yearly_count: monthly,
            upfront_total: upfront,
            monitoring_total: monitoring,
            record_count: count,
            ..Default::default()
        };
        s.finalize();
        s
    }

    #[test]
    fn test_progress_percent_bounds() {
        assert_eq!(progress_percent(5.0, 10.0), 50.0);
        assert_eq!(progress_percent(50.0, 10.0), 100.0);
        assert_eq!(progress_percent(-5.0, 10.0), 0.0);
        assert_eq!(progress_percent(5.0, 0.0), 0.0);
        assert_eq!(progress_percent(5.0, -1.0), 0.0);
        assert_eq!(progress_percent(f64::MAX, f64::MIN_POSITIVE), 100.0);
    }

    #[test]
    fn test_progress_percent_always_in_range() {
        let values = [0.0, 0.5, 7.0, 69.9, 1e9, -3.0];
        let targets = [0.0, 0.001, 1.0, 10.0, 1e12, -2.0];
        for v in values {
            for t in targets {
                let p = progress_percent(v, t);
                assert!((0.0..=100.0).contains(&p), "{} / {} gave {}", v, t, p);
            }
        }
    }

    #[test]
    fn test_progress_tiers() {
        assert_eq!(progress(6.9, 10.0).tier, ProgressTier::Behind);
        assert_eq!(progress(7.0, 10.0).tier, ProgressTier::Approaching);
        assert_eq!(progress(9.99, 10.0).tier, ProgressTier::Approaching);
        assert_eq!(progress(10.0, 10.0).tier, ProgressTier::Met);
        assert_eq!(progress(3.0, 0.0).tier, ProgressTier::Behind);
    }

    #[test]
    fn test_compute_kpis_sums_both_teams() {
        let mut all = BTreeMap::new();
        all.insert("A".to_string(), stats(2, 3, 4, 300.0, 50.0, 2));
        all.insert("B".to_string(), stats(0, 1, 1, 50.0, 50.0, 1));
        all.insert("C".to_string(), AgentStats::default());

        let targets = Targets {
            daily: 4.0,
            weekly: 4.0,
            monthly: 10.0,
            avg_revenue: 100.0,
            avg_upfront: 200.0,
        };
        let kpis = compute_kpis(&all, &targets);

        assert_eq!(kpis.daily, 2);
        assert_eq!(kpis.weekly, 4);
        assert_eq!(kpis.monthly, 5);
        assert!((kpis.avg_revenue - 450.0 / 3.0).abs() < 1e-9);
        assert!((kpis.avg_upfront - 350.0 / 3.0).abs() < 1e-9);

        assert_eq!(kpis.progress.daily.percent, 50.0);
        assert_eq!(kpis.progress.weekly.tier, ProgressTier::Met);
        assert_eq!(kpis.progress.avg_revenue.percent, 100.0);
        assert_eq!(kpis.progress.monthly.tier, ProgressTier::Behind);
    }

    #[test]
    fn test_compute_kpis_without_sales() {
        let mut all = BTreeMap::new();
        all.insert("A".to_string(), AgentStats::default());

        let kpis = compute_kpis(&all, &Targets::default());

        assert_eq!(kpis.avg_revenue, 0.0);
        assert_eq!(kpis.avg_upfront, 0.0);
        assert_eq!(kpis.progress.daily.percent, 0.0);
    }
}
