use crate::analyzers::types::{RouteSummary, Thresholds, UnderperformingRoute};

/// Routes with a low average share and flat or declining revenue.
///
/// A route qualifies when `avg_share < thresholds.share` and
/// `rev_change <= thresholds.rev_change`. Routes missing either value never
/// qualify. The result is ordered by average share, then revenue change, both
/// ascending, so the weakest routes come first. An empty result is normal.
pub fn identify_underperforming(
    summaries: &[RouteSummary],
    thresholds: &Thresholds,
) -> Vec<UnderperformingRoute> {
    let mut flagged: Vec<UnderperformingRoute> = summaries
        .iter()
        .filter_map(|s| {
            let avg_share = s.avg_share.filter(|v| *v < thresholds.share)?;
            let rev_change = s.rev_change.filter(|v| *v <= thresholds.rev_change)?;

            Some(UnderperformingRoute {
                route: s.route.clone(),
                avg_annual_our_revenue: s.avg_annual_our_revenue,
                avg_share,
                rev_first: s.rev_first,
                rev_last: s.rev_last,
                rev_change,
                rev_change_pct: s.rev_change_pct,
            })
        })
        .collect();

    flagged.sort_by(|a, b| {
        a.avg_share
            .total_cmp(&b.avg_share)
            .then_with(|| a.rev_change.total_cmp(&b.rev_change))
    });
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(route: &str, share: Option<f64>, change: Option<f64>) -> RouteSummary {
        RouteSummary {
            route: route.to_string(),
            avg_annual_our_revenue: Some(1000.0),
            avg_annual_market_revenue: Some(5000.0),
            avg_share: share,
            years_active: 3,
            year_first: 2018,
            rev_first: Some(1000.0),
            year_last: 2023,
            rev_last: change.map(|c| 1000.0 + c),
            rev_change: change,
            rev_change_pct: change.map(|c| c / 1000.0),
        }
    }

    #[test]
    fn test_both_conditions_required() {
        let summaries = vec![
            summary("LOW-DOWN", Some(0.10), Some(-50.0)),
            summary("LOW-UP", Some(0.10), Some(50.0)),
            summary("HIGH-DOWN", Some(0.60), Some(-50.0)),
        ];
        let flagged = identify_underperforming(&summaries, &Thresholds::default());

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].route, "LOW-DOWN");
    }

    #[test]
    fn test_threshold_boundaries() {
        let summaries = vec![
            // share must be strictly below, change may equal
            summary("AT-SHARE", Some(0.25), Some(-1.0)),
            summary("FLAT", Some(0.20), Some(0.0)),
        ];
        let flagged = identify_underperforming(&summaries, &Thresholds::default());

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].route, "FLAT");
    }

    #[test]
    fn test_missing_values_never_flagged() {
        let summaries = vec![
            summary("NO-SHARE", None, Some(-10.0)),
            summary("NO-CHANGE", Some(0.1), None),
        ];
        assert!(identify_underperforming(&summaries, &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_ordering_worst_first() {
        let summaries = vec![
            summary("C", Some(0.20), Some(-10.0)),
            summary("A", Some(0.05), Some(-5.0)),
            summary("B", Some(0.05), Some(-500.0)),
        ];
        let flagged = identify_underperforming(&summaries, &Thresholds::default());
        let routes: Vec<&str> = flagged.iter().map(|r| r.route.as_str()).collect();

        assert_eq!(routes, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_rerun_is_identical() {
        let summaries = vec![
            summary("X", Some(0.12), Some(-1.0)),
            summary("Y", Some(0.12), Some(-1.0)),
            summary("Z", Some(0.01), Some(0.0)),
        ];
        let thresholds = Thresholds::default();
        let first = identify_underperforming(&summaries, &thresholds);
        let second = identify_underperforming(&summaries, &thresholds);

        assert_eq!(first, second);
        assert_eq!(first[1].route, "X");
    }

    #[test]
    fn test_custom_thresholds() {
        let summaries = vec![summary("A", Some(0.40), Some(100.0))];
        let thresholds = Thresholds {
            share: 0.5,
            rev_change: 250.0,
        };
        assert_eq!(identify_underperforming(&summaries, &thresholds).len(), 1);
    }
}
