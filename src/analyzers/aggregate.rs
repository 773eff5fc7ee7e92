use crate::analyzers::types::{RouteAggregate, RouteSummary, RouteTrend};
use crate::analyzers::utility::{mean_present, pct_change};
use crate::dataset::NormalizedRecord;
use crate::error::AnalysisError;
use std::collections::{BTreeMap, BTreeSet};

/// Groups records by route key. Within a route, rows keep their input order.
fn group_by_route(records: &[NormalizedRecord]) -> BTreeMap<&str, Vec<&NormalizedRecord>> {
    let mut groups: BTreeMap<&str, Vec<&NormalizedRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.route.as_str()).or_default().push(r);
    }
    groups
}

/// Per-route means of revenue and share, and the number of distinct years seen.
///
/// Missing values are left out of each mean rather than counted as zero.
pub fn aggregate_routes(records: &[NormalizedRecord]) -> BTreeMap<String, RouteAggregate> {
    group_by_route(records)
        .into_iter()
        .map(|(route, rows)| {
            let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();

            let aggregate = RouteAggregate {
                route: route.to_string(),
                avg_our_revenue: mean_present(rows.iter().map(|r| r.our_revenue)),
                avg_market_revenue: mean_present(rows.iter().map(|r| r.market_revenue)),
                avg_share: mean_present(rows.iter().map(|r| r.largest_ms)),
                years_active: years.len(),
            };
            (route.to_string(), aggregate)
        })
        .collect()
}

/// First and last revenue per route, by year.
///
/// Rows are ordered by year with a stable sort, so several quarters of the
/// same year stay in file order. The years come from the first and last row;
/// the revenues are the first and last rows that actually carry a revenue.
pub fn route_trends(records: &[NormalizedRecord]) -> BTreeMap<String, RouteTrend> {
    group_by_route(records)
        .into_iter()
        .filter_map(|(route, mut rows)| {
            rows.sort_by_key(|r| r.year);

            let year_first = rows.first()?.year;
            let year_last = rows.last()?.year;
            let rev_first = rows.iter().find_map(|r| r.our_revenue);
            let rev_last = rows.iter().rev().find_map(|r| r.our_revenue);

            Some((
                route.to_string(),
                RouteTrend {
                    year_first,
                    rev_first,
                    year_last,
                    rev_last,
                },
            ))
        })
        .collect()
}

/// Left-joins aggregates with trends into route summaries, ordered by route.
///
/// Both inputs come from the same records, so a route with no trend is a bug
/// and fails the run.
pub fn join_summaries(
    aggregates: BTreeMap<String, RouteAggregate>,
    trends: &BTreeMap<String, RouteTrend>,
) -> Result<Vec<RouteSummary>, AnalysisError> {
    aggregates
        .into_values()
        .map(|agg| -> Result<RouteSummary, AnalysisError> {
            let trend = trends
                .get(&agg.route)
                .ok_or_else(|| AnalysisError::MissingTrend {
                    route: agg.route.clone(),
                })?;

            let rev_change = trend.rev_last.zip(trend.rev_first).map(|(l, f)| l - f);

            Ok(RouteSummary {
                route: agg.route,
                avg_annual_our_revenue: agg.avg_our_revenue,
                avg_annual_market_revenue: agg.avg_market_revenue,
                avg_share: agg.avg_share,
                years_active: agg.years_active,
                year_first: trend.year_first,
                rev_first: trend.rev_first,
                year_last: trend.year_last,
                rev_last: trend.rev_last,
                rev_change,
                rev_change_pct: pct_change(rev_change, trend.rev_first),
            })
        })
        .collect()
}
