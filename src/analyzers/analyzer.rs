use crate::analyzers::aggregate::{aggregate_routes, join_summaries, route_trends};
use crate::analyzers::types::CarrierAnalysis;
use crate::dataset::NormalizedRecord;
use crate::error::AnalysisError;
use tracing::info;

/// Narrows `records` to rows where `carrier` is the largest carrier and
/// summarizes them per route.
///
/// # Errors
///
/// [`AnalysisError::NoData`] if no row has `carrier` as its largest carrier.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn summarize_for_carrier(
    records: &[NormalizedRecord],
    carrier: &str,
) -> Result<CarrierAnalysis, AnalysisError> {
    let ours: Vec<NormalizedRecord> = records
        .iter()
        .filter(|r| r.largest_carrier == carrier)
        .cloned()
        .collect();

    if ours.is_empty() {
        return Err(AnalysisError::NoData {
            carrier: carrier.to_string(),
        });
    }

    let aggregates = aggregate_routes(&ours);
    let trends = route_trends(&ours);
    let summaries = join_summaries(aggregates, &trends)?;

    info!(
        carrier,
        carrier_rows = ours.len(),
        routes = summaries.len(),
        "Carrier routes summarized"
    );

    Ok(CarrierAnalysis {
        carrier: carrier.to_string(),
        records: ours,
        summaries,
    })
}
