use route_fare_analyzer::analyzers::analyzer::summarize_for_carrier;
use route_fare_analyzer::analyzers::classify::identify_underperforming;
use route_fare_analyzer::analyzers::types::Thresholds;
use route_fare_analyzer::config::AnalysisConfig;
use route_fare_analyzer::dataset::Dataset;
use route_fare_analyzer::error::{AnalysisError, WarningKind};
use route_fare_analyzer::output::read_route_summary;
use route_fare_analyzer::pipeline;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_routes.csv");

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_load_fixture() {
    let dataset = Dataset::load(FIXTURE, 2018, 2023).expect("Failed to load fixture");

    assert_eq!(dataset.rows_read, 12);
    // 2015 and 2017 rows fall outside the window
    assert_eq!(dataset.records.len(), 10);
    assert!(dataset.share_was_percent);
    assert!(dataset
        .records
        .iter()
        .all(|r| r.largest_ms.is_none_or(|s| (0.0..=1.0).contains(&s))));

    assert_eq!(dataset.warnings.len(), 1);
    assert_eq!(dataset.warnings[0].column, "avg_fare");
    assert_eq!(dataset.warnings[0].kind, WarningKind::NotANumber);

    let jfk = dataset.records.iter().find(|r| r.route == "JFK-MIA").unwrap();
    assert_eq!(jfk.market_revenue, None);
    assert_eq!(jfk.our_revenue, None);

    assert_eq!(dataset.top_carriers(1), vec![("UA".to_string(), 8)]);
}

#[test]
fn test_ord_lax_scenario() {
    let dataset = Dataset::load(FIXTURE, 2018, 2023).unwrap();
    let analysis = summarize_for_carrier(&dataset.records, "UA").unwrap();

    let shares: Vec<f64> = analysis
        .records
        .iter()
        .filter(|r| r.route == "ORD-LAX")
        .map(|r| r.largest_ms.unwrap())
        .collect();
    assert_eq!(shares.len(), 3);
    assert!(approx(shares[0], 0.20));
    assert!(approx(shares[1], 0.22));
    assert!(approx(shares[2], 0.18));

    let ord_lax = analysis
        .summaries
        .iter()
        .find(|s| s.route == "ORD-LAX")
        .unwrap();
    assert!(approx(ord_lax.avg_annual_our_revenue.unwrap(), 47460.0));
    assert!(approx(ord_lax.rev_first.unwrap(), 40000.0));
    assert!(approx(ord_lax.rev_last.unwrap(), 49140.0));
    assert!(approx(ord_lax.rev_change.unwrap(), 9140.0));
    assert_eq!(ord_lax.years_active, 3);
    assert_eq!((ord_lax.year_first, ord_lax.year_last), (2018, 2023));

    let flagged = identify_underperforming(&analysis.summaries, &Thresholds::default());
    assert!(flagged.iter().all(|r| r.route != "ORD-LAX"));
}

#[test]
fn test_underperforming_routes_in_fixture() {
    let dataset = Dataset::load(FIXTURE, 2018, 2023).unwrap();
    let analysis = summarize_for_carrier(&dataset.records, "UA").unwrap();
    let flagged = identify_underperforming(&analysis.summaries, &Thresholds::default());

    let routes: Vec<&str> = flagged.iter().map(|r| r.route.as_str()).collect();
    assert_eq!(routes, vec!["IAD-BOS", "SFO-EWR"]);

    let sfo = &flagged[1];
    assert!(approx(sfo.rev_first.unwrap(), 90000.0));
    assert!(approx(sfo.rev_last.unwrap(), 64800.0));
    assert!(approx(sfo.rev_change, -25200.0));
    assert!(approx(sfo.rev_change_pct.unwrap(), -0.28));
}

#[test]
fn test_full_run_writes_outputs() {
    let out = scratch_dir("route_fare_analyzer_it_full_run");
    let config = AnalysisConfig {
        data_path: PathBuf::from(FIXTURE),
        output_dir: out.clone(),
        ..Default::default()
    };

    let outcome = pipeline::run(&config).expect("run failed");

    assert!(config.route_summary_path().exists());
    assert!(config.underperforming_path().exists());
    assert!(config.run_report_path().exists());
    assert_eq!(outcome.underperforming.len(), 2);

    let back = read_route_summary(&config.route_summary_path()).unwrap();
    assert_eq!(back.len(), outcome.summaries.len());
    for (written, read) in outcome.summaries.iter().zip(&back) {
        assert_eq!(written.route, read.route);
        assert_eq!(written.years_active, read.years_active);
        assert!(approx(
            written.avg_annual_our_revenue.unwrap(),
            read.avg_annual_our_revenue.unwrap()
        ));
        assert!(approx(written.rev_change.unwrap(), read.rev_change.unwrap()));
    }

    let report = fs::read_to_string(config.run_report_path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(json["carrier"], "UA");
    assert_eq!(json["routes"], 4);
    assert!(json["caveat"].as_str().unwrap().contains("estimates"));

    fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_unknown_carrier_writes_nothing() {
    let out = scratch_dir("route_fare_analyzer_it_no_data");
    let config = AnalysisConfig {
        data_path: PathBuf::from(FIXTURE),
        carrier: "ZZ".to_string(),
        output_dir: out.clone(),
        ..Default::default()
    };

    let err = pipeline::run(&config).unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::NoData { carrier }) => assert_eq!(carrier, "ZZ"),
        other => panic!("expected no data error, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_missing_column_is_schema_error() {
    let dir = scratch_dir("route_fare_analyzer_it_schema");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("no_carrier.csv");
    fs::write(
        &path,
        "Year,quarter,airport_1,airport_2,passengers,fare,large_ms\n2020,1,A,B,1,1,50\n",
    )
    .unwrap();

    let err = Dataset::load(&path, 2018, 2023).unwrap_err();
    match err {
        AnalysisError::Schema { column } => assert_eq!(column, "carrier_lg"),
        other => panic!("expected schema error, got {other:?}"),
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_gzip_input_matches_plain() {
    let dir = scratch_dir("route_fare_analyzer_it_gzip");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sample_routes.csv.gz");

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&fs::read(FIXTURE).unwrap()).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();

    let plain = Dataset::load(FIXTURE, 2018, 2023).unwrap();
    let gz = Dataset::load(&path, 2018, 2023).unwrap();
    assert_eq!(plain.records, gz.records);

    fs::remove_dir_all(&dir).unwrap();
}
