//! InfluxDB Report Example
//!
//! Runs one reporting cycle against a live InfluxDB v2 instance.
//!
//! ## Setup
//!
//! ```bash
//! export GROWSENSE_INFLUX_URL=http://localhost:8086
//! export GROWSENSE_INFLUX_TOKEN=...
//! export GROWSENSE_INFLUX_ORG=home
//! export GROWSENSE_INFLUX_BUCKET=grow-room
//! ```
//!
//! Optionally point `GROWSENSE_THRESHOLDS` at a JSON file of threshold
//! overrides.
//!
//! ## Running the Example
//!
//! ```bash
//! RUST_LOG=debug cargo run --example 02_influx_report -- dht22 15 5
//! ```

use std::env;

use growsense_connectors::{run_cycle, CycleRequest, InfluxStore, StoreConfig};
use growsense_core::{SensorProfile, Thresholds};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let profile: SensorProfile = args.first().map(String::as_str).unwrap_or("dht22").parse()?;
    let start: u32 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(15);
    let stop: u32 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(5);

    let thresholds = match env::var("GROWSENSE_THRESHOLDS") {
        Ok(path) => Thresholds::load(path)?,
        Err(_) => Thresholds::default(),
    };

    let store = InfluxStore::new(StoreConfig::from_env()?)?;
    println!("GrowSense report: {} from {}", profile, store.config().bucket);
    println!("==========================================\n");

    let report = match run_cycle(&store, &CycleRequest::new(profile, start, stop), &thresholds) {
        Ok(report) => report,
        Err(err) if err.is_no_data() => {
            println!("No data for selected range");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if report.window_corrected {
        println!("(window reordered to {}d → {}d)\n", report.window.start(), report.window.stop());
    }

    println!("Latest values:");
    for (variable, value) in report.latest.iter() {
        println!("  {:<12} {:>8.2}", variable, value);
    }
    for (metric, value) in &report.derived {
        println!("  {:<12} {:>8.2}  (derived)", metric, value);
    }

    println!("\nAlerts:");
    for alert in &report.alerts {
        println!("  [{}] {}", alert.severity, alert.message);
    }

    println!("\nSummary:");
    println!(
        "  {:<12} {:>5} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "variable", "count", "mean", "std", "min", "p25", "p50", "p75"
    );
    for (variable, stats) in &report.summary {
        let std = stats.std.map_or_else(|| "-".to_string(), |s| format!("{:.2}", s));
        println!(
            "  {:<12} {:>5} {:>8.2} {:>8} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            variable, stats.count, stats.mean, std, stats.min, stats.p25, stats.p50, stats.p75
        );
    }

    let stats = growsense_connectors::Store::stats(&store);
    log::debug!("queries ok={} failed={} rows={}", stats.queries_ok, stats.queries_failed, stats.rows_received);

    Ok(())
}
