//! Offline Report Example
//!
//! Runs one reporting cycle over rows held in memory, the way a connector
//! would after fetching them from the store.
//!
//! ## What You'll Learn
//!
//! - Resolving a day-offset window (and what happens when it's backwards)
//! - Building the query a store would receive
//! - Turning raw rows into a report with latest values, alerts and statistics
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_offline_report
//! ```

use growsense_core::{
    build, normalize, resolve, RawRow, Report, SensorProfile, Thresholds,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("GrowSense Offline Report Example");
    println!("================================\n");

    // Backwards on purpose: the resolver swaps it and flags the correction
    let resolution = resolve(2, 9);
    println!(
        "Window: {}d → {}d back (corrected: {})\n",
        resolution.window.start(),
        resolution.window.stop(),
        resolution.corrected
    );

    let query = build(SensorProfile::Environmental, resolution.window, "grow-room");
    println!("Query:\n{}\n", query.to_flux());

    // What the store might have answered, in two batches
    let batches = vec![
        vec![
            RawRow::new("2024-05-01T08:00:00Z", "temperature", 18.2),
            RawRow::new("2024-05-01T12:00:00Z", "temperature", 24.9),
            RawRow::new("2024-05-01T16:00:00Z", "temperature", 31.4),
        ],
        vec![
            RawRow::new("2024-05-01T08:00:00Z", "humidity", 62.0),
            RawRow::new("2024-05-01T12:00:00Z", "humidity", 48.5),
            RawRow::new("2024-05-01T16:00:00Z", "humidity", 37.0),
            RawRow::new("2024-05-01T16:00:00Z", "heat_index", 33.1),
        ],
    ];

    let table = normalize(batches)?;
    let report = Report::from_table(
        SensorProfile::Environmental,
        resolution,
        &table,
        &Thresholds::default(),
    )?;

    println!("Latest values:");
    for (variable, value) in report.latest.iter() {
        println!("  {:<12} {:>8.2}", variable, value);
    }

    println!("\nAlerts:");
    for alert in &report.alerts {
        println!("  [{}] {}", alert.severity, alert.message);
    }

    println!("\nSummary:");
    println!("  {:<12} {:>5} {:>8} {:>8} {:>8} {:>8}", "variable", "count", "mean", "std", "min", "max");
    for (variable, stats) in &report.summary {
        let std = stats.std.map_or_else(|| "-".to_string(), |s| format!("{:.2}", s));
        println!(
            "  {:<12} {:>5} {:>8.2} {:>8} {:>8.2} {:>8.2}",
            variable, stats.count, stats.mean, std, stats.min, stats.max
        );
    }

    Ok(())
}
