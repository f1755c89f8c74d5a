/// Lending Metrics Tool
///
/// Reads a JSON array of raw protocol records, assembles normalized lending
/// metrics for each one, and prints the result table to stdout. Records that
/// cannot be assembled are logged and counted; they never stop the run.
///
/// Usage: cargo run --bin tool_lending_metrics -- --input <RECORDS_JSON> [--config <CONFIG_TOML>]

use anyhow::{ Context, Result };
use clap::{ Arg, ArgAction, Command };
use lendmetrics::arguments::set_cmd_args;
use lendmetrics::config::{ load_config_from_path, Config, CONFIG_FILE_PATH };
use lendmetrics::logger::{ self, LogTag };
use lendmetrics::metrics::{
    process_batch_with,
    to_rows,
    AdapterRegistry,
    MetricAssembler,
    MetricRow,
    RawRecord,
    COLUMNS,
};
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    set_cmd_args(std::env::args().collect());
    logger::init();

    let matches = Command::new("Lending Metrics")
        .version("1.0")
        .about("Normalize lending-market snapshots into TVL, utilization, APY and collateral ratios")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("RECORDS_JSON")
                .help("JSON file holding an array of raw records")
                .required(true)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG_TOML")
                .help("Configuration file (defaults apply when absent)")
                .default_value(CONFIG_FILE_PATH)
        )
        .arg(
            Arg::new("table")
                .long("table")
                .help("Print tab-separated columns instead of JSON")
                .action(ArgAction::SetTrue)
        )
        .arg(debug_flag("debug-metrics", "Debug metric assembly"))
        .arg(debug_flag("debug-registry", "Debug adapter registration"))
        .arg(debug_flag("debug-batch", "Debug batch processing"))
        .arg(debug_flag("debug-config", "Debug configuration loading"))
        .arg(debug_flag("verbose", "Verbose output for every module"))
        .arg(debug_flag("quiet", "Only show warnings and errors"))
        .arg(debug_flag("no-color", "Disable colored log output"))
        .get_matches();

    let input = matches.get_one::<String>("input").cloned().unwrap_or_default();
    let config_path = matches
        .get_one::<String>("config")
        .cloned()
        .unwrap_or_else(|| CONFIG_FILE_PATH.to_string());
    let table = matches.get_flag("table");

    if let Err(e) = run(Path::new(&input), Path::new(&config_path), table) {
        logger::error(LogTag::System, &format!("{:#}", e));
        process::exit(1);
    }
}

fn debug_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::SetTrue)
}

fn run(input: &Path, config_path: &Path, table: bool) -> Result<()> {
    let config: Config = load_config_from_path(config_path).with_context(||
        format!("Failed to load configuration from {}", config_path.display())
    )?;

    let contents = std::fs
        ::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let records: Vec<RawRecord> = serde_json
        ::from_str(&contents)
        .with_context(|| format!("Failed to parse raw records from {}", input.display()))?;

    logger::info(
        LogTag::System,
        &format!("Loaded {} raw records from {}", records.len(), input.display())
    );

    let registry = Arc::new(AdapterRegistry::with_builtin_adapters(&config.metrics));
    logger::debug(
        LogTag::Registry,
        &format!("Adapters: {}", registry.protocols().join(", "))
    );

    let assembler = MetricAssembler::new(registry, config.metrics.clone());
    let report = process_batch_with(&assembler, &records, &config.batch);

    for failure in &report.failures {
        logger::warning(LogTag::Metrics, &format!("Skipped {}", failure));
    }

    let rows = to_rows(&report.records, &config.output);
    if table {
        print_table(&rows);
    } else {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize rows")?;
        println!("{}", json);
    }

    Ok(())
}

fn print_table(rows: &[MetricRow]) {
    println!("{}", COLUMNS.join("\t"));
    for row in rows {
        println!("{}", row.values().join("\t"));
    }
}
