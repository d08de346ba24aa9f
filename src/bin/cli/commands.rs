//! Command execution for the `nps` binary.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::info;

use crate::cli::args::{ControlLimitArgs, ScoreArgs, SegmentArgs, ValidateConfigArgs};
use crate::cli::config_layer::{build_layered_config, load_configuration};
use nps_stats::io::csv_rows::read_rows_from_path;
use nps_stats::{render_report, NpsConfig, NpsEngine, Response};

/// Segment a CSV of per-slicer counts and render the report
pub fn segment_command(args: SegmentArgs) -> anyhow::Result<()> {
    let config = build_layered_config(args.config.as_deref(), &args.limits)?;
    let engine = NpsEngine::new(config)?;

    let batch = read_rows_from_path(&args.csv, &engine.config().csv)?;
    for rejection in &batch.rejected {
        let location = rejection
            .line
            .map_or_else(String::new, |line| format!(" (line {line})"));
        eprintln!(
            "{}{} {}",
            "⚠️  Skipped row".yellow(),
            location,
            rejection.message
        );
    }

    let report = engine.segment_batch(&batch);
    if report.has_insufficient() {
        eprintln!(
            "{} {}",
            "⚠️  Not enough responses to classify:".yellow(),
            report.segmentation.insufficient.join(", ")
        );
    }
    let rendered = render_report(&report, args.format.into())?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!(
                "{} {}",
                "✅ Report written to:".bright_green().bold(),
                path.display().to_string().cyan()
            );
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }

    info!(
        groups = report.group_count(),
        rejected = batch.rejected.len(),
        "Segment command finished"
    );
    Ok(())
}

/// Score raw ratings or JSON input and print the statistics as JSON
pub fn score_command(args: ScoreArgs) -> anyhow::Result<()> {
    let config = build_layered_config(args.config.as_deref(), &ControlLimitArgs::default())?;
    let engine = NpsEngine::new(config)?;

    let stats = match &args.json {
        Some(path) => engine.score_json(&read_json_input(path)?),
        None => {
            let responses: Vec<Response> =
                args.ratings.iter().copied().map(Response::Rating).collect();
            engine.score_responses(&responses)
        }
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn read_json_input(path: &Path) -> anyhow::Result<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read JSON from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON input: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Input is not valid JSON")
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("# Default nps configuration");
    println!("# Save this to .nps.yml or pass it with --config");
    println!();

    let yaml_output = serde_yaml::to_string(&NpsConfig::default())?;
    print!("{yaml_output}");

    Ok(())
}

/// Validate a configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        args.config.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(&args.config) {
        Ok(config) => {
            println!("{}", "✅ Configuration file is valid!".bright_green().bold());
            println!();
            config
        }
        Err(e) => {
            eprintln!("{} {:#}", "❌ Configuration validation failed:".red(), e);
            println!();
            println!("{}", "🔧 Common issues:".bright_blue().bold());
            println!("   • Check YAML syntax (indentation, colons, quotes)");
            println!("   • Field names must not be blank");
            println!("   • z_value must be a positive number");
            println!();
            println!(
                "{}",
                "💡 Tip: Use 'nps print-default-config' to see valid format".dimmed()
            );
            std::process::exit(1);
        }
    };

    display_config_summary(&config);
    Ok(())
}

fn display_config_summary(config: &NpsConfig) {
    #[derive(Tabled)]
    struct SettingRow {
        setting: String,
        value: String,
    }

    let rows = vec![
        SettingRow {
            setting: "fields.promoters".to_string(),
            value: config.fields.promoters.clone(),
        },
        SettingRow {
            setting: "fields.neutrals".to_string(),
            value: config.fields.neutrals.clone(),
        },
        SettingRow {
            setting: "fields.detractors".to_string(),
            value: config.fields.detractors.clone(),
        },
        SettingRow {
            setting: "fields.nps".to_string(),
            value: config.fields.nps.clone(),
        },
        SettingRow {
            setting: "csv.label_fields".to_string(),
            value: config.csv.label_fields.join(", "),
        },
        SettingRow {
            setting: "csv.total_field".to_string(),
            value: config.csv.total_field.clone(),
        },
        SettingRow {
            setting: "segmentation.z_value".to_string(),
            value: format!("{}", config.segmentation.z_value),
        },
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
}
