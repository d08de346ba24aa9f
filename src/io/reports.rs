//! Report rendering for segmentation results.

use serde::{Deserialize, Serialize};
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::api::results::SegmentationReport;
use crate::core::errors::Result;
use crate::core::segmentation::SegmentedGroup;

/// Output format for segmentation reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
    /// Human-readable text table
    Table,
}

impl ReportFormat {
    /// Lowercase format name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Table => "table",
        }
    }
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Slicer")]
    label: String,
    #[tabled(rename = "n")]
    total: u64,
    #[tabled(rename = "NPS")]
    nps: String,
    #[tabled(rename = "LCL")]
    lcl: String,
    #[tabled(rename = "UCL")]
    ucl: String,
    #[tabled(rename = "Series")]
    series: String,
}

impl From<&SegmentedGroup> for GroupRow {
    fn from(group: &SegmentedGroup) -> Self {
        Self {
            label: group.label.clone(),
            total: group.total,
            nps: format_score(group.nps),
            lcl: format_score(group.lcl),
            ucl: format_score(group.ucl),
            series: group
                .series
                .map_or_else(|| "Insufficient".to_string(), |s| s.to_string()),
        }
    }
}

fn format_score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:+.3}"))
}

/// Render a report in the requested format.
pub fn render_report(report: &SegmentationReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        ReportFormat::Table => Ok(render_table(report)),
    }
}

fn render_table(report: &SegmentationReport) -> String {
    let population = &report.population;
    let mut out = format!(
        "Population: n={} nps={} stddev={} stderr={}\n",
        population.total(),
        format_score(population.nps()),
        population
            .stddev()
            .map_or_else(|| "-".to_string(), |v| format!("{v:.3}")),
        population
            .stderr()
            .map_or_else(|| "-".to_string(), |v| format!("{v:.4}")),
    );

    let rows: Vec<GroupRow> = report.segmentation.groups.iter().map(GroupRow::from).collect();
    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    out.push_str(&table.to_string());
    out.push('\n');

    for warning in &report.warnings {
        out.push_str("warning: ");
        out.push_str(warning);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rows::SurveyRow;
    use crate::core::config::NpsConfig;
    use crate::NpsEngine;

    fn report() -> SegmentationReport {
        let engine = NpsEngine::new(NpsConfig::default()).unwrap();
        engine.segment_rows(&[
            SurveyRow::new("north", 14, 2, 0),
            SurveyRow::new("empty", 0, 0, 0),
            SurveyRow::new("rest", 46, 18, 20),
        ])
    }

    #[test]
    fn test_json_report_has_population_and_groups() {
        let rendered = render_report(&report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["population"]["total"], 100);
        assert_eq!(value["segmentation"]["groups"][0]["label"], "north");
        assert_eq!(value["segmentation"]["insufficient"][0], "empty");
        assert!(value["segmentation"]["groups"][1]["nps"].is_null());
    }

    #[test]
    fn test_yaml_report_parses_back() {
        let rendered = render_report(&report(), ReportFormat::Yaml).unwrap();
        let parsed: SegmentationReport = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed.population.total(), 100);
        assert_eq!(parsed.segmentation.groups.len(), 3);
    }

    #[test]
    fn test_table_report_lists_every_group() {
        let rendered = render_report(&report(), ReportFormat::Table).unwrap();

        assert!(rendered.starts_with("Population: n=100 nps=+0.400"));
        assert!(rendered.contains("Slicer"));
        assert!(rendered.contains("north"));
        assert!(rendered.contains("Outperform"));
        assert!(rendered.contains("Insufficient"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ReportFormat::Table.as_str(), "table");
        let parsed: ReportFormat = serde_yaml::from_str("yaml").unwrap();
        assert_eq!(parsed, ReportFormat::Yaml);
    }
}
