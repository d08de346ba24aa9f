//! CSV ingestion of per-slicer survey counts.
//!
//! Each CSV row describes one slicer: a label column plus promoter, passive
//! and detractor counts (and optionally a declared total). Header names are
//! configurable through [`CsvConfig`]; the defaults read the classic export
//! layout `slicer,promoters,passives,detractors,total`.
//!
//! A row that fails to parse is rejected on its own and reported; the rest
//! of the batch still loads.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::rows::SurveyRow;
use crate::core::config::validation::validate_field_name;
use crate::core::distribution::FieldMap;
use crate::core::errors::{NpsError, Result};

/// Header names and dialect used to read survey CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Candidate label columns; the first one present in the header wins
    #[serde(default = "CsvConfig::default_label_fields")]
    pub label_fields: Vec<String>,

    /// Column holding the declared row total
    #[serde(default = "CsvConfig::default_total_field")]
    pub total_field: String,

    /// Count columns
    #[serde(default = "CsvConfig::default_fields")]
    pub fields: FieldMap,

    /// Field delimiter
    #[serde(default = "CsvConfig::default_delimiter")]
    pub delimiter: char,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            label_fields: Self::default_label_fields(),
            total_field: Self::default_total_field(),
            fields: Self::default_fields(),
            delimiter: Self::default_delimiter(),
        }
    }
}

impl CsvConfig {
    fn default_label_fields() -> Vec<String> {
        vec!["slicer".to_string(), "label".to_string()]
    }

    fn default_total_field() -> String {
        "total".to_string()
    }

    fn default_fields() -> FieldMap {
        FieldMap::default().with_neutrals("passives")
    }

    const fn default_delimiter() -> char {
        ','
    }

    /// Validate CSV settings
    pub fn validate(&self) -> Result<()> {
        if self.label_fields.is_empty() {
            return Err(NpsError::validation_field(
                "csv.label_fields must name at least one column",
                "csv.label_fields",
            ));
        }
        for name in &self.label_fields {
            validate_field_name(name, "csv.label_fields")?;
        }
        validate_field_name(&self.total_field, "csv.total_field")?;
        self.fields.validate()?;

        if !self.delimiter.is_ascii() {
            return Err(NpsError::validation_field(
                format!("csv.delimiter must be an ASCII character, got '{}'", self.delimiter),
                "csv.delimiter",
            ));
        }
        Ok(())
    }
}

/// A row that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    /// Line number in the source, when known
    pub line: Option<u64>,
    /// Why the row was rejected
    pub message: String,
}

/// Rows loaded from one CSV source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBatch {
    /// Successfully parsed rows in source order
    pub rows: Vec<SurveyRow>,
    /// Rows skipped because they could not be parsed
    pub rejected: Vec<RowRejection>,
}

/// Header positions resolved once per file.
#[derive(Debug)]
struct Columns {
    label: usize,
    promoters: Option<usize>,
    passives: Option<usize>,
    detractors: Option<usize>,
    total: Option<usize>,
    names: [String; 4],
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, config: &CsvConfig) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let label = config
            .label_fields
            .iter()
            .find_map(|name| find(name))
            .ok_or_else(|| {
                NpsError::validation_field(
                    format!(
                        "CSV header has no label column (expected one of: {})",
                        config.label_fields.join(", ")
                    ),
                    "csv.label_fields",
                )
            })?;

        let fields = &config.fields;
        let columns = Self {
            label,
            promoters: find(&fields.promoters),
            passives: find(&fields.neutrals),
            detractors: find(&fields.detractors),
            total: find(&config.total_field),
            names: [
                fields.promoters.clone(),
                fields.neutrals.clone(),
                fields.detractors.clone(),
                config.total_field.clone(),
            ],
        };

        if columns.promoters.is_none() && columns.passives.is_none() && columns.detractors.is_none()
        {
            return Err(NpsError::validation_field(
                format!(
                    "CSV header has no count columns (expected any of: {}, {}, {})",
                    fields.promoters, fields.neutrals, fields.detractors
                ),
                "csv.fields",
            ));
        }

        Ok(columns)
    }

    fn parse(&self, record: &csv::StringRecord, line: Option<u64>) -> Result<SurveyRow> {
        let [promoters, passives, detractors, total] = &self.names;

        Ok(SurveyRow {
            label: record.get(self.label).unwrap_or_default().to_string(),
            promoters: count_cell(record, self.promoters, promoters, line)?.unwrap_or(0),
            passives: count_cell(record, self.passives, passives, line)?.unwrap_or(0),
            detractors: count_cell(record, self.detractors, detractors, line)?.unwrap_or(0),
            total: count_cell(record, self.total, total, line)?,
        })
    }
}

/// Parse a count cell. Empty and absent cells yield `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_cell(
    record: &csv::StringRecord,
    column: Option<usize>,
    name: &str,
    line: Option<u64>,
) -> Result<Option<u64>> {
    let Some(cell) = column.and_then(|idx| record.get(idx)) else {
        return Ok(None);
    };
    if cell.is_empty() {
        return Ok(None);
    }

    let parsed = cell.parse::<u64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    });

    match parsed {
        Some(count) => Ok(Some(count)),
        None => {
            let message = format!("column '{name}' is not a non-negative count: '{cell}'");
            Err(match line {
                Some(line) => NpsError::parse_at_line(message, line),
                None => NpsError::parse(message),
            })
        }
    }
}

/// Read survey rows from any CSV source.
pub fn read_rows<R: Read>(reader: R, config: &CsvConfig) -> Result<RowBatch> {
    config.validate()?;
    let delimiter = u8::try_from(config.delimiter).map_err(|_| {
        NpsError::validation_field("csv.delimiter must be a single-byte character", "csv.delimiter")
    })?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = Columns::resolve(&headers, config)?;

    let mut batch = RowBatch::default();
    for result in csv_reader.records() {
        let parsed = result.map_err(NpsError::from).and_then(|record| {
            let line = record.position().map(csv::Position::line);
            columns.parse(&record, line)
        });

        match parsed {
            Ok(row) => batch.rows.push(row),
            Err(err) => {
                let line = match &err {
                    NpsError::Parse { line, .. } => *line,
                    _ => None,
                };
                warn!("Skipping malformed CSV row: {}", err);
                batch.rejected.push(RowRejection {
                    line,
                    message: err.to_string(),
                });
            }
        }
    }

    debug!(
        rows = batch.rows.len(),
        rejected = batch.rejected.len(),
        "Loaded survey rows"
    );
    Ok(batch)
}

/// Read survey rows from a CSV file.
pub fn read_rows_from_path(path: impl AsRef<Path>, config: &CsvConfig) -> Result<RowBatch> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        NpsError::io(format!("Failed to open survey file: {}", path.display()), e)
    })?;
    read_rows(file, config)
}
