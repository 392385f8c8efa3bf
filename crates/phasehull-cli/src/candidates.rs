use crate::error::{CliError, Result};
use phasehull::core::models::composition::Composition;
use phasehull::workflows::binding::{
    Candidate, FORMATION_ENERGY_PROPERTY, HULL_DISTANCE_PROPERTY, PropertyValue,
    STABILITY_PROPERTY,
};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

const LABEL_COLUMN: &str = "label";
const FORMULA_COLUMN: &str = "formula";

/// One row of the candidates file.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    label: String,
    formula: String,
    composition: Composition,
    score: Option<f64>,
    properties: BTreeMap<String, PropertyValue>,
}

impl CandidateRecord {
    pub fn new(label: String, formula: String, score: Option<f64>) -> Self {
        // An unparsable formula becomes the empty composition, which the hull rejects.
        let composition = formula.parse().unwrap_or_else(|e| {
            warn!(%label, %formula, error = %e, "Unparsable formula; candidate will be rejected.");
            Composition::new()
        });
        Self {
            label,
            formula,
            composition,
            score,
            properties: BTreeMap::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.properties.get(name).copied()
    }
}

impl Candidate for CandidateRecord {
    fn composition(&self) -> &Composition {
        &self.composition
    }

    fn score(&self) -> Option<f64> {
        self.score
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value);
    }
}

/// Reads `label,formula,<score column>` rows. Extra columns are ignored and an empty score
/// cell means the candidate has no score.
pub fn read_candidates(path: &Path, score_column: &str) -> Result<Vec<CandidateRecord>> {
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| parse_error(e.into()))?;
    let headers = reader.headers().map_err(|e| parse_error(e.into()))?;
    for required in [LABEL_COLUMN, FORMULA_COLUMN, score_column] {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(parse_error(anyhow::anyhow!(
                "missing required column '{}'",
                required
            )));
        }
    }

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row = row.map_err(|e| parse_error(e.into()))?;
        let row: HashMap<&str, &str> = row
            .iter()
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let field = |name: &str| row.get(name).copied().unwrap_or_default();
        let score = match field(score_column) {
            "" => None,
            text => Some(text.parse::<f64>().map_err(|e| {
                parse_error(anyhow::anyhow!(
                    "invalid {} '{}' on data row {}: {}",
                    score_column,
                    text,
                    line + 1,
                    e
                ))
            })?),
        };

        records.push(CandidateRecord::new(
            field(LABEL_COLUMN).to_string(),
            field(FORMULA_COLUMN).to_string(),
            score,
        ));
    }

    debug!("Read {} candidates from {:?}", records.len(), path);
    Ok(records)
}

fn format_property(record: &CandidateRecord, name: &str) -> String {
    match record.property(name) {
        Some(PropertyValue::Stability(stability)) => stability.to_string(),
        Some(PropertyValue::Float(value)) => value.to_string(),
        None => String::new(),
    }
}

/// Writes the classification table: label, formula, stability, formation energy and hull
/// distance. Values that were not determined are left empty.
pub fn write_classification<W: io::Write>(writer: W, records: &[CandidateRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record([
            LABEL_COLUMN,
            FORMULA_COLUMN,
            STABILITY_PROPERTY,
            FORMATION_ENERGY_PROPERTY,
            HULL_DISTANCE_PROPERTY,
        ])
        .map_err(|e| CliError::Other(e.into()))?;

    for record in records {
        writer
            .write_record([
                record.label().to_string(),
                record.formula().to_string(),
                format_property(record, STABILITY_PROPERTY),
                format_property(record, FORMATION_ENERGY_PROPERTY),
                format_property(record, HULL_DISTANCE_PROPERTY),
            ])
            .map_err(|e| CliError::Other(e.into()))?;
    }
    writer.flush()?;
    Ok(())
}
