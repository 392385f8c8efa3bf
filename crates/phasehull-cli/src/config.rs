use crate::cli::HullArgs;
use crate::error::{CliError, Result};
use phasehull::core::models::composition::Composition;
use phasehull::engine::config::{HullConfig, HullConfigBuilder};
use phasehull::engine::error::HullError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_SCORE_COLUMN: &str = "score";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub hull: HullConfig,
    pub score_column: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialHullConfig {
    endpoints: Option<Vec<String>>,
    filter_vertical_facets: Option<bool>,
    score_property: Option<String>,
}

impl PartialHullConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `args`, if any, and applies the command-line overrides.
    pub fn resolve(args: &HullArgs) -> Result<AppConfig> {
        let file = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        file.merge_with_cli(args)
    }

    pub fn merge_with_cli(self, args: &HullArgs) -> Result<AppConfig> {
        let mut builder = HullConfigBuilder::new();

        if let Some(formulas) = args.endpoints.as_ref().or(self.endpoints.as_ref()) {
            let endpoints = formulas
                .iter()
                .map(|formula| {
                    formula.trim().parse::<Composition>().map_err(|e| {
                        CliError::Config(format!("Invalid endpoint formula '{}': {}", formula, e))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            builder = builder.endpoints(endpoints);
        }

        let filter_vertical_facets = if args.no_vertical_filter {
            false
        } else {
            self.filter_vertical_facets.unwrap_or(true)
        };
        builder = builder.filter_vertical_facets(filter_vertical_facets);

        let hull = builder.build().map_err(HullError::from)?;

        let score_column = args
            .score_column
            .clone()
            .or(self.score_property)
            .unwrap_or_else(|| DEFAULT_SCORE_COLUMN.to_string());

        Ok(AppConfig { hull, score_column })
    }
}
