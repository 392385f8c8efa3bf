pub mod classify;
pub mod vertices;

use crate::candidates::{self, CandidateRecord};
use crate::cli::HullArgs;
use crate::config::{AppConfig, PartialHullConfig};
use crate::error::{CliError, Result};
use phasehull::engine::diagram::PhaseDiagram;
use phasehull::workflows::binding::{Candidate, StructureHull};
use tracing::{info, warn};

/// Resolves the configuration and places every candidate of the input file on a hull.
fn load_hull(args: &HullArgs) -> Result<StructureHull<CandidateRecord>> {
    let AppConfig { hull, score_column } = PartialHullConfig::resolve(args)?;
    info!(
        endpoints = hull.endpoints.len(),
        filter_vertical_facets = hull.filter_vertical_facets,
        "Hull configuration resolved."
    );

    let records = candidates::read_candidates(&args.input, &score_column)?;
    if records.is_empty() {
        return Err(CliError::Argument(format!(
            "No candidates found in '{}'",
            args.input.display()
        )));
    }

    let mut structures = StructureHull::new(&hull)?;
    for record in records {
        let label = record.label().to_string();
        let formula = record.composition().to_string();
        if let Err(rejection) = structures.insert(record) {
            warn!(%label, %formula, "Candidate is not a hull candidate: {}", rejection);
        }
    }
    Ok(structures)
}

/// Comma-separated formulas of the endpoints that still lack a chemical potential.
fn missing_endpoints(diagram: &PhaseDiagram) -> String {
    diagram
        .missing_potentials()
        .map(|endpoint| endpoint.formula().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
