use super::{load_hull, missing_endpoints};
use crate::cli::HullArgs;
use crate::error::{CliError, Result};
use phasehull::core::geometry::exact;
use phasehull::engine::phase_hull::PhaseHull;
use std::collections::BTreeSet;
use std::io;
use tracing::info;

pub fn run(args: HullArgs) -> Result<()> {
    let mut structures = load_hull(&args)?;
    structures.refresh()?;

    let diagram = structures.diagram();
    let Some(view) = diagram.view() else {
        return Err(CliError::Argument(format!(
            "No hull can be built: no scored entry for endpoint(s) {}",
            missing_endpoints(diagram)
        )));
    };

    let hull = view.hull();
    info!(
        points = hull.points().len(),
        facets = hull.facets().len(),
        flat = hull.is_flat(),
        "Phase hull ready."
    );
    write_points(io::stdout().lock(), hull)
}

/// Writes one row per hull point: id, label, source, energy and whether it is a facet vertex.
pub fn write_points<W: io::Write>(writer: W, hull: &PhaseHull) -> Result<()> {
    let vertices: BTreeSet<_> = hull.vertices().map(|point| point.id()).collect();

    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(["id", "label", "source", "energy", "vertex"])
        .map_err(|e| CliError::Other(e.into()))?;
    for point in hull.points() {
        let energy = point
            .energy()
            .map(|energy| exact::to_f64(energy).to_string())
            .unwrap_or_default();
        writer
            .write_record([
                point.id().to_string(),
                point.label().to_string(),
                point.source().to_string(),
                energy,
                vertices.contains(&point.id()).to_string(),
            ])
            .map_err(|e| CliError::Other(e.into()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasehull::engine::config::HullConfigBuilder;
    use phasehull::engine::diagram::PhaseDiagram;

    fn hull_rows(filter: bool) -> Vec<String> {
        let config = HullConfigBuilder::new()
            .endpoints(vec!["A".parse().unwrap(), "B".parse().unwrap()])
            .filter_vertical_facets(filter)
            .build()
            .unwrap();
        let mut diagram = PhaseDiagram::new(&config).unwrap();
        for (formula, score) in [("A", 0.0), ("B", 0.0), ("AB", -5.0), ("A3B", -1.0)] {
            diagram.register(&formula.parse().unwrap(), Some(score)).unwrap();
        }
        assert!(diagram.refresh().unwrap());

        let mut buffer = Vec::new();
        write_points(&mut buffer, diagram.view().unwrap().hull()).unwrap();
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn points_above_the_lower_envelope_are_filtered_out() {
        assert_eq!(
            hull_rows(true),
            vec![
                "id,label,source,energy,vertex",
                "point#0,A,endpoint#0,0,true",
                "point#1,B,endpoint#1,0,true",
                "point#2,AB,entry#2,-2.5,true",
            ]
        );
    }

    #[test]
    fn unfiltered_hull_keeps_interior_points() {
        let rows = hull_rows(false);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4], "point#3,A3B,entry#3,-0.25,false");
    }

    #[test]
    fn missing_endpoint_potentials_are_named() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("candidates.csv");
        std::fs::write(&input, "label,formula,score\na,A,0\nab,AB,-5\n").unwrap();

        let result = run(HullArgs {
            input,
            config: None,
            endpoints: Some(vec!["A".to_string(), "B".to_string()]),
            score_column: None,
            no_vertical_filter: false,
        });
        let Err(CliError::Argument(message)) = result else {
            panic!("expected an argument error");
        };
        assert!(message.ends_with("endpoint(s) B"));
    }
}
