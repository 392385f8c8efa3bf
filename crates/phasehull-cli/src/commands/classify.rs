use super::{load_hull, missing_endpoints};
use crate::candidates;
use crate::cli::ClassifyArgs;
use crate::error::Result;
use std::fs::File;
use std::io::{self, BufWriter};
use tracing::{info, warn};

pub fn run(args: ClassifyArgs) -> Result<()> {
    let mut structures = load_hull(&args.hull)?;
    let summary = structures.populate_properties()?;

    if summary.indeterminate > 0 {
        warn!(
            "{} candidates could not be classified; no scored entry for endpoint(s): {}",
            summary.indeterminate,
            missing_endpoints(structures.diagram())
        );
    }

    let records = structures.into_candidates();
    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            candidates::write_classification(BufWriter::new(file), &records)?;
            info!("Classification written to {:?}", path);
        }
        None => candidates::write_classification(io::stdout().lock(), &records)?,
    }

    eprintln!(
        "{} stable, {} unstable, {} not hull candidates, {} indeterminate.",
        summary.stable, summary.unstable, summary.rejected, summary.indeterminate
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::HullArgs;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classification_is_written_to_the_output_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("candidates.csv");
        let output = dir.path().join("classified.csv");
        fs::write(
            &input,
            "label,formula,score\n\
             a,A,0\n\
             b,B,0\n\
             ab,AB,-5\n\
             a3b,A3B,-1\n\
             bad,AC,-1\n",
        )
        .unwrap();

        run(ClassifyArgs {
            hull: HullArgs {
                input,
                config: None,
                endpoints: Some(vec!["A".to_string(), "B".to_string()]),
                score_column: None,
                no_vertical_filter: false,
            },
            output: Some(output.clone()),
        })
        .unwrap();

        let text = fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "a,A,STABLE,0,0");
        assert_eq!(lines[3], "ab,AB,STABLE,-2.5,0");
        assert_eq!(lines[4], "a3b,A3B,UNSTABLE,-0.25,1");
        assert_eq!(lines[5], "bad,AC,NOT_A_HULL_CANDIDATE,,");
    }

    #[test]
    fn empty_input_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("candidates.csv");
        fs::write(&input, "label,formula,score\n").unwrap();

        let result = run(ClassifyArgs {
            hull: HullArgs {
                input,
                config: None,
                endpoints: Some(vec!["A".to_string(), "B".to_string()]),
                score_column: None,
                no_vertical_filter: false,
            },
            output: None,
        });
        assert!(matches!(result, Err(crate::error::CliError::Argument(_))));
    }
}
