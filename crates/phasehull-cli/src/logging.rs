use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level_filter = level_for(verbosity, quiet);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(path).map_err(CliError::Io)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true);

        subscriber.with(file_layer).try_init().map_err(|e| CliError::Other(e.into()))?;
    } else {
        subscriber.try_init().map_err(|e| CliError::Other(e.into()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, info};

    static GLOBAL: Once = Once::new();

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(3, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn second_global_subscriber_is_refused() {
        GLOBAL.call_once(|| setup_logging(2, false, None).unwrap());
        debug!(entries = 3, "Global subscriber active.");

        let again = setup_logging(0, false, None);
        assert!(matches!(again, Err(CliError::Other(_))));
    }

    #[test]
    #[serial]
    fn file_layer_records_structured_fields() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("hull.log");

        let file = File::create(&log_path).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_ansi(false));
        tracing::subscriber::with_default(subscriber, || {
            info!(points = 4, flat = false, "Phase hull built.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Phase hull built."));
        assert!(content.contains("points=4"));
        assert!(content.contains("flat=false"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(dir.path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
