use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use super::CLEANED_DATA_FILE;
use crate::dataset::Dataset;
use crate::Result;

#[derive(Debug, Clone)]
pub struct InferencePrepOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferencePrepReport {
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub rows_remaining: usize,
    pub columns: Vec<String>,
    /// Columns with at least one missing value, with their counts
    pub missing: Vec<(String, usize)>,
    pub cleaned_file: PathBuf,
}

/// Validate raw inference data and write a copy without incomplete rows
pub fn run(options: &InferencePrepOptions) -> Result<InferencePrepReport> {
    info!(path = %options.input.display(), "loading inference data");
    let mut dataset = Dataset::from_csv_path(&options.input)?;
    let rows_loaded = dataset.len();

    let missing: Vec<(String, usize)> = dataset
        .missing_counts()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();

    let rows_dropped = if missing.is_empty() {
        info!("no missing values found");
        0
    } else {
        for (column, count) in &missing {
            warn!(column = %column, count, "missing values found");
        }
        dataset.drop_missing()
    };

    fs::create_dir_all(&options.output_dir)?;
    let cleaned_file = options.output_dir.join(CLEANED_DATA_FILE);
    dataset.write_csv(&cleaned_file, true)?;
    info!(
        path = %cleaned_file.display(),
        rows = dataset.len(),
        columns = dataset.num_columns(),
        "cleaned data saved"
    );

    Ok(InferencePrepReport {
        rows_loaded,
        rows_dropped,
        rows_remaining: dataset.len(),
        columns: dataset.columns.clone(),
        missing,
        cleaned_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::PipelineError;

    #[test]
    fn test_inference_prep_drops_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        fs::write(&input, "a,b\n1,2\n,3\n4,null\n5,6\n").unwrap();

        let report = run(&InferencePrepOptions {
            input,
            output_dir: dir.path().join("clean"),
        })
        .unwrap();

        assert_eq!(report.rows_loaded, 4);
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(
            report.missing,
            vec![("a".to_string(), 1), ("b".to_string(), 1)]
        );

        let cleaned = Dataset::from_csv_path(&report.cleaned_file).unwrap();
        assert_eq!(cleaned.rows, vec![vec!["1", "2"], vec!["5", "6"]]);
    }

    #[test]
    fn test_inference_prep_clean_input_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        fs::write(&input, "a,b\n1,2\n3,4\n").unwrap();

        let report = run(&InferencePrepOptions {
            input,
            output_dir: dir.path().join("clean"),
        })
        .unwrap();
        assert_eq!(report.rows_dropped, 0);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_inference_prep_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        fs::write(&input, "").unwrap();
        let out = dir.path().join("clean");

        let result = run(&InferencePrepOptions {
            input,
            output_dir: out.clone(),
        });
        assert!(matches!(result, Err(PipelineError::EmptyInput(_))));
        assert!(!out.exists());
    }
}
