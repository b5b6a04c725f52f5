use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};

use crate::utils::{parse_cell, PipelineError};
use crate::Result;

/// Cell values treated as missing, matching the usual dataframe NA tokens
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>",
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

/// Check whether a raw cell counts as a missing value
///
/// Matching is exact: a whitespace-only cell or a padded token such as
/// `" NA"` is a value, not a missing marker.
pub fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// An ordered table of string cells loaded from CSV
///
/// Column order is the header order and cells are kept verbatim, so a
/// dataset written back out matches what was read apart from dropped rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Create a new empty dataset with the given header
    pub fn new(name: String, columns: Vec<String>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the header
    pub fn add_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::ValidationError(format!(
                "row has {} fields, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in header order
    pub fn get_field_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Load dataset from headered CSV text
    pub fn from_csv(name: String, csv_data: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut dataset = Dataset::new(name, headers);

        for result in reader.records() {
            let record = result?;
            dataset.add_row(record.iter().map(str::to_string).collect())?;
        }

        Ok(dataset)
    }

    /// Load dataset from a CSV file, named after the file stem
    ///
    /// A missing file yields `MissingInput`; a zero-byte file or one without
    /// a header yields `EmptyInput`.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Err(PipelineError::EmptyInput(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());

        let dataset = Self::from_csv(name, &content)?;
        if dataset.columns.is_empty() {
            return Err(PipelineError::EmptyInput(path.to_path_buf()));
        }
        Ok(dataset)
    }

    /// Write the dataset as CSV, optionally with its header line
    pub fn write_csv(&self, path: &Path, with_header: bool) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if with_header {
            writer.write_record(&self.columns)?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Number of missing cells per column, in header order
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let count = self.rows.iter().filter(|row| is_missing(&row[idx])).count();
                (column.clone(), count)
            })
            .collect()
    }

    /// Drop every row holding at least one missing cell, returning how many were removed
    pub fn drop_missing(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|cell| is_missing(cell)));
        before - self.rows.len()
    }

    /// Build a new dataset from the given row indices, in that order
    pub fn select_rows(&self, indices: &[usize]) -> Result<Dataset> {
        let mut selected = Dataset::new(self.name.clone(), self.columns.clone());
        for &idx in indices {
            let row = self.rows.get(idx).ok_or_else(|| {
                PipelineError::ValidationError(format!(
                    "row index {} out of range for {} rows",
                    idx,
                    self.rows.len()
                ))
            })?;
            selected.rows.push(row.clone());
        }
        Ok(selected)
    }

    /// Build a new dataset holding only the named columns, in the given order
    pub fn select_columns(&self, names: &[String]) -> Result<Dataset> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| {
                    PipelineError::ValidationError(format!(
                        "column '{}' not found in dataset '{}'",
                        name, self.name
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut selected = Dataset::new(self.name.clone(), names.to_vec());
        for row in &self.rows {
            selected
                .rows
                .push(indices.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(selected)
    }

    /// Split into (features, target) using the last column as target
    pub fn split_target(&self) -> Result<(Dataset, Dataset)> {
        if self.columns.len() < 2 {
            return Err(PipelineError::ValidationError(format!(
                "expected at least 2 columns, got {}",
                self.columns.len()
            )));
        }

        let last = self.columns.len() - 1;
        let mut features = Dataset::new(self.name.clone(), self.columns[..last].to_vec());
        let mut target = Dataset::new(self.name.clone(), vec![self.columns[last].clone()]);

        for row in &self.rows {
            features.rows.push(row[..last].to_vec());
            target.rows.push(vec![row[last].clone()]);
        }

        Ok((features, target))
    }

    /// Parse every cell into a numeric matrix (rows=samples, cols=columns)
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let mut flat = Vec::with_capacity(self.rows.len() * self.columns.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                flat.push(parse_cell(cell, &self.columns[col_idx], row_idx + 1)?);
            }
        }

        Array2::from_shape_vec((self.rows.len(), self.columns.len()), flat).map_err(|e| {
            PipelineError::ValidationError(format!("failed to create feature matrix: {}", e))
        })
    }

    /// Return a copy with one numeric column appended
    pub fn with_column(&self, name: &str, values: &[f64]) -> Result<Dataset> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::ValidationError(format!(
                "column '{}' has {} values, dataset has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let mut columns = self.columns.clone();
        columns.push(name.to_string());
        let mut extended = Dataset::new(self.name.clone(), columns);
        for (row, value) in self.rows.iter().zip(values) {
            let mut row = row.clone();
            row.push(value.to_string());
            extended.rows.push(row);
        }
        Ok(extended)
    }

    /// Render the first `n` rows as an aligned text table
    pub fn preview(&self, n: usize) -> String {
        let shown = &self.rows[..n.min(self.rows.len())];
        let index_width = shown.len().saturating_sub(1).to_string().len();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                shown
                    .iter()
                    .map(|row| row[idx].len())
                    .chain(std::iter::once(column.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (column, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", column, width = width));
        }
        for (idx, row) in shown.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{:<width$}", idx, width = index_width));
            for (cell, width) in row.iter().zip(&widths) {
                out.push_str(&format!("  {:>width$}", cell, width = width));
            }
        }
        out
    }
}

/// Read a headerless single-column numeric file (the prepared target files)
pub fn read_target_csv(path: &Path) -> Result<Array1<f64>> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(PipelineError::EmptyInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(content.as_bytes());

    let mut values = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let cell = record.get(0).unwrap_or("");
        values.push(parse_cell(cell, "target", idx + 1)?);
    }

    Ok(Array1::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_sample_dataset() -> Dataset {
        let csv_data = "sqft,rooms,price\n1000,2,200\n1500,3,\n2000,4,400\nNA,1,100";
        Dataset::from_csv("houses".to_string(), csv_data).unwrap()
    }

    #[test]
    fn test_csv_loading_preserves_column_order() {
        let dataset = create_sample_dataset();

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.get_field_names(), &["sqft", "rooms", "price"]);
        assert_eq!(dataset.rows[0], vec!["1000", "2", "200"]);
        assert_eq!(dataset.column_index("price"), Some(2));
    }

    #[test]
    fn test_ragged_csv_is_rejected() {
        let result = Dataset::from_csv("bad".to_string(), "a,b\n1,2\n3");
        assert!(result.is_err());
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("NaN"));
        assert!(is_missing("null"));
        assert!(!is_missing("0"));
        assert!(!is_missing("none"));
    }

    #[test]
    fn test_whitespace_cells_are_not_missing() {
        assert!(!is_missing("  "));
        assert!(!is_missing(" NA"));

        let mut dataset = Dataset::from_csv("padded".to_string(), "a,b\n1,  \n2,3\n").unwrap();
        assert_eq!(dataset.missing_counts()[1], ("b".to_string(), 0));
        assert_eq!(dataset.drop_missing(), 0);
        assert!(dataset.to_matrix().is_err());
    }

    #[test]
    fn test_missing_counts_and_drop() {
        let mut dataset = create_sample_dataset();
        let counts = dataset.missing_counts();
        assert_eq!(
            counts,
            vec![
                ("sqft".to_string(), 1),
                ("rooms".to_string(), 0),
                ("price".to_string(), 1)
            ]
        );

        let dropped = dataset.drop_missing();
        assert_eq!(dropped, 2);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_split_target_uses_last_column() {
        let mut dataset = create_sample_dataset();
        dataset.drop_missing();
        let (features, target) = dataset.split_target().unwrap();

        assert_eq!(features.get_field_names(), &["sqft", "rooms"]);
        assert_eq!(target.get_field_names(), &["price"]);
        assert_eq!(features.len(), target.len());
        assert_eq!(target.rows[1], vec!["400"]);
    }

    #[test]
    fn test_split_target_requires_two_columns() {
        let dataset = Dataset::from_csv("one".to_string(), "a\n1\n2").unwrap();
        let err = dataset.split_target().unwrap_err();
        assert!(err.to_string().contains("at least 2 columns"));
    }

    #[test]
    fn test_to_matrix() {
        let mut dataset = create_sample_dataset();
        dataset.drop_missing();
        let matrix = dataset.to_matrix().unwrap();

        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[1, 0]], 2000.0);
        assert_eq!(matrix[[1, 2]], 400.0);
    }

    #[test]
    fn test_to_matrix_reports_non_numeric_cell() {
        let dataset = Dataset::from_csv("t".to_string(), "a,b\n1,x").unwrap();
        let err = dataset.to_matrix().unwrap_err();
        assert!(err.to_string().contains("column 'b' row 1"));
    }

    #[test]
    fn test_select_rows_and_columns() {
        let dataset = create_sample_dataset();
        let picked = dataset.select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.rows[0][0], "2000");
        assert_eq!(picked.rows[1][0], "1000");
        assert!(dataset.select_rows(&[10]).is_err());

        let cols = dataset
            .select_columns(&["price".to_string(), "sqft".to_string()])
            .unwrap();
        assert_eq!(cols.rows[0], vec!["200", "1000"]);
        assert!(dataset.select_columns(&["missing".to_string()]).is_err());
    }

    #[test]
    fn test_with_column() {
        let dataset = Dataset::from_csv("t".to_string(), "a\n1\n2").unwrap();
        let extended = dataset.with_column("prediction", &[1.5, 2.5]).unwrap();
        assert_eq!(extended.get_field_names(), &["a", "prediction"]);
        assert_eq!(extended.rows[1], vec!["2", "2.5"]);
        assert!(dataset.with_column("p", &[1.0]).is_err());
    }

    #[test]
    fn test_preview_limits_rows() {
        let dataset = create_sample_dataset();
        let text = dataset.preview(2);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().contains("price"));
    }

    #[test]
    fn test_file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let dataset = create_sample_dataset();
        dataset.write_csv(&path, true).unwrap();
        let loaded = Dataset::from_csv_path(&path).unwrap();
        assert_eq!(loaded.rows, dataset.rows);
        assert_eq!(loaded.name, "data");

        let missing = Dataset::from_csv_path(&dir.path().join("nope.csv"));
        assert!(matches!(missing, Err(PipelineError::MissingInput(_))));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            Dataset::from_csv_path(&path),
            Err(PipelineError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_read_target_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("y.csv");
        fs::write(&path, "1.5\n2\n-3\n").unwrap();

        let target = read_target_csv(&path).unwrap();
        assert_eq!(target.to_vec(), vec![1.5, 2.0, -3.0]);
    }
}
