//! Reference behaviour models.
//!
//! Each model file is a CSV whose first row holds the feature vector followed
//! by one trailing label column, which is dropped.

use std::path::Path;

use crate::error::{Result, TrustError};

/// Normal and abnormal reference feature vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceModels {
    /// Typical features of well-behaved subjects.
    pub normal: Vec<f64>,
    /// Typical features of misbehaving subjects.
    pub abnormal: Vec<f64>,
}

impl ReferenceModels {
    /// Build from in-memory vectors.
    pub fn new(normal: Vec<f64>, abnormal: Vec<f64>) -> Result<Self> {
        if normal.is_empty() {
            return Err(TrustError::EmptyModel("normal".into()));
        }
        if abnormal.len() != normal.len() {
            return Err(TrustError::DimensionMismatch {
                expected: normal.len(),
                actual: abnormal.len(),
            });
        }
        Ok(Self { normal, abnormal })
    }

    /// Load both models from CSV files.
    pub fn load(normal_path: impl AsRef<Path>, abnormal_path: impl AsRef<Path>) -> Result<Self> {
        Self::new(read_model(normal_path.as_ref())?, read_model(abnormal_path.as_ref())?)
    }

    /// Number of features.
    pub fn dimension(&self) -> usize {
        self.normal.len()
    }
}

fn load_error(path: &Path, reason: impl ToString) -> TrustError {
    TrustError::ModelLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Read the first row of `path`, dropping its last column.
pub fn read_model(path: &Path) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| load_error(path, e))?;

    let row = reader
        .records()
        .next()
        .ok_or_else(|| TrustError::EmptyModel(path.display().to_string()))?
        .map_err(|e| load_error(path, e))?;

    let feature_count = row.len().saturating_sub(1);
    row.iter()
        .take(feature_count)
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| load_error(path, format!("field {field:?}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("nt03-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_first_row_drops_label() {
        let path = write_temp("normal.csv", "0.5,1.5,2.5,normal\n9,9,9,other\n");
        assert_eq!(read_model(&path).unwrap(), vec![0.5, 1.5, 2.5]);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_critical() {
        let err = read_model(Path::new("/nonexistent/normal_model.csv")).unwrap_err();
        assert!(err.is_critical());
    }

    #[test]
    fn test_unparsable_field() {
        let path = write_temp("bad.csv", "0.5,abc,label\n");
        assert!(matches!(read_model(&path), Err(TrustError::ModelLoad { .. })));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_model_dimensions_must_agree() {
        let result = ReferenceModels::new(vec![1.0, 2.0], vec![1.0]);
        assert!(matches!(result, Err(TrustError::DimensionMismatch { .. })));
        assert!(ReferenceModels::new(vec![], vec![]).is_err());
    }
}
