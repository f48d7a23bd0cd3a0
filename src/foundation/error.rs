use std::path::PathBuf;

/// Convenience result type used across geofade.
pub type GeoFadeResult<T> = Result<T, GeoFadeError>;

/// Top-level error taxonomy used by loader, engine and render APIs.
#[derive(thiserror::Error, Debug)]
pub enum GeoFadeError {
    /// Invalid user-provided configuration or record data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while stepping the frame sequence or rasterizing a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A JSON document matched none of the known record layouts.
    #[error("unrecognized document shape in '{}': {detail}", path.display())]
    UnrecognizedDocumentShape {
        /// Offending file.
        path: PathBuf,
        /// What was found instead of a record list.
        detail: String,
    },

    /// Records lack one or more required fields.
    #[error("'{}' is missing required columns: {}", path.display(), missing.join(", "))]
    MissingRequiredColumns {
        /// Offending file.
        path: PathBuf,
        /// Names of the absent columns.
        missing: Vec<String>,
    },

    /// No records exist to derive a timeline or color scale from.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// A record's date field could not be parsed.
    #[error("invalid date in '{}' row {row}, field '{field}': {value:?}", path.display())]
    InvalidDate {
        /// Offending file.
        path: PathBuf,
        /// 0-based record index within the file.
        row: usize,
        /// Field the date was read from.
        field: String,
        /// Raw field value.
        value: String,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GeoFadeError {
    /// Build a [`GeoFadeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GeoFadeError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`GeoFadeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`GeoFadeError::EmptyDataset`] value.
    pub fn empty_dataset(msg: impl Into<String>) -> Self {
        Self::EmptyDataset(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            GeoFadeError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            GeoFadeError::evaluation("x")
                .to_string()
                .contains("evaluation error:")
        );
        assert!(
            GeoFadeError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
        assert!(
            GeoFadeError::empty_dataset("x")
                .to_string()
                .contains("empty dataset:")
        );
    }

    #[test]
    fn domain_errors_name_path_and_field() {
        let err = GeoFadeError::MissingRequiredColumns {
            path: PathBuf::from("data/points.csv"),
            missing: vec!["lat".to_string(), "lng".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("data/points.csv"));
        assert!(msg.contains("lat, lng"));

        let err = GeoFadeError::InvalidDate {
            path: PathBuf::from("bg.json"),
            row: 3,
            field: "imageDate".to_string(),
            value: "not-a-date".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bg.json"));
        assert!(msg.contains("row 3"));
        assert!(msg.contains("imageDate"));
        assert!(msg.contains("not-a-date"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = GeoFadeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
