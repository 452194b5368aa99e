use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::pipeline::Pipeline;
use crate::config::{ConfigFormat, ConfigParser};
use crate::core::ArtifactError;
use crate::features::ColumnSchema;

/// Read-only model state loaded once at startup.
///
/// Either half may have failed to load; the failure is kept so every request
/// can report it instead of the process refusing to start.
#[derive(Debug)]
pub struct ModelArtifact {
    pipeline: Result<Pipeline, ArtifactError>,
    columns: Result<ColumnSchema, ArtifactError>,
}

impl ModelArtifact {
    pub fn new(
        pipeline: Result<Pipeline, ArtifactError>,
        columns: Result<ColumnSchema, ArtifactError>,
    ) -> Self {
        Self { pipeline, columns }
    }

    /// Load both artifacts, logging failures rather than returning them
    pub fn load(model_path: &Path, columns_path: &Path) -> Self {
        let pipeline = load_pipeline(model_path);
        match &pipeline {
            Ok(pipeline) => info!(
                path = %model_path.display(),
                features = pipeline.output_width(),
                "Model loaded"
            ),
            Err(e) => error!(
                "Failed to load model: {}. /predict/ will return errors until restart",
                e
            ),
        }

        let columns = load_columns(columns_path);
        match &columns {
            Ok(columns) => {
                info!(path = %columns_path.display(), count = columns.len(), "Expected columns loaded");
                debug!("Expected columns after engineering: {:?}", columns.columns());
            }
            Err(e) => error!(
                "Failed to load expected columns: {}. /predict/ will return errors until restart",
                e
            ),
        }

        let artifact = Self::new(pipeline, columns);
        artifact.warn_on_drift();
        artifact
    }

    pub fn pipeline(&self) -> Result<&Pipeline, &ArtifactError> {
        self.pipeline.as_ref()
    }

    pub fn columns(&self) -> Result<&ColumnSchema, &ArtifactError> {
        self.columns.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_ok() && self.columns.is_ok()
    }

    /// Columns the pipeline reads that the frozen list does not provide
    pub fn unmatched_columns(&self) -> Vec<String> {
        match (&self.pipeline, &self.columns) {
            (Ok(pipeline), Ok(columns)) => pipeline
                .required_columns()
                .filter(|column| !columns.contains(column))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn warn_on_drift(&self) {
        let unmatched = self.unmatched_columns();
        if !unmatched.is_empty() {
            warn!(
                "Model reads columns absent from the expected column list: {}",
                unmatched.join(", ")
            );
        }
    }
}

fn read_artifact<T>(path: &Path) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
{
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    ConfigParser::parse_str(&content, ConfigFormat::from_path(path)).map_err(|e| {
        ArtifactError::Parse {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        }
    })
}

/// Load and sanity-check the exported estimator pipeline
pub fn load_pipeline(path: &Path) -> Result<Pipeline, ArtifactError> {
    let pipeline: Pipeline = read_artifact(path)?;
    pipeline.validate().map_err(|message| ArtifactError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;
    Ok(pipeline)
}

/// Load the frozen list of engineered column names
pub fn load_columns(path: &Path) -> Result<ColumnSchema, ArtifactError> {
    read_artifact(path)
}
