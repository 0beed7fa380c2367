//! Error types for the ranking pipeline.
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Clean,
    Describe,
    Normalize,
    Score,
    Aggregate,
    Export,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Stage::Load => "load",
                Stage::Clean => "clean",
                Stage::Describe => "describe",
                Stage::Normalize => "normalize",
                Stage::Score => "score",
                Stage::Aggregate => "aggregate",
                Stage::Export => "export",
            }
        )
    }
}

/// Failures while reading the raw table. All of these abort before any stage runs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read header row: {0}")]
    Header(#[source] csv::Error),

    #[error("input schema error: missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("input schema error: invalid value at line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("input schema error: dataset has no rows")]
    Empty,
}

/// Failures while writing output artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("load stage failed: {0}")]
    Load(#[from] LoadError),

    #[error("{0} stage failed: table is empty")]
    EmptyTable(Stage),

    #[error("export stage failed writing {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: ExportError,
    },
}

impl PipelineError {
    /// The stage the error originated in.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Load(_) => Stage::Load,
            PipelineError::EmptyTable(stage) => *stage,
            PipelineError::Export { .. } => Stage::Export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_stage() {
        let err = PipelineError::from(LoadError::MissingColumn("AUM (Cr)"));
        assert_eq!(err.stage(), Stage::Load);
        assert!(err.to_string().contains("load stage failed"));
        assert!(err.to_string().contains("AUM (Cr)"));
        assert!(err.to_string().contains("input schema error"));

        let err = PipelineError::EmptyTable(Stage::Normalize);
        assert_eq!(err.to_string(), "normalize stage failed: table is empty");
    }

    #[test]
    fn unreadable_input_is_not_a_schema_error() {
        let err = PipelineError::from(
            crate::core::loader::load_from_path("/nonexistent/fundrank/input.csv").unwrap_err(),
        );
        assert_eq!(err.stage(), Stage::Load);
        let message = err.to_string();
        assert!(message.starts_with("load stage failed: failed to open"), "{message}");
        assert!(!message.contains("schema"), "{message}");
    }
}
