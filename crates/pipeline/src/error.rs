use std::path::PathBuf;

use bidpilot_core::catalog::CatalogError;
use bidpilot_core::phase::Phase;
use bidpilot_inference::InferenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required upstream artifact is absent when a phase starts. Fatal:
    /// the run aborts with no partial salvage beyond what is on disk.
    #[error("{phase:?} phase requires artifact `{artifact}` which was never produced")]
    MissingInput { phase: Phase, artifact: String },
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("could not read the procurement document `{path}`: {source}")]
    ReadDocument { path: PathBuf, source: std::io::Error },
    #[error("could not create run directory `{path}`: {source}")]
    CreateRunDir { path: PathBuf, source: std::io::Error },
    #[error("could not write artifact `{path}`: {source}")]
    WriteArtifact { path: PathBuf, source: std::io::Error },
    #[error("could not read artifact `{path}`: {source}")]
    ReadArtifact { path: PathBuf, source: std::io::Error },
    #[error("could not encode artifact `{path}`: {source}")]
    EncodeArtifact { path: PathBuf, source: serde_json::Error },
    #[error("could not decode artifact `{path}`: {source}")]
    DecodeArtifact { path: PathBuf, source: serde_json::Error },
}
