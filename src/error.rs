use thiserror::Error;

/// Shown to the user for every failed analysis; the cause only goes to the log.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Não foi possível identificar o peixe. Verifique sua chave API ou tente uma imagem mais clara.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API key is missing")]
    Configuration,

    #[error("inference request failed: {0}")]
    Transport(String),

    #[error("invalid analysis response: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no image selected")]
    NoImage,

    #[error("an analysis is already running")]
    Busy,
}
