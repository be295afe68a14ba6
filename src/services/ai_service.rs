use crate::error::AnalysisError;
use crate::services::gemini::GenerateContentRequest;

/// Wire boundary to the hosted model (Gemini, mocks in tests)
#[async_trait::async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Sends one generateContent request and returns the raw response body.
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, AnalysisError>;
}
