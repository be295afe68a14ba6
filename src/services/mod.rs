pub mod ai_service; // transport trait for the inference API
pub mod gemini; // Google Gemini client
pub mod image_ingest;

pub use ai_service::InferenceTransport;
pub use gemini::{AnalysisClient, GeminiTransport};
pub use image_ingest::{EncodedImage, ImageUpload};
