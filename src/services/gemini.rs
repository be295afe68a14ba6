use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::AnalysisError;
use crate::models::FishAnalysis;
use crate::services::ai_service::InferenceTransport;
use crate::services::image_ingest::{self, DEFAULT_IMAGE_MIME};

const IDENTIFY_PROMPT: &str = "Analise esta imagem. Se for um peixe, identifique a espécie e forneça detalhes em Português. \
Se a imagem não contiver um peixe claro, retorne dados indicando que não foi possível identificar com confiança baixa.";

const SYSTEM_PERSONA: &str = "Você é um biólogo marinho especialista e chef de cozinha. \
Seu objetivo é identificar peixes para pescadores e entusiastas.";

const TEMPERATURE: f32 = 0.4;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Response contract the model must follow, mirrored from `FishAnalysis`.
fn fish_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "Nome comum do peixe em Português."
            },
            "scientificName": {
                "type": "STRING",
                "description": "Nome científico da espécie."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Nível de confiança na identificação de 0 a 100."
            },
            "habitat": {
                "type": "STRING",
                "description": "Onde este peixe costuma viver (água doce, salgada, recifes, rios, etc)."
            },
            "diet": {
                "type": "STRING",
                "description": "O que este peixe come (carnívoro, herbívoro, onívoro)."
            },
            "description": {
                "type": "STRING",
                "description": "Uma breve descrição física e comportamental do peixe."
            },
            "edible": {
                "type": "BOOLEAN",
                "description": "Se o peixe é considerado comestível para humanos."
            },
            "conservationStatus": {
                "type": "STRING",
                "description": "Estado de conservação (ex: Pouco Preocupante, Vulnerável, Extinto)."
            },
            "cookingTips": {
                "type": "STRING",
                "description": "Dicas rápidas de culinária se for comestível, ou aviso se for tóxico."
            }
        },
        "required": ["name", "scientificName", "confidence", "habitat", "description", "edible"]
    })
}

impl GenerateContentRequest {
    pub fn identify_fish(mime_type: &str, base64_data: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: mime_type.to_string(),
                            data: base64_data.to_string(),
                        },
                    },
                    Part::Text {
                        text: IDENTIFY_PROMPT.to_string(),
                    },
                ],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: SYSTEM_PERSONA.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: fish_schema(),
                temperature: TEMPERATURE,
            },
        }
    }
}

/// Gemini REST transport
pub struct GeminiTransport {
    base_url: String,
    client: reqwest::Client,
}

impl GeminiTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl InferenceTransport for GeminiTransport {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, AnalysisError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        log::info!("🤖 Sending request to Gemini with model: {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::error!("❌ Gemini API error response: {}", body_excerpt(&body));
            return Err(AnalysisError::Transport(format!("Gemini API error ({})", status)));
        }

        Ok(body)
    }
}

/// First 500 characters of a response body, cut on a char boundary.
fn body_excerpt(body: &str) -> String {
    body.chars().take(500).collect()
}

/// Builds, sends and validates one identification request.
pub struct AnalysisClient {
    api_key: Option<String>,
    model: String,
    transport: Arc<dyn InferenceTransport>,
}

impl AnalysisClient {
    pub fn new(api_key: Option<String>, model: String, transport: Arc<dyn InferenceTransport>) -> Self {
        Self {
            api_key,
            model,
            transport,
        }
    }

    /// `encoded_image` may be a data URI or a bare base64 payload.
    pub async fn identify(&self, encoded_image: &str) -> Result<FishAnalysis, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AnalysisError::Configuration)?;

        let mime_type = image_ingest::data_uri_mime_type(encoded_image)
            .filter(|m| image_ingest::is_image_type(m))
            .unwrap_or(DEFAULT_IMAGE_MIME);
        let data = image_ingest::strip_data_uri_prefix(encoded_image);

        log::debug!("📸 Identifying fish: {} bytes of base64 ({})", data.len(), mime_type);

        let request = GenerateContentRequest::identify_fish(mime_type, data);
        let body = self.transport.generate_content(api_key, &self.model, &request).await?;

        log::debug!("📄 Raw Gemini response size: {} bytes", body.len());

        let analysis = parse_analysis(&body)?;
        log::info!("🐟 Identified: {} ({}%)", analysis.name, analysis.confidence);

        Ok(analysis)
    }
}

fn parse_analysis(body: &str) -> Result<FishAnalysis, AnalysisError> {
    if body.trim().is_empty() {
        return Err(AnalysisError::Validation("empty response body".to_string()));
    }

    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text = response
        .text()
        .ok_or_else(|| AnalysisError::Validation("no response from model".to_string()))?;

    let analysis: FishAnalysis = serde_json::from_str(text.trim())?;
    analysis.validate()?;

    Ok(analysis)
}
