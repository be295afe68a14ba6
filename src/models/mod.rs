use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Structured identification returned by the model for one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishAnalysis {
    pub name: String,
    pub scientific_name: String,
    pub confidence: f64, // 0-100, self-reported by the model
    pub habitat: String,
    #[serde(default)]
    pub diet: Option<String>,
    pub description: String,
    pub edible: bool,
    #[serde(default)]
    pub conservation_status: Option<String>,
    #[serde(default)]
    pub cooking_tips: Option<String>,
}

impl FishAnalysis {
    /// Checks the constraints serde cannot express on its own.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.name.trim().is_empty() {
            return Err(AnalysisError::Validation("name is empty".to_string()));
        }

        if !self.confidence.is_finite() || !(0.0..=100.0).contains(&self.confidence) {
            return Err(AnalysisError::Validation(format!(
                "confidence {} is outside 0-100",
                self.confidence
            )));
        }

        Ok(())
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Analyzing,
    Success,
    Error,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisStatus::Idle => "idle",
            AnalysisStatus::Analyzing => "analyzing",
            AnalysisStatus::Success => "success",
            AnalysisStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Display-only banding of the model's confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 80.0 {
            ConfidenceTier::High
        } else if confidence > 50.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "confidence-high",
            ConfidenceTier::Medium => "confidence-medium",
            ConfidenceTier::Low => "confidence-low",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConfidenceTier::High => "Alta",
            ConfidenceTier::Medium => "Média",
            ConfidenceTier::Low => "Baixa",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tilapia() -> FishAnalysis {
        FishAnalysis {
            name: "Tilápia".to_string(),
            scientific_name: "Oreochromis niloticus".to_string(),
            confidence: 92.0,
            habitat: "água doce".to_string(),
            diet: None,
            description: "...".to_string(),
            edible: true,
            conservation_status: None,
            cooking_tips: None,
        }
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = r#"{
            "name": "Tilápia",
            "scientificName": "Oreochromis niloticus",
            "confidence": 92,
            "habitat": "água doce",
            "description": "...",
            "edible": true,
            "family": "Cichlidae"
        }"#;

        let analysis: FishAnalysis = serde_json::from_str(json).unwrap();

        assert_eq!(analysis, tilapia());
    }

    #[test]
    fn test_deserialize_missing_required_field_fails() {
        let json = r#"{"name": "Tilápia", "confidence": 92, "habitat": "rio", "description": "...", "edible": true}"#;

        assert!(serde_json::from_str::<FishAnalysis>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let analysis = FishAnalysis { name: "  ".to_string(), ..tilapia() };

        assert!(matches!(analysis.validate(), Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let too_high = FishAnalysis { confidence: 120.0, ..tilapia() };
        let negative = FishAnalysis { confidence: -1.0, ..tilapia() };

        assert!(too_high.validate().is_err());
        assert!(negative.validate().is_err());
        assert!(tilapia().validate().is_ok());
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::from_confidence(92.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(80.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(51.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(50.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(0.0), ConfidenceTier::Low);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&AnalysisStatus::Analyzing).unwrap(), "\"ANALYZING\"");
    }
}
