use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalysisError, SessionError, ANALYSIS_FAILED_MESSAGE};
use crate::models::{AnalysisStatus, FishAnalysis};
use crate::services::EncodedImage;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    None,
    Result(FishAnalysis),
    Error(String),
}

/// The single "current selection / current result" slot.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    image: Option<EncodedImage>,
    status: AnalysisStatus,
    outcome: Outcome,
    analyzed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn analyzed_at(&self) -> Option<DateTime<Utc>> {
        self.analyzed_at
    }

    pub fn is_analyzing(&self) -> bool {
        self.status == AnalysisStatus::Analyzing
    }

    pub fn can_submit(&self) -> bool {
        self.image.is_some() && !self.is_analyzing()
    }

    /// Replaces (or clears, with `None`) the image and drops any previous outcome.
    pub fn select_image(&mut self, image: Option<EncodedImage>) -> Result<(), SessionError> {
        if self.is_analyzing() {
            return Err(SessionError::Busy);
        }

        self.image = image;
        self.status = AnalysisStatus::Idle;
        self.outcome = Outcome::None;
        self.analyzed_at = None;
        Ok(())
    }

    /// Moves to Analyzing and hands back the data URI to send.
    pub fn begin_analysis(&mut self) -> Result<String, SessionError> {
        if self.is_analyzing() {
            return Err(SessionError::Busy);
        }

        let data_uri = self
            .image
            .as_ref()
            .map(|img| img.data_uri.clone())
            .ok_or(SessionError::NoImage)?;

        self.status = AnalysisStatus::Analyzing;
        self.outcome = Outcome::None;
        Ok(data_uri)
    }

    pub fn finish_analysis(&mut self, result: Result<FishAnalysis, AnalysisError>) {
        if !self.is_analyzing() {
            log::warn!("⚠️ Analysis finished while session was {}, dropping result", self.status);
            return;
        }

        match result {
            Ok(analysis) => {
                self.status = AnalysisStatus::Success;
                self.outcome = Outcome::Result(analysis);
            }
            Err(e) => {
                log::error!("❌ Fish analysis failed: {}", e);
                self.status = AnalysisStatus::Error;
                self.outcome = Outcome::Error(ANALYSIS_FAILED_MESSAGE.to_string());
            }
        }
        self.analyzed_at = Some(Utc::now());
    }
}
