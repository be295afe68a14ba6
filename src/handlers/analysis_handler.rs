use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AnalysisError, SessionError};
use crate::handlers::Session;
use crate::models::{AnalysisStatus, FishAnalysis};
use crate::services::{image_ingest, AnalysisClient, ImageUpload};

pub struct AnalysisHandler {
    client: Arc<AnalysisClient>,
    session: Arc<Mutex<Session>>,
}

impl AnalysisHandler {
    pub fn new(client: Arc<AnalysisClient>) -> Self {
        Self {
            client,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// Returns `Ok(false)` when the upload is not an image and was ignored.
    pub async fn handle_upload(&self, upload: ImageUpload) -> Result<bool> {
        if self.session.lock().await.is_analyzing() {
            return Err(SessionError::Busy.into());
        }

        log::info!("📸 Image received: {:?} ({} bytes)", upload.file_name, upload.bytes.len());

        let Some(image) = image_ingest::encode_upload(upload).await? else {
            return Ok(false);
        };

        self.session.lock().await.select_image(Some(image))?;
        Ok(true)
    }

    pub async fn clear_image(&self) -> Result<(), SessionError> {
        self.session.lock().await.select_image(None)?;
        log::info!("🗑️ Image cleared");
        Ok(())
    }

    /// Runs one analysis on the selected image. The request runs in its own
    /// task so the session always leaves Analyzing, even if the caller is
    /// dropped mid-flight. The session lock is released while it runs.
    pub async fn analyze(&self) -> Result<AnalysisStatus, SessionError> {
        let image = self.session.lock().await.begin_analysis()?;

        log::info!("🔍 Analysis started");

        let client = self.client.clone();
        let session = self.session.clone();
        let task = tokio::spawn(async move {
            let result = client.identify(&image).await;

            let mut session = session.lock().await;
            session.finish_analysis(result);
            session.status()
        });

        let status = match task.await {
            Ok(status) => status,
            Err(e) => {
                let mut session = self.session.lock().await;
                session.finish_analysis(Err(AnalysisError::Transport(format!("analysis task failed: {}", e))));
                session.status()
            }
        };

        log::info!("✅ Analysis finished with status: {}", status);
        Ok(status)
    }

    /// Stateless identification for API callers; does not touch the session.
    pub async fn identify(&self, encoded_image: &str) -> Result<FishAnalysis, AnalysisError> {
        self.client.identify(encoded_image).await
    }
}
