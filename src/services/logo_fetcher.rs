use std::time::Duration;

use base64::{ engine::general_purpose::STANDARD, Engine as _ };

use crate::error::{ AppError, Result };
use crate::qr::LogoAsset;

/// Where a request's logo comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Url(String),
    Inline(String),
}

/// Downloads or decodes logo images under a size cap. Every request is bounded by the client timeout.
pub struct LogoFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl LogoFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, max_bytes))
    }

    pub fn with_client(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }

    pub async fn fetch(&self, url: &str) -> Result<LogoAsset> {
        let parsed = reqwest::Url
            ::parse(url)
            .map_err(|e| AppError::InvalidInput(format!("Invalid logo URL: {}", e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidInput("Logo URL must use http or https".to_string()));
        }

        let mut response = self.client
            .get(parsed)
            .send().await
            .map_err(|e| AppError::LogoFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::LogoFetch(format!("Logo server returned {}", response.status())));
        }

        if let Some(length) = response.content_length() {
            if length > (self.max_bytes as u64) {
                return Err(self.too_large());
            }
        }

        let mut bytes = Vec::new();
        while
            let Some(chunk) = response
                .chunk().await
                .map_err(|e| AppError::LogoFetch(e.to_string()))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(AppError::LogoFetch("Logo response was empty".to_string()));
        }

        tracing::debug!("Fetched {} byte logo from {}", bytes.len(), url);
        Ok(LogoAsset::from_bytes(bytes))
    }

    /// Decode a base64 logo, with or without a `data:` URL prefix.
    pub fn decode_inline(&self, encoded: &str) -> Result<LogoAsset> {
        let encoded = match encoded.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => encoded,
        };

        let bytes = STANDARD.decode(encoded.trim()).map_err(|e|
            AppError::LogoDecodeFailure(format!("Invalid base64: {}", e))
        )?;

        if bytes.is_empty() {
            return Err(AppError::LogoDecodeFailure("Logo is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(self.too_large());
        }

        Ok(LogoAsset::from_bytes(bytes))
    }

    /// Load the logo for a request. Failures are logged and yield no logo.
    pub async fn resolve(&self, source: Option<&LogoSource>) -> Option<LogoAsset> {
        let result = match source? {
            LogoSource::Url(url) => self.fetch(url).await,
            LogoSource::Inline(encoded) => self.decode_inline(encoded),
        };

        match result {
            Ok(logo) => Some(logo),
            Err(e) => {
                tracing::warn!("Continuing without logo: {}", e);
                None
            }
        }
    }

    fn too_large(&self) -> AppError {
        AppError::LogoFetch(format!("Logo exceeds {} bytes", self.max_bytes))
    }
}
