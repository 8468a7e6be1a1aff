use super::util::with_retry;
use crate::core::{
    backend::MandateSource,
    cache::Cache,
    model::{Mandate, Stage},
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};

const DEFAULT_RETRIES: usize = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// JSON client for the mission backend's mandate endpoints.
pub struct RestBackend {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<Cache<u64, Mandate>>,
    retries: usize,
    retry_delay_ms: u64,
}

impl RestBackend {
    pub fn new(base_url: &str, cache: Arc<Cache<u64, Mandate>>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            cache,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    pub fn with_retries(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "Fetching from backend");
        let client = &self.client;
        let response = with_retry(
            || async move { client.get(url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Backend request failed: {url}"))?;

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        match serde_json::from_str(&response_text) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse backend response"
                );
                Err(e).with_context(|| format!("Failed to parse backend response from {url}"))
            }
        }
    }
}

#[async_trait]
impl MandateSource for RestBackend {
    async fn list_mandates(&self) -> Result<Vec<Mandate>> {
        let url = format!("{}/mandates", self.base_url);
        let mandates: Vec<Mandate> = self.fetch_json(&url).await?;
        self.cache
            .extend(
                mandates
                    .iter()
                    .filter_map(|m| m.id.map(|id| (id, m.clone()))),
            )
            .await;
        debug!(count = mandates.len(), "Listed mandates");
        Ok(mandates)
    }

    async fn get_mandate(&self, id: u64) -> Result<Mandate> {
        if let Some(cached) = self.cache.get(&id).await {
            return Ok(cached);
        }

        let url = format!("{}/mandates/{}", self.base_url, id);
        let mandate: Mandate = self.fetch_json(&url).await?;
        if mandate.id.is_some_and(|returned| returned != id) {
            return Err(anyhow!(
                "Backend returned mandate {:?} when asked for {}",
                mandate.id,
                id
            ));
        }

        self.cache.put(id, mandate.clone()).await;
        Ok(mandate)
    }

    async fn list_stages(&self, mandate_id: u64) -> Result<Vec<Stage>> {
        let url = format!("{}/mandates/{}/stages", self.base_url, mandate_id);
        let mut stages: Vec<Stage> = self.fetch_json(&url).await?;
        // Nested endpoint, so the parent is implied when the payload omits it
        for stage in &mut stages {
            stage.mandate_id.get_or_insert(mandate_id);
        }
        Ok(stages)
    }
}
