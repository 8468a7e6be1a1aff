//! Read access to the remote mission backend.

use super::model::{Mandate, Stage};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MandateSource: Send + Sync {
    async fn list_mandates(&self) -> Result<Vec<Mandate>>;
    async fn get_mandate(&self, id: u64) -> Result<Mandate>;
    async fn list_stages(&self, mandate_id: u64) -> Result<Vec<Stage>>;
}
