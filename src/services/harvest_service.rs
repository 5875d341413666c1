use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::validation;
use crate::database::{FarmStore, Harvest, NewHarvest};
use crate::error::{ApiError, ApiResult};

/// Body of `POST /harvests`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHarvestRequest {
    pub plot_id: Option<String>,
    pub date: Option<Value>,
    pub weight_kg: Option<Value>,
    pub quality: Option<Value>,
}

pub struct HarvestService {
    store: Arc<dyn FarmStore>,
}

impl HarvestService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    /// Record a harvest against an existing plot; the plot comes back attached.
    pub async fn create(&self, request: CreateHarvestRequest) -> ApiResult<Harvest> {
        let plot_id = validation::required_text("plotId", request.plot_id)?;
        let harvest = NewHarvest {
            plot_id: validation::parse_uuid("plotId", &plot_id)?,
            date: validation::date("date", request.date.as_ref())?,
            weight_kg: validation::positive_decimal("weightKg", request.weight_kg.as_ref())?,
            quality: validation::optional_text("quality", request.quality)?,
        };

        if self.store.find_plot(harvest.plot_id).await?.is_none() {
            return Err(ApiError::not_found("Plot not found"));
        }

        let created = self.store.insert_harvest(harvest).await?;
        info!("Recorded harvest {} for plot {}", created.id, created.plot_id);
        Ok(created)
    }

    pub async fn list(&self) -> ApiResult<Vec<Harvest>> {
        Ok(self.store.list_harvests(None).await?)
    }

    /// Harvests of one plot; an unknown plot simply has none.
    pub async fn list_by_plot(&self, plot_id: &str) -> ApiResult<Vec<Harvest>> {
        let plot_id = validation::parse_uuid("plotId", plot_id)?;
        Ok(self.store.list_harvests(Some(plot_id)).await?)
    }
}
