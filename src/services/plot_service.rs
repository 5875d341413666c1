use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::validation;
use crate::database::{FarmStore, NewPlot, Plot, PlotChanges, PlotSummary};
use crate::error::{ApiError, ApiResult};

/// Body of `POST /plots`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlotRequest {
    pub name: Option<String>,
    pub area: Option<Value>,
    pub planting_start: Option<Value>,
}

/// Body of `PATCH /plots/:id`. An explicit `null` for `plantingStart` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlotRequest {
    pub name: Option<String>,
    pub area: Option<Value>,
    #[serde(default, deserialize_with = "validation::present")]
    pub planting_start: Option<Value>,
}

pub struct PlotService {
    store: Arc<dyn FarmStore>,
}

impl PlotService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreatePlotRequest) -> ApiResult<Plot> {
        let plot = NewPlot {
            name: validation::required_text("name", request.name)?,
            area: validation::positive_decimal("area", request.area.as_ref())?,
            planting_start: validation::optional_date("plantingStart", request.planting_start.as_ref())?,
        };

        let created = self.store.insert_plot(plot).await?;
        info!("Created plot {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn list(&self) -> ApiResult<Vec<Plot>> {
        Ok(self.store.list_plots().await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Plot> {
        let id = validation::parse_uuid("id", id)?;
        self.find(id).await
    }

    /// Apply the fields present in `request`, then return the stored row.
    pub async fn update(&self, id: &str, request: UpdatePlotRequest) -> ApiResult<Plot> {
        let id = validation::parse_uuid("id", id)?;

        let changes = PlotChanges {
            name: match request.name {
                Some(name) => Some(validation::required_text("name", Some(name))?),
                None => None,
            },
            area: match request.area {
                Some(area) => Some(validation::positive_decimal("area", Some(&area))?),
                None => None,
            },
            planting_start: match request.planting_start {
                Some(raw) => Some(validation::optional_date("plantingStart", Some(&raw))?),
                None => None,
            },
        };

        if !changes.is_empty() {
            self.store.update_plot(id, changes).await?;
        }
        self.find(id).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let id = validation::parse_uuid("id", id)?;
        self.find(id).await?;
        self.store.delete_plot(id).await?;
        info!("Deleted plot {}", id);
        Ok(())
    }

    /// Total harvested weight. A plot with no harvests, or no row at all, totals zero.
    pub async fn summary(&self, id: &str) -> ApiResult<PlotSummary> {
        let plot_id = validation::parse_uuid("id", id)?;
        let total_kg = self.store.total_harvest_kg(plot_id).await?;
        Ok(PlotSummary { plot_id, total_kg })
    }

    async fn find(&self, id: Uuid) -> ApiResult<Plot> {
        self.store
            .find_plot(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Plot not found"))
    }
}
