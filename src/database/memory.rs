use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Harvest, Plot};
use super::store::{to_column_scale, FarmStore, NewHarvest, NewPlot, PlotChanges};

#[derive(Debug, Clone)]
struct HarvestEntry {
    id: Uuid,
    plot_id: Uuid,
    date: NaiveDate,
    weight_kg: Decimal,
    quality: Option<String>,
}

#[derive(Debug, Default)]
struct Tables {
    plots: HashMap<Uuid, Plot>,
    harvests: Vec<HarvestEntry>,
}

impl Tables {
    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.plots
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    fn attach(&self, entry: &HarvestEntry) -> Option<Harvest> {
        let plot = self.plots.get(&entry.plot_id)?;
        Some(Harvest {
            id: entry.id,
            plot_id: entry.plot_id,
            date: entry.date,
            weight_kg: entry.weight_kg,
            quality: entry.quality.clone(),
            plot: plot.clone(),
        })
    }
}

/// In-process store with the same constraints as the SQL schema: unique plot
/// names, required plot reference on harvests, cascade delete, two-decimal
/// numeric columns. Used by `serve --memory` and the test suite.
#[derive(Debug, Default)]
pub struct MemoryFarmStore {
    tables: RwLock<Tables>,
}

impl MemoryFarmStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FarmStore for MemoryFarmStore {
    async fn insert_plot(&self, plot: NewPlot) -> Result<Plot, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&plot.name, None) {
            return Err(DatabaseError::UniqueViolation {
                field: "name".to_string(),
                value: plot.name,
            });
        }

        let row = Plot {
            id: Uuid::new_v4(),
            name: plot.name,
            area: to_column_scale(plot.area),
            planting_start: plot.planting_start,
        };
        tables.plots.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_plots(&self) -> Result<Vec<Plot>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut plots: Vec<Plot> = tables.plots.values().cloned().collect();
        plots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(plots)
    }

    async fn find_plot(&self, id: Uuid) -> Result<Option<Plot>, DatabaseError> {
        Ok(self.tables.read().await.plots.get(&id).cloned())
    }

    async fn update_plot(&self, id: Uuid, changes: PlotChanges) -> Result<u64, DatabaseError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut tables = self.tables.write().await;
        if let Some(name) = &changes.name {
            if tables.name_taken(name, Some(id)) {
                return Err(DatabaseError::UniqueViolation {
                    field: "name".to_string(),
                    value: name.clone(),
                });
            }
        }

        let Some(plot) = tables.plots.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = changes.name {
            plot.name = name;
        }
        if let Some(area) = changes.area {
            plot.area = to_column_scale(area);
        }
        if let Some(planting_start) = changes.planting_start {
            plot.planting_start = planting_start;
        }
        Ok(1)
    }

    async fn delete_plot(&self, id: Uuid) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.plots.remove(&id).is_none() {
            return Ok(0);
        }
        tables.harvests.retain(|h| h.plot_id != id);
        Ok(1)
    }

    async fn total_harvest_kg(&self, plot_id: Uuid) -> Result<Decimal, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .harvests
            .iter()
            .filter(|h| h.plot_id == plot_id)
            .map(|h| h.weight_kg)
            .sum())
    }

    async fn insert_harvest(&self, harvest: NewHarvest) -> Result<Harvest, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.plots.contains_key(&harvest.plot_id) {
            return Err(DatabaseError::NotFound("Plot not found".to_string()));
        }

        let entry = HarvestEntry {
            id: Uuid::new_v4(),
            plot_id: harvest.plot_id,
            date: harvest.date,
            weight_kg: to_column_scale(harvest.weight_kg),
            quality: harvest.quality,
        };
        tables.harvests.push(entry.clone());
        tables
            .attach(&entry)
            .ok_or_else(|| DatabaseError::NotFound("Plot not found".to_string()))
    }

    async fn list_harvests(&self, plot_id: Option<Uuid>) -> Result<Vec<Harvest>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut harvests: Vec<Harvest> = tables
            .harvests
            .iter()
            .filter(|h| plot_id.map_or(true, |id| h.plot_id == id))
            .filter_map(|h| tables.attach(h))
            .collect();
        harvests.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(harvests)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
