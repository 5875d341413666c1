use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::plot::Plot;

/// A single recorded harvest, returned with its owning plot attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Harvest {
    pub id: Uuid,
    pub plot_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight_kg: Decimal,
    pub quality: Option<String>,
    pub plot: Plot,
}

/// Flat row of `harvests JOIN plots`, with plot columns prefixed `plot_`.
#[derive(Debug, FromRow)]
pub struct HarvestRow {
    pub id: Uuid,
    pub plot_id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: Decimal,
    pub quality: Option<String>,
    pub plot_name: String,
    pub plot_area_m2: Decimal,
    pub plot_planting_start: Option<NaiveDate>,
}

impl From<HarvestRow> for Harvest {
    fn from(row: HarvestRow) -> Self {
        Self {
            id: row.id,
            plot_id: row.plot_id,
            date: row.date,
            weight_kg: row.weight_kg,
            quality: row.quality,
            plot: Plot {
                id: row.plot_id,
                name: row.plot_name,
                area: row.plot_area_m2,
                planting_start: row.plot_planting_start,
            },
        }
    }
}
