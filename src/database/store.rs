use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Harvest, Plot};

/// Scale of the `numeric(10, 2)` columns
pub const COLUMN_SCALE: u32 = 2;

/// Round the way Postgres coerces into `numeric(10, 2)`: half away from zero.
pub fn to_column_scale(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COLUMN_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validated input for a new plot
#[derive(Debug, Clone)]
pub struct NewPlot {
    pub name: String,
    pub area: Decimal,
    pub planting_start: Option<NaiveDate>,
}

/// Partial plot update. `None` leaves a column untouched; for
/// `planting_start`, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PlotChanges {
    pub name: Option<String>,
    pub area: Option<Decimal>,
    pub planting_start: Option<Option<NaiveDate>>,
}

impl PlotChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.area.is_none() && self.planting_start.is_none()
    }
}

/// Validated input for a new harvest
#[derive(Debug, Clone)]
pub struct NewHarvest {
    pub plot_id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: Decimal,
    pub quality: Option<String>,
}

/// Persistence for plots and harvests.
///
/// Each method is a single logical unit; implementations rely on the backing
/// store for isolation and do not coordinate concurrent writers.
#[async_trait]
pub trait FarmStore: Send + Sync {
    /// Fails with `UniqueViolation` when the name is taken.
    async fn insert_plot(&self, plot: NewPlot) -> Result<Plot, DatabaseError>;

    /// All plots, name ascending.
    async fn list_plots(&self) -> Result<Vec<Plot>, DatabaseError>;

    async fn find_plot(&self, id: Uuid) -> Result<Option<Plot>, DatabaseError>;

    /// Returns the number of rows touched (0 when the id is unknown).
    async fn update_plot(&self, id: Uuid, changes: PlotChanges) -> Result<u64, DatabaseError>;

    /// Deletes the plot and, through the cascade, its harvests.
    async fn delete_plot(&self, id: Uuid) -> Result<u64, DatabaseError>;

    /// `SUM(weight_kg)` over the plot's harvests, zero when there are none.
    async fn total_harvest_kg(&self, plot_id: Uuid) -> Result<Decimal, DatabaseError>;

    /// Fails with `NotFound` when `plot_id` does not reference a plot.
    async fn insert_harvest(&self, harvest: NewHarvest) -> Result<Harvest, DatabaseError>;

    /// Harvests with their plot attached, date descending. Rows sharing a
    /// date come back in no particular order.
    async fn list_harvests(&self, plot_id: Option<Uuid>) -> Result<Vec<Harvest>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
