pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryFarmStore;
pub use models::{Harvest, Plot, PlotSummary};
pub use postgres::PgFarmStore;
pub use store::{to_column_scale, FarmStore, NewHarvest, NewPlot, PlotChanges, COLUMN_SCALE};
