pub mod harvest;
pub mod plot;

pub use harvest::{Harvest, HarvestRow};
pub use plot::{Plot, PlotSummary};
