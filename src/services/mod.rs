pub mod auth_service;
pub mod harvest_service;
pub mod plot_service;
pub mod validation;

pub use auth_service::AuthService;
pub use harvest_service::HarvestService;
pub use plot_service::PlotService;
