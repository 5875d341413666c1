// handlers/protected/mod.rs - Endpoints behind the bearer token guard
//
// The role policy of each route is the type parameter of its `Authorized`
// argument: Authenticated (any valid token), Members (user, admin), AdminOnly.

pub mod auth;
pub mod harvests;
pub mod plots;

pub use auth::{
    admin_create_user as auth_admin_create_user, logout as auth_logout, me as auth_me,
    set_role as auth_set_role, test_user as auth_test_user, update_password as auth_update_password,
};

pub use harvests::create as harvests_post;
pub use harvests::list as harvests_get;
pub use harvests::list_by_plot as harvests_by_plot_get;

pub use plots::create as plots_post;
pub use plots::delete as plot_delete;
pub use plots::get as plot_get;
pub use plots::list as plots_get;
pub use plots::summary as plot_summary_get;
pub use plots::update as plot_patch;
