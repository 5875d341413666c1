// handlers/public/mod.rs - Endpoints reachable without a bearer token

pub mod auth;
pub mod health;

pub use auth::{
    google as auth_login_google, login as auth_login, recover_password as auth_recover_password,
    register as auth_register,
};
pub use health::get as health_get;
