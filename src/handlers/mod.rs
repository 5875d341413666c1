// handlers/mod.rs - Two-tier handler layout
//
// Public: no bearer token (/health, account sign-up and sign-in)
// Protected: every handler takes an `Authorized<Policy>` extractor

pub mod protected;
pub mod public;
