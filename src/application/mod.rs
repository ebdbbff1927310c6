//! Application services layer scaffolding.

pub mod credentials;
pub mod repos;
pub mod wallets;
