//! Woodpecker REST API client

pub mod client;
pub mod crons;
pub mod error;
pub mod registries;
pub mod repos;
pub mod secrets;
pub mod users;

pub use client::Client;
pub use crons::Cron;
pub use error::ApiError;
pub use registries::Registry;
pub use repos::Repo;
pub use secrets::Secret;
pub use users::User;
