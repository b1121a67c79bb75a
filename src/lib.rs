pub mod activities;
pub mod config;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod graphql;
pub mod observability;
pub mod server;
pub mod storage;
