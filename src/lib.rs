#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "This crate contains all the core business logic, domain models, authentication"]
#![doc = "mechanisms, routing configuration, and error handling for the TaskDeck application."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod store;
