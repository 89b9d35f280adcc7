pub mod client;
pub mod config;
pub mod data_models;
pub mod error;
pub mod parser;
pub mod store;

pub use client::{LibgenClient, SearchCriteria, SearchOptions};
pub use data_models::{BookResult, Mirror, Pagination, SearchResponse};
pub use error::LibgenError;
pub use store::{LibgenStore, StoreListing};
