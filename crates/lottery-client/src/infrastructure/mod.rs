//! Infrastructure layer: adapters between the application and the outside
//! world (TCP transport, agency record files, configuration).

pub mod config;
pub mod network;
pub mod record_source;
