//! Command handlers for the `tomte` binary.

pub mod config;
pub mod scan;
