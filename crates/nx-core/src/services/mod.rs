pub mod aggregator;
pub mod catalog;
pub mod compose;
pub mod config_loader;
pub mod docker;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod snapshot;
pub mod synchronizer;
