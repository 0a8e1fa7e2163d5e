pub mod capture;
pub mod cli;
pub mod config;
pub mod controller;
pub mod logging;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod util;
