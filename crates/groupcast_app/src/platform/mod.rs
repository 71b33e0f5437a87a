//! Terminal front-end: configuration, logging, local storage and the dispatch loop.
mod app;
mod config;
mod effects;
mod logging;
mod persistence;
mod ui;

pub use app::run_app;
