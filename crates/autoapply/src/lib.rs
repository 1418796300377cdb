//! Core engine for the AutoApply job-search automation service.
//!
//! The crate is organized around two workflows: `matching`, which scores job
//! postings against a candidate's criteria, and `automation`, which decides
//! per scheduled tick what background work to enqueue and drives the queue
//! worker that executes it. Persistence and the outside world (scrapers,
//! submitters, notification transports) sit behind traits so the engine can
//! be exercised entirely in memory.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
