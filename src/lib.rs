//! Job lifecycle tracking for long-running secure training jobs.
//!
//! Callers submit training parameters, receive an opaque job id, and poll
//! until the job is Completed or Failed. The processing backend reports
//! progress through `update`; this crate only tracks state.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
