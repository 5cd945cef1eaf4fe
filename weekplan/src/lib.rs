//! `weekplan`: local-first weekly task planner library.

pub mod backup;
pub mod categories;
pub mod cli;
pub mod clock;
pub mod config;
pub mod events;
pub mod goals;
pub mod planner;
pub mod reminders;
pub mod storage;
pub mod tasks;

pub use planner::{Planner, PlannerOptions};
