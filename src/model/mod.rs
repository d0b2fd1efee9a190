//! Data models for FitTrack.
//!
//! This module contains the persisted record types:
//! - Workout (with Exercise and WorkoutSet)
//! - BodyMetric
//!
//! and the [`Record`] contract they share.

pub mod body_metric;
pub mod record;
pub mod workout;

pub use body_metric::BodyMetric;
pub use record::{next_record_id, Record, RecordKind};
pub use workout::{Exercise, Workout, WorkoutSet};
