//! Domain layer of the learning management system.
//!
//! Pure types, validation rules, the enrollment lifecycle and the progress
//! engine. Nothing in this crate performs I/O; storage is reached through the
//! [`progress::ProgressStore`] trait implemented by the database crate.

pub mod course;
pub mod enrollment;
pub mod error;
pub mod pagination;
pub mod progress;
pub mod review;
pub mod roles;
pub mod types;
