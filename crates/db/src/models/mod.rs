//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where the table is
//!   editable

pub mod category;
pub mod completion;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod review;
pub mod section;
pub mod session;
pub mod user;
