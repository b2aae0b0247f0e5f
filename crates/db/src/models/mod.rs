//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, validated with `validator`
//! - A `Deserialize` update DTO (all `Option` fields) where rows are editable

pub mod certificate;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod lesson_progress;
pub mod user;
