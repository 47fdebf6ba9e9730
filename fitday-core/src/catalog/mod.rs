//! Exercise catalog search.
//!
//! Exercises come from the ExerciseDB API, one request per body part. The
//! full result list is paged locally with [`paginate`].

mod body_part;
mod client;
mod exercise;
mod page;

pub use body_part::BodyPart;
pub use client::{CatalogError, CatalogOptions, ExerciseCatalog, DEFAULT_BASE_URL, DEFAULT_HOST};
pub use exercise::Exercise;
pub use page::{paginate, Page, DEFAULT_PER_PAGE};
