//! Text handling shared by ingestion and the view pipeline.
//!
//! - [`normalize`] - cell cleanup applied to every ingested value
//! - [`sentences`] - clause splitting for indication paragraphs
//! - [`collate`] - locale-style comparison used for sorting

pub mod collate;
pub mod normalize;
pub mod sentences;

pub use collate::{collation_key, compare};
pub use normalize::{clean, href, normalize, Normalizer};
pub use sentences::split;
