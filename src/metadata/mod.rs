//! Extracted metadata graph

mod dax_model;
mod elements;
mod names;

pub use dax_model::{DaxModel, ExtractorInfo};
pub use elements::*;
pub use names::{DaxExpression, DaxName, DaxNote};
