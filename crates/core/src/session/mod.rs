#![forbid(unsafe_code)]

mod ids;
mod labels;
mod types;

pub use ids::*;
pub use labels::*;
pub use types::*;

#[cfg(test)]
mod tests;
