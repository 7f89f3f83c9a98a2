#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod r#type;

pub use error::{KDTreeError, Result};
pub use r#type::KDNum;
