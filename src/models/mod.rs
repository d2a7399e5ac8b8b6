//! Data models for integration items

mod item;

pub use item::*;
