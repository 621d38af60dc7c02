pub mod engine;
pub mod fetcher;
pub mod layout;
pub mod render;
pub mod sorter;
pub mod summary;

pub use crate::domain::model::{ControlRecord, ControlReport, RenderedReport};
pub use crate::domain::ports::{ConfigProvider, ControlSource, Storage};
pub use crate::utils::error::Result;
