pub mod batch;
pub mod composite;
pub mod config;
pub mod error;
pub mod scan;

pub use batch::{run, BatchReport};
pub use config::{Offset, Settings, Size};
pub use error::CompositorError;
