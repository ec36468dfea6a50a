pub mod colorscale;
pub mod config;
pub mod error;
pub mod geometry;
pub mod load_clean;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod range;
pub mod reduce;
pub mod render;
pub mod timeline;

pub use config::PipelineConfig;
pub use error::MapError;
pub use pipeline::{run, PipelineReport};
