pub mod args;
pub mod bursts;
pub mod config;
pub mod depth;
pub mod error;
pub mod ingest;
pub mod output;
pub mod series;
pub mod stats;
pub mod util;

pub use error::{OwhlError, Result};
