//! Process-wide `tracing` setup: bootstrap at `info`, then reload the filter
//! from settings once they are parsed.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
