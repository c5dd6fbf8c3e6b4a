//! CLI subcommand implementations.

pub mod cases;
pub mod durations;
pub mod encode;
pub mod events;
pub mod import;
pub mod metrics;
pub mod migrate;
pub mod record;
pub mod report;
pub mod util;
