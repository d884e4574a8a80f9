//! Browser driver implementations

pub mod chromium;
pub mod snapshot;

pub use chromium::ChromiumDriver;
pub use snapshot::SnapshotDriver;
