pub mod claims;
pub mod classify;
pub mod monitor;
pub mod schedule;
pub mod sources;
pub mod store;
pub mod throttle;

#[cfg(feature = "test-support")]
pub mod testing;
