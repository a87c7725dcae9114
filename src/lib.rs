pub mod nav;

/// `#[profile(threshold_us)]`: time a function when `perf_stats` is enabled.
pub use kestrel_macros::profile;
