//! Re-exports of the crates appearing in this crate's public API, so
//! downstream tools build against the same versions.
pub use {
    anyhow,
    bio,
    chrono,
    itertools,
    log,
    pretty_env_logger,
    rayon,
    serde,
    serde_json,
};
