//! Errors raised while validating configuration.

use thiserror::Error;

use crate::Faction;

/// Reasons a configuration value is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A probability fell outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending setting.
        name: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// A `min..=max` pair was inverted.
    #[error("{name} range is inverted: {min} > {max}")]
    InvertedRange {
        /// Name of the offending setting.
        name: &'static str,
        /// Lower bound that was supplied.
        min: u64,
        /// Upper bound that was supplied.
        max: u64,
    },
    /// A value exceeded its hard limit.
    #[error("{name} must not exceed {limit}, got {value}")]
    AboveLimit {
        /// Name of the offending setting.
        name: &'static str,
        /// Value that was supplied.
        value: u64,
        /// Largest value accepted.
        limit: u64,
    },
    /// A count that must be positive was zero.
    #[error("{name} must be greater than zero")]
    Zero {
        /// Name of the offending setting.
        name: &'static str,
    },
    /// A zone table listed no zone.
    #[error("zone table is empty")]
    EmptyZoneTable,
    /// A zone was declared without any rectangle covering a tile.
    #[error("zone for {faction:?} has no usable rectangle")]
    ZoneWithoutArea {
        /// Faction of the offending zone.
        faction: Faction,
    },
    /// More zones were declared than identifiers exist.
    #[error("zone table lists {count} zones, more than can be registered")]
    TooManyZones {
        /// Number of zones declared.
        count: usize,
    },
}
