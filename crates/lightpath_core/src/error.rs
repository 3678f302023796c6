//! # Error Types
//!
//! Every failure the simulation reports instead of panicking.

use thiserror::Error;

/// Errors returned by emission and pixel queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightpathError {
    /// A parameter is inconsistent (e.g. minimum brightness above maximum).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested model index does not exist on this object.
    #[error("invalid model: {model} (object has {available} models)")]
    InvalidModel {
        /// The requested model index.
        model: u8,
        /// Number of models registered.
        available: usize,
    },

    /// Every light-list slot is busy and no list matches the note id.
    #[error("no free light list slot (capacity {capacity})")]
    NoFreeSlot {
        /// Configured number of slots.
        capacity: usize,
    },

    /// No intersection or connection matches the emit groups.
    #[error("no emitter available in groups {groups:#010b}")]
    NoEmitterAvailable {
        /// The resolved emit-group mask.
        groups: u8,
    },

    /// The emission would exceed the total light budget.
    #[error("light budget exceeded: requested {requested}, {available} available")]
    CapacityExceeded {
        /// Lights the emission asked for.
        requested: usize,
        /// Lights left in the budget.
        available: usize,
    },

    /// A pixel index past the end of the object.
    #[error("pixel {index} out of range (pixel count {pixel_count})")]
    OutOfRange {
        /// The requested index.
        index: u16,
        /// The object's logical pixel count.
        pixel_count: u16,
    },

    /// An invariant broke after validation passed.
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Result type for simulation operations.
pub type LightpathResult<T> = Result<T, LightpathError>;

/// Reasons a topology snapshot is rejected on import.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Two intersections share an id.
    #[error("duplicate intersection id {0}")]
    DuplicateIntersection(u16),

    /// A record names an intersection that is not in the snapshot.
    #[error("unknown intersection id {0}")]
    UnknownIntersection(u16),

    /// Two ports share an id.
    #[error("duplicate port id {0}")]
    DuplicatePort(u16),

    /// A port record names a slot the intersection does not have, or one
    /// already taken.
    #[error("invalid slot {slot} on intersection {intersection}")]
    InvalidSlot {
        /// Owning intersection.
        intersection: u16,
        /// Offending slot.
        slot: u8,
    },

    /// A connection references a port that is missing, belongs to the
    /// wrong intersection, or is already used by another connection.
    #[error("invalid port {port} on connection {from}->{to}")]
    InvalidConnectionPort {
        /// Connection start.
        from: u16,
        /// Connection end.
        to: u16,
        /// Offending port id.
        port: u16,
    },

    /// A gap lies outside the pixel range or is inverted.
    #[error("invalid gap {from}..={to} (pixel count {pixel_count})")]
    InvalidGap {
        /// Gap start.
        from: u16,
        /// Gap end.
        to: u16,
        /// Snapshot pixel count.
        pixel_count: u16,
    },

    /// Two models share an id.
    #[error("duplicate model id {0}")]
    DuplicateModel(u8),

    /// A model weight table names a port that is not in the snapshot.
    #[error("model {model} references unknown port {port}")]
    UnknownWeightPort {
        /// Model id.
        model: u8,
        /// Offending port id.
        port: u16,
    },

    /// A weight table exceeds the override bound.
    #[error("model {model} port {port} has {count} overrides (max {max})")]
    TooManyOverrides {
        /// Model id.
        model: u8,
        /// Outgoing port id.
        port: u16,
        /// Overrides in the record.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },
}

/// Result type for snapshot import.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
