//! # Stable Identifiers
//!
//! Graph objects are addressed by small integer ids that stay valid for
//! the lifetime of the object and survive a snapshot round-trip. Lights
//! hold these ids instead of references, so removing an object can never
//! leave a dangling pointer behind: a stale id simply fails to resolve.

use serde::{Deserialize, Serialize};

/// Identifier of an intersection, unique within one topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct IntersectionId(pub u16);

/// Identifier of a port, unique within one topology's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PortId(pub u16);

/// Arena key of a connection. Not exported in snapshots; connections
/// are identified there by their endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ConnectionId(pub u32);

/// Index of a routing model.
pub type ModelId = u8;

impl IntersectionId {
    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl PortId {
    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl ConnectionId {
    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I{}", self.0)
    }
}

impl std::fmt::Display for PortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}
