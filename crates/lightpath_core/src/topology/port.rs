//! Connection endpoints.

use super::ids::{ConnectionId, IntersectionId, PortId};

/// One end of a connection, attached to a slot of an intersection.
///
/// `direction` is `false` on the connection's `from` end and `true` on
/// its `to` end. A light that left an intersection through a `true` port
/// travels the connection backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Port {
    /// Stable id, used as a routing-table key.
    pub id: PortId,
    /// The intersection whose slot holds this port.
    pub intersection: IntersectionId,
    /// The connection this port terminates.
    pub connection: ConnectionId,
    /// `true` on the connection's `to` end.
    pub direction: bool,
    /// Group mask inherited from the connection.
    pub group: u8,
}
