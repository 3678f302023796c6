//! Everything an owner needs to move one light through one frame.

use lightpath_procedural::{Ease, Random};

use crate::topology::{Model, Topology};

use super::behaviour::Behaviour;
use super::light::OutPortMemory;

/// Borrowed view of the simulation handed down the routing calls.
///
/// Built fresh for every light update, so the owner code never touches
/// global state: the clock, the random stream and the list settings all
/// arrive through here.
pub struct LightContext<'a> {
    /// The graph the light travels on.
    pub topology: &'a Topology,
    /// The list's routing model.
    pub model: &'a Model,
    /// The list's behaviour.
    pub behaviour: &'a Behaviour,
    /// Easing for travel along connections.
    pub ease: Ease,
    /// The list was stopped and must drain at once.
    pub stopped: bool,
    /// Current timestamp in milliseconds.
    pub now: u64,
    /// Random stream.
    pub random: &'a mut Random,
    /// Out-port history of the preceding light in the chain.
    pub prev_out_ports: Option<OutPortMemory>,
}

impl LightContext<'_> {
    /// Whether expiring lights must vanish mid-connection.
    #[inline]
    #[must_use]
    pub fn forces_expiry(&self) -> bool {
        self.stopped || self.behaviour.expire_immediately()
    }
}
