//! # Light Owners
//!
//! A light always sits in exactly one owner: an intersection (dwelling
//! on its pixel and waiting to be routed) or a connection (traveling
//! along its LEDs). The owner is stored on the light as a tagged id and
//! dispatched with a `match`, so the topology stays the single owner of
//! graph objects.

use lightpath_shared::MAX_HOPS_PER_UPDATE;

use crate::runtime::{LightContext, RuntimeLight};

use super::ids::{ConnectionId, IntersectionId};

/// The object currently holding a light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Dwelling at an intersection.
    Intersection(IntersectionId),
    /// Traveling along a connection.
    Connection(ConnectionId),
}

impl Owner {
    /// Group mask of the owner, if it still exists.
    #[must_use]
    pub fn group(self, ctx: &LightContext<'_>) -> Option<u8> {
        match self {
            Self::Intersection(id) => ctx.topology.intersection(id).map(|i| i.group),
            Self::Connection(id) => ctx.topology.connection(id).map(|c| c.group),
        }
    }

    /// Hands a freshly released light to this owner.
    ///
    /// An owner that no longer exists expires the light.
    pub fn emit(self, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) {
        light.emitted = true;
        let topology = ctx.topology;
        let next = match self {
            Self::Intersection(id) => match topology.intersection(id) {
                Some(intersection) => {
                    intersection.emit(light, ctx);
                    None
                }
                None => expire_orphan(light, self),
            },
            Self::Connection(id) => match topology.connection(id) {
                Some(connection) => connection.emit(light),
                None => expire_orphan(light, self),
            },
        };
        route(next, light, ctx);
    }

    /// Advances a light held by this owner by one render step, following
    /// every hand-off it makes within the frame.
    pub fn update(self, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) {
        let next = self.step(light, ctx);
        route(next, light, ctx);
    }

    /// One render step in this owner.
    ///
    /// # Returns
    ///
    /// The owner the light moves to, if it left this one.
    fn step(self, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) -> Option<Self> {
        let topology = ctx.topology;
        match self {
            Self::Intersection(id) => match topology.intersection(id) {
                Some(intersection) => intersection.update(light, ctx),
                None => expire_orphan(light, self),
            },
            Self::Connection(id) => match topology.connection(id) {
                Some(connection) => connection.update(light, ctx),
                None => expire_orphan(light, self),
            },
        }
    }

    /// Takes ownership of an arriving light.
    fn enter(self, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) {
        light.owner = Some(self);
        if let Self::Intersection(id) = self {
            if let Some(intersection) = ctx.topology.intersection(id) {
                intersection.arrive(light, ctx);
            }
        }
    }
}

/// Follows hand-offs until the light settles, at most
/// `MAX_HOPS_PER_UPDATE` of them. A light stopped by the cap waits in its
/// new owner and keeps the rest of its position for the next frame.
fn route(mut next: Option<Owner>, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) {
    let mut hops = 0;
    while let Some(owner) = next {
        owner.enter(light, ctx);
        hops += 1;
        if hops >= MAX_HOPS_PER_UPDATE {
            tracing::trace!("light parked at {:?} after {} hops", owner, hops);
            return;
        }
        next = owner.step(light, ctx);
    }
}

fn expire_orphan(light: &mut RuntimeLight, owner: Owner) -> Option<Owner> {
    tracing::debug!("light owner {:?} no longer exists, expiring light", owner);
    light.expire();
    None
}
