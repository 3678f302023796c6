//! # Connections
//!
//! Graph edges. A connection joins two intersections through a pair of
//! ports and covers a run of physical LEDs between their pixels. A
//! connection with no LEDs is a logical bridge: lights cross it within
//! the same tick and it never renders.
//!
//! ## Pixel Span
//!
//! The run starts one pixel after the `from` anchor and stops one pixel
//! before the `to` anchor. When an intersection has a secondary pixel,
//! every anchor pairing is tried and the shortest plausible run wins.

use crate::runtime::{LightContext, LightRender, RuntimeLight};

use super::ids::{ConnectionId, IntersectionId, PortId};
use super::intersection::Intersection;
use super::owner::Owner;

/// Runs this short are treated as adjacent intersections, not a strip.
const MIN_RUN_EXCLUSIVE: i32 = 4;

/// Resolved pixel geometry of one anchor pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelSpan {
    pub(crate) ascending: bool,
    pub(crate) from_pixel: i32,
    pub(crate) to_pixel: i32,
    pub(crate) from_anchor: u16,
    pub(crate) to_anchor: u16,
}

impl PixelSpan {
    fn between(from_anchor: u16, to_anchor: u16) -> Self {
        let ascending = to_anchor > from_anchor;
        let step = if ascending { 1 } else { -1 };
        Self {
            ascending,
            from_pixel: i32::from(from_anchor) + step,
            to_pixel: i32::from(to_anchor) - step,
            from_anchor,
            to_anchor,
        }
    }

    fn count(&self) -> i32 {
        (self.from_pixel - self.to_pixel).abs() + 1
    }

    /// Picks the span of a new connection and its computed LED count
    /// (0 when no pairing forms a plausible run).
    pub(crate) fn resolve(from: &Intersection, to: &Intersection, pixel_count: u16) -> (Self, u16) {
        let pairings = [
            Some((from.top_pixel, to.top_pixel)),
            from.bottom_pixel.map(|bottom| (bottom, to.top_pixel)),
            to.bottom_pixel.map(|bottom| (from.top_pixel, bottom)),
            from.bottom_pixel.zip(to.bottom_pixel),
        ];
        let upper = i32::from(pixel_count) - MIN_RUN_EXCLUSIVE;

        let mut best: Option<(Self, i32)> = None;
        for (a, b) in pairings.into_iter().flatten() {
            let span = Self::between(a, b);
            let count = span.count();
            if count <= MIN_RUN_EXCLUSIVE || count >= upper {
                continue;
            }
            if best.map_or(true, |(_, best_count)| count <= best_count) {
                best = Some((span, count));
            }
        }

        match best {
            Some((span, count)) => (span, count as u16),
            None => (Self::between(from.top_pixel, to.top_pixel), 0),
        }
    }
}

/// A graph edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Arena id.
    pub id: ConnectionId,
    /// Start intersection.
    pub from: IntersectionId,
    /// End intersection.
    pub to: IntersectionId,
    /// Group mask.
    pub group: u8,
    /// Port on the `from` intersection.
    pub from_port: PortId,
    /// Port on the `to` intersection.
    pub to_port: PortId,
    /// Physical LEDs; 0 for a logical bridge.
    pub num_leds: u16,
    /// Whether LED pixels count up from `from` to `to`.
    pub pixel_dir: bool,
    /// Pixel of LED 0.
    pub from_pixel: i32,
    /// Pixel of the last LED.
    pub to_pixel: i32,
    from_anchor: u16,
    to_anchor: u16,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        ends: (IntersectionId, IntersectionId),
        ports: (PortId, PortId),
        group: u8,
        span: PixelSpan,
        num_leds: u16,
    ) -> Self {
        Self {
            id,
            from: ends.0,
            to: ends.1,
            group,
            from_port: ports.0,
            to_port: ports.1,
            num_leds,
            pixel_dir: span.ascending,
            from_pixel: span.from_pixel,
            to_pixel: span.to_pixel,
            from_anchor: span.from_anchor,
            to_anchor: span.to_anchor,
        }
    }

    /// Whether lights cross this connection without rendering.
    #[inline]
    #[must_use]
    pub const fn is_bridge(&self) -> bool {
        self.num_leds == 0
    }

    /// Pixel of the anchor at the `from` end.
    #[inline]
    #[must_use]
    pub const fn from_anchor(&self) -> u16 {
        self.from_anchor
    }

    /// Pixel of the anchor at the `to` end.
    #[inline]
    #[must_use]
    pub const fn to_anchor(&self) -> u16 {
        self.to_anchor
    }

    /// Pixel of LED `led`, counted from the `from` end.
    #[must_use]
    pub fn led_pixel(&self, led: u16) -> Option<u16> {
        let offset = i32::from(led);
        let pixel = if self.pixel_dir {
            self.from_pixel + offset
        } else {
            self.from_pixel - offset
        };
        u16::try_from(pixel).ok()
    }

    /// Whether the light entered through the `to` end.
    fn reversed(&self, light: &RuntimeLight) -> bool {
        light.out_port == Some(self.to_port)
    }

    /// Takes a light that just left an intersection through one of this
    /// connection's ports. A bridge forwards it straight to the far end.
    ///
    /// # Returns
    ///
    /// The light's next owner.
    pub(crate) fn enter(&self, light: &mut RuntimeLight) -> Owner {
        if self.num_leds > 0 {
            Owner::Connection(self.id)
        } else {
            self.outgoing(light)
        }
    }

    /// Receives a freshly released light at the `from` end.
    pub(crate) fn emit(&self, light: &mut RuntimeLight) -> Option<Owner> {
        light.set_out_port(Some(self.from_port), Some(self.from));
        Some(self.enter(light))
    }

    /// Renders, expires or forwards a resident light.
    ///
    /// # Returns
    ///
    /// The far intersection once the light runs off the end.
    pub(crate) fn update(
        &self,
        light: &mut RuntimeLight,
        ctx: &mut LightContext<'_>,
    ) -> Option<Owner> {
        light.reset_pixels();
        if light.should_expire(ctx.now) && (light.speed == 0.0 || ctx.forces_expiry()) {
            light.expire();
            return None;
        }
        if self.render(light, ctx) {
            None
        } else {
            Some(self.outgoing(light))
        }
    }

    /// Paints the light if it is still on this connection.
    fn render(&self, light: &mut RuntimeLight, ctx: &LightContext<'_>) -> bool {
        let leds = f32::from(self.num_leds);
        let rounded = (light.position * 1000.0).round() / 1000.0;
        if self.num_leds == 0 || rounded >= leds {
            return false;
        }

        let eased = ctx.ease.map(light.position, 0.0, leds, 0.0, leds);
        let reversed = self.reversed(light);
        let raw = if reversed {
            (leds - eased - 1.0).ceil()
        } else {
            eased.floor()
        };
        let led = (raw as i32).clamp(0, i32::from(self.num_leds) - 1) as u16;

        light.render = if ctx.behaviour.render_segment() {
            self.segment()
        } else if ctx.behaviour.fill_ease() {
            self.fill(led, reversed)
        } else {
            self.led_pixel(led).map_or(LightRender::Hidden, LightRender::Pixel)
        };
        true
    }

    /// Every LED plus both anchors.
    fn segment(&self) -> LightRender {
        match self.led_pixel(0) {
            Some(start) => LightRender::Run {
                start,
                len: self.num_leds,
                ascending: self.pixel_dir,
                ends: [Some(self.from_anchor), Some(self.to_anchor)],
            },
            None => LightRender::Hidden,
        }
    }

    /// LEDs from the entry end up to `led`.
    fn fill(&self, led: u16, reversed: bool) -> LightRender {
        let (entry, len, ascending) = if reversed {
            (self.num_leds - 1, self.num_leds - led, !self.pixel_dir)
        } else {
            (0, led + 1, self.pixel_dir)
        };
        match self.led_pixel(entry) {
            Some(start) => LightRender::Run {
                start,
                len,
                ascending,
                ends: [None, None],
            },
            None => LightRender::Hidden,
        }
    }

    /// Points the light at the far intersection.
    fn outgoing(&self, light: &mut RuntimeLight) -> Owner {
        light.position -= f32::from(self.num_leds);
        let reversed = self.reversed(light);
        let (in_port, target) = if reversed {
            (self.from_port, self.from)
        } else {
            (self.to_port, self.to)
        };
        light.in_port = Some(in_port);
        light.set_out_port(None, None);
        Owner::Intersection(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u16, top: u16, bottom: Option<u16>) -> Intersection {
        Intersection::new(IntersectionId(id), 2, top, bottom, 1)
    }

    #[test]
    fn test_span_between_tops() {
        let (span, leds) = PixelSpan::resolve(&node(0, 0, None), &node(1, 29, None), 30);
        assert!(span.ascending);
        assert_eq!(span.from_pixel, 1);
        assert_eq!(span.to_pixel, 28);
        assert_eq!(leds, 0, "a run covering the whole object is implausible");

        let (span, leds) = PixelSpan::resolve(&node(0, 20, None), &node(1, 5, None), 100);
        assert!(!span.ascending);
        assert_eq!(span.from_pixel, 19);
        assert_eq!(span.to_pixel, 6);
        assert_eq!(leds, 14);
    }

    #[test]
    fn test_span_prefers_shortest_pairing() {
        let center = node(0, 72, Some(216));
        let edge = node(1, 287, None);
        let (span, leds) = PixelSpan::resolve(&center, &edge, 288);
        assert_eq!(span.from_anchor, 216);
        assert_eq!(span.from_pixel, 217);
        assert_eq!(span.to_pixel, 286);
        assert_eq!(leds, 70);
    }

    #[test]
    fn test_adjacent_intersections_form_a_bridge() {
        let (_, leds) = PixelSpan::resolve(&node(0, 10, None), &node(1, 12, None), 100);
        assert_eq!(leds, 0);
    }

    #[test]
    fn test_led_pixel_walks_both_directions() {
        let up = PixelSpan::between(0, 10);
        let connection = Connection::new(
            ConnectionId(0),
            (IntersectionId(0), IntersectionId(1)),
            (PortId(0), PortId(1)),
            1,
            up,
            9,
        );
        assert_eq!(connection.led_pixel(0), Some(1));
        assert_eq!(connection.led_pixel(8), Some(9));

        let down = PixelSpan::between(10, 0);
        let connection = Connection::new(
            ConnectionId(1),
            (IntersectionId(1), IntersectionId(0)),
            (PortId(2), PortId(3)),
            1,
            down,
            9,
        );
        assert_eq!(connection.led_pixel(0), Some(9));
        assert_eq!(connection.led_pixel(8), Some(1));
    }
}
