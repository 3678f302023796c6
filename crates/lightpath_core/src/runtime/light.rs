//! # Runtime Lights
//!
//! A light is the traveling entity: it sits in one owner (an
//! intersection or a connection), carries a float position relative to
//! that owner, and remembers the last few ports it left through so the
//! next light of its chain can follow the same path.

use lightpath_shared::{ColorRGB, INFINITE_DURATION, OUT_PORTS_MEMORY};

use crate::topology::{IntersectionId, Owner, PortId};

/// Bounded history of (intersection, out-port) choices, newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutPortMemory {
    entries: [Option<(IntersectionId, PortId)>; OUT_PORTS_MEMORY],
}

impl OutPortMemory {
    /// Records a choice, evicting the oldest one.
    pub fn remember(&mut self, intersection: IntersectionId, port: PortId) {
        self.entries.rotate_right(1);
        self.entries[0] = Some((intersection, port));
    }

    /// The most recent port chosen at `intersection`, if still remembered.
    #[must_use]
    pub fn get(&self, intersection: IntersectionId) -> Option<PortId> {
        self.entries
            .iter()
            .flatten()
            .find(|(at, _)| *at == intersection)
            .map(|(_, port)| *port)
    }
}

/// What a light painted this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightRender {
    /// Nothing.
    #[default]
    Hidden,
    /// A single pixel.
    Pixel(u16),
    /// `len` consecutive pixels starting at `start`, walking up when
    /// `ascending`, plus up to two extra endpoint pixels.
    Run {
        /// First pixel of the run.
        start: u16,
        /// Number of pixels in the run.
        len: u16,
        /// Walk direction.
        ascending: bool,
        /// Extra pixels (connection endpoints).
        ends: [Option<u16>; 2],
    },
}

impl LightRender {
    /// Calls `f` once per painted pixel.
    pub fn for_each_pixel(&self, mut f: impl FnMut(u16)) {
        match *self {
            Self::Hidden => {}
            Self::Pixel(pixel) => f(pixel),
            Self::Run {
                start,
                len,
                ascending,
                ends,
            } => {
                for step in 0..len {
                    let pixel = if ascending {
                        start.checked_add(step)
                    } else {
                        start.checked_sub(step)
                    };
                    if let Some(pixel) = pixel {
                        f(pixel);
                    }
                }
                for pixel in ends.into_iter().flatten() {
                    f(pixel);
                }
            }
        }
    }

    /// Whether anything was painted.
    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// A light managed by a light list.
#[derive(Clone, Debug)]
pub struct RuntimeLight {
    /// Position in its chain; `0` anchors a chain (no predecessor).
    pub idx: u16,
    /// Brightness ceiling after the list's lead/trail taper.
    pub max_bri: u8,
    /// Current owner, once emitted.
    pub owner: Option<Owner>,
    /// Port the light arrived through.
    pub in_port: Option<PortId>,
    /// Port the light left its last intersection through.
    pub out_port: Option<PortId>,
    out_ports: OutPortMemory,
    /// Pixels painted this frame.
    pub render: LightRender,
    /// Terminal flag; the list sweeps expired lights.
    pub is_expired: bool,
    /// Whether the light has been handed to its emitter.
    pub emitted: bool,
    /// Position relative to the owner (pixels; negative while queued).
    pub position: f32,
    /// Brightness level `0..=255` before easing and noise.
    pub bri: u16,
    /// Brightness used for rendering this frame.
    pub brightness: u8,
    /// Absolute expiry timestamp in milliseconds.
    pub life_millis: u64,
    /// Pixels per frame.
    pub speed: f32,
    /// Current color.
    pub color: ColorRGB,
    target_color: Option<ColorRGB>,
}

impl RuntimeLight {
    /// Creates a queued light.
    #[must_use]
    pub fn new(idx: u16, max_bri: u8, speed: f32, color: ColorRGB) -> Self {
        Self {
            idx,
            max_bri,
            owner: None,
            in_port: None,
            out_port: None,
            out_ports: OutPortMemory::default(),
            render: LightRender::Hidden,
            is_expired: false,
            emitted: false,
            position: -1.0,
            bri: 255,
            brightness: 0,
            life_millis: INFINITE_DURATION,
            speed,
            color,
            target_color: None,
        }
    }

    /// Sets the out-port, remembering it when chosen at an intersection.
    pub fn set_out_port(&mut self, port: Option<PortId>, at: Option<IntersectionId>) {
        self.out_port = port;
        if let (Some(port), Some(at)) = (port, at) {
            self.out_ports.remember(at, port);
        }
    }

    /// The remembered out-port history.
    #[must_use]
    pub fn out_ports(&self) -> OutPortMemory {
        self.out_ports
    }

    /// Clears what was painted last frame.
    #[inline]
    pub fn reset_pixels(&mut self) {
        self.render = LightRender::Hidden;
    }

    /// Whether the light's lifetime has run out at `now`.
    #[inline]
    #[must_use]
    pub fn should_expire(&self, now: u64) -> bool {
        now >= self.life_millis
    }

    /// Marks the light expired and detaches it from its owner.
    pub fn expire(&mut self) {
        self.is_expired = true;
        self.owner = None;
        self.render = LightRender::Hidden;
    }

    /// Requests a color change; applied at once unless `smooth`.
    pub fn change_color(&mut self, color: ColorRGB, smooth: bool) {
        if smooth {
            self.target_color = Some(color);
        } else {
            self.color = color;
            self.target_color = None;
        }
    }

    /// Moves a pending smooth color change 10% closer to its target.
    pub fn blend_color(&mut self) {
        if let Some(target) = self.target_color {
            let next = self.color.lerp(target, 0.1);
            if next == self.color {
                self.color = target;
            } else {
                self.color = next;
            }
            if self.color == target {
                self.target_color = None;
            }
        }
    }

    /// Color painted this frame.
    #[inline]
    #[must_use]
    pub fn pixel_color(&self) -> ColorRGB {
        self.color.dim(self.brightness)
    }
}
