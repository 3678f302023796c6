//! Per-list behaviour switches.

use lightpath_shared::{groups, BehaviourFlags};

/// Behaviour shared by every light of one list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Behaviour {
    /// Flag bits.
    pub flags: BehaviourFlags,
    /// Lights passing an intersection in one of these groups pick a new
    /// color. `0` disables color changes.
    pub color_change_groups: u8,
}

impl Behaviour {
    /// Creates a behaviour.
    #[inline]
    #[must_use]
    pub const fn new(flags: BehaviourFlags, color_change_groups: u8) -> Self {
        Self {
            flags,
            color_change_groups,
        }
    }

    /// Paint the whole connection span.
    #[inline]
    #[must_use]
    pub const fn render_segment(&self) -> bool {
        self.flags.contains(BehaviourFlags::RENDER_SEGMENT)
    }

    /// Random routing may turn back.
    #[inline]
    #[must_use]
    pub const fn allow_bounce(&self) -> bool {
        self.flags.contains(BehaviourFlags::ALLOW_BOUNCE)
    }

    /// Random routing must turn back.
    #[inline]
    #[must_use]
    pub const fn force_bounce(&self) -> bool {
        self.flags.contains(BehaviourFlags::FORCE_BOUNCE)
    }

    /// Expiring lights vanish mid-connection.
    #[inline]
    #[must_use]
    pub const fn expire_immediately(&self) -> bool {
        self.flags.contains(BehaviourFlags::EXPIRE_IMMEDIATE)
    }

    /// The emitter is a connection.
    #[inline]
    #[must_use]
    pub const fn emit_from_connection(&self) -> bool {
        self.flags.contains(BehaviourFlags::EMIT_FROM_CONNECTION)
    }

    /// Paint from the connection start up to the light.
    #[inline]
    #[must_use]
    pub const fn fill_ease(&self) -> bool {
        self.flags.contains(BehaviourFlags::FILL_EASE)
    }

    /// One random color per light.
    #[inline]
    #[must_use]
    pub const fn random_color(&self) -> bool {
        self.flags.contains(BehaviourFlags::RANDOM_COLOR)
    }

    /// Also paint the flipped mirror image.
    #[inline]
    #[must_use]
    pub const fn mirror_flip(&self) -> bool {
        self.flags.contains(BehaviourFlags::MIRROR_FLIP)
    }

    /// Also paint the rotated mirror image.
    #[inline]
    #[must_use]
    pub const fn mirror_rotate(&self) -> bool {
        self.flags.contains(BehaviourFlags::MIRROR_ROTATE)
    }

    /// Blend color changes over several frames.
    #[inline]
    #[must_use]
    pub const fn smooth_changes(&self) -> bool {
        self.flags.contains(BehaviourFlags::SMOOTH_CHANGES)
    }

    /// Modulate brightness with the noise field.
    #[inline]
    #[must_use]
    pub const fn constant_noise_brightness(&self) -> bool {
        self.flags.contains(BehaviourFlags::CONSTANT_NOISE_BRIGHTNESS)
    }

    /// Whether passing an intersection of `group` triggers a color change.
    #[inline]
    #[must_use]
    pub const fn changes_color_at(&self, group: u8) -> bool {
        self.color_change_groups != 0
            && groups::selects(self.color_change_groups, groups::index_of(group))
    }
}
