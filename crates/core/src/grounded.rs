use crate::geom::Aabb;
use crate::physics::{BodyHandle, CollisionEvent};
use crate::surface::Surface;

/// Index of the first surface supporting `player`, if any.
pub fn ground_contact(player: &Aabb, surfaces: &[Surface], tolerance: f32) -> Option<usize> {
    let bottom = player.bottom();
    surfaces
        .iter()
        .position(|s| (bottom - s.top()).abs() < tolerance && s.spans_x(player.center.x))
}

#[inline]
pub fn is_grounded(player: &Aabb, surfaces: &[Surface], tolerance: f32) -> bool {
    ground_contact(player, surfaces, tolerance).is_some()
}

/// Live contact count between one body and a set of surface bodies.
#[derive(Clone, Debug, Default)]
pub struct ContactTracker {
    player: Option<BodyHandle>,
    surfaces: Vec<BodyHandle>,
    live: u32,
}

impl ContactTracker {
    pub fn new(player: BodyHandle, surfaces: impl IntoIterator<Item = BodyHandle>) -> Self {
        Self {
            player: Some(player),
            surfaces: surfaces.into_iter().collect(),
            live: 0,
        }
    }

    pub fn observe(&mut self, ev: &CollisionEvent) {
        let Some(player) = self.player else { return };
        let (a, b) = ev.pair();
        let other = if a == player {
            b
        } else if b == player {
            a
        } else {
            return;
        };
        if !self.surfaces.contains(&other) {
            return;
        }
        match ev {
            CollisionEvent::Started(..) => self.live += 1,
            CollisionEvent::Ended(..) => self.live = self.live.saturating_sub(1),
        }
    }

    pub fn touching(&self) -> bool {
        self.live > 0
    }

    pub fn live_contacts(&self) -> u32 {
        self.live
    }
}
