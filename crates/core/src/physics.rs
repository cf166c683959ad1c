use glam::Vec2;

use crate::config::BodyConfig;
use crate::geom::{overlaps, Aabb};
use crate::DT_MS;

/// Opaque id handed out by a backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

#[derive(Copy, Clone, Debug)]
pub struct BodyDesc {
    pub aabb: Aabb,
    pub config: BodyConfig,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollisionEvent {
    Started(BodyHandle, BodyHandle),
    Ended(BodyHandle, BodyHandle),
}

impl CollisionEvent {
    pub fn pair(&self) -> (BodyHandle, BodyHandle) {
        match *self {
            CollisionEvent::Started(a, b) | CollisionEvent::Ended(a, b) => (a, b),
        }
    }
}

/// What the control core needs from a rigid-body engine.
///
/// Handles are only valid on the backend that issued them; methods may panic otherwise.
pub trait PhysicsBackend {
    fn spawn(&mut self, desc: BodyDesc) -> BodyHandle;

    fn aabb(&self, body: BodyHandle) -> Aabb;

    fn position(&self, body: BodyHandle) -> Vec2 {
        self.aabb(body).center
    }

    fn rotation(&self, _body: BodyHandle) -> f32 {
        0.0
    }

    fn velocity(&self, body: BodyHandle) -> Vec2;

    fn set_velocity(&mut self, body: BodyHandle, vel: Vec2);

    /// Accumulated until the next `step`, then cleared.
    fn apply_force(&mut self, body: BodyHandle, force: Vec2);

    /// Move and/or resize a body in place.
    fn reshape(&mut self, body: BodyHandle, aabb: Aabb);

    fn step(&mut self, dt_ms: f64);

    /// Append collision notifications produced since the last drain.
    fn drain_collisions(&mut self, out: &mut Vec<CollisionEvent>);
}

/// Expansion used to count resting bodies as touching.
pub const CONTACT_SLOP: f32 = 0.5;

#[derive(Clone, Debug)]
struct Body {
    aabb: Aabb,
    vel: Vec2,
    force: Vec2,
    config: BodyConfig,
}

/// Dynamic boxes against static boxes. Velocities are pixels per `DT_MS` tick.
///
/// Dynamic bodies do not collide with each other.
#[derive(Clone, Debug)]
pub struct KinematicWorld {
    gravity: f32,
    terminal_velocity: f32,
    max_step_px: f32,
    bodies: Vec<Body>,
    contacts: Vec<(u32, u32)>,
    pending: Vec<CollisionEvent>,
}

impl KinematicWorld {
    pub fn new(gravity: f32, terminal_velocity: f32, max_step_px: f32) -> Self {
        Self {
            gravity,
            terminal_velocity,
            max_step_px: max_step_px.max(1.0),
            bodies: Vec::new(),
            contacts: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn configure(&mut self, gravity: f32, terminal_velocity: f32, max_step_px: f32) {
        self.gravity = gravity;
        self.terminal_velocity = terminal_velocity;
        self.max_step_px = max_step_px.max(1.0);
    }

    fn body(&self, h: BodyHandle) -> &Body {
        &self.bodies[h.0 as usize]
    }

    fn body_mut(&mut self, h: BodyHandle) -> &mut Body {
        &mut self.bodies[h.0 as usize]
    }

    /// Static body directly under `r`, within contact slop.
    fn support_under(&self, i: usize, r: &Aabb) -> Option<usize> {
        self.bodies.iter().enumerate().position(|(j, b)| {
            j != i
                && b.config.is_static
                && (r.bottom() - b.aabb.top()).abs() <= CONTACT_SLOP
                && r.right() > b.aabb.left()
                && r.left() < b.aabb.right()
        })
    }

    /// Some support under `r` also has `r`'s center strictly inside its span.
    fn balanced(&self, i: usize, r: &Aabb) -> bool {
        self.bodies.iter().enumerate().any(|(j, b)| {
            j != i
                && b.config.is_static
                && (r.bottom() - b.aabb.top()).abs() <= CONTACT_SLOP
                && b.aabb.left() < r.center.x
                && r.center.x < b.aabb.right()
        })
    }

    fn integrate(&mut self, i: usize, dt_ms: f32) {
        let scale = dt_ms / DT_MS as f32;

        let body = &mut self.bodies[i];
        if body.config.mass > 0.0 {
            body.vel += body.force / body.config.mass * dt_ms * dt_ms;
        }
        body.force = Vec2::ZERO;
        body.vel.y = (body.vel.y + self.gravity * scale).min(self.terminal_velocity);

        let total = body.vel * scale;
        let steps = (total.x.abs().max(total.y.abs()) / self.max_step_px).ceil().max(1.0) as i32;
        let d = total / steps as f32;

        let mut r = body.aabb;
        let mut vel = body.vel;
        let restitution = body.config.restitution;

        for _ in 0..steps {
            // X
            r.center.x += d.x;
            for b in self.bodies.iter().filter(|b| b.config.is_static) {
                if overlaps(&r, &b.aabb) {
                    if d.x > 0.0 {
                        r.center.x = b.aabb.left() - r.half.x;
                    } else if d.x < 0.0 {
                        r.center.x = b.aabb.right() + r.half.x;
                    }
                    vel.x = 0.0;
                }
            }

            // Y
            r.center.y += d.y;
            for b in self.bodies.iter().filter(|b| b.config.is_static) {
                if overlaps(&r, &b.aabb) {
                    if d.y > 0.0 {
                        r.center.y = b.aabb.top() - r.half.y;
                        if vel.y > 0.0 {
                            vel.y = -vel.y * restitution.max(b.config.restitution);
                        }
                    } else if d.y < 0.0 {
                        r.center.y = b.aabb.bottom() + r.half.y;
                        if vel.y < 0.0 {
                            vel.y = 0.0;
                        }
                    }
                }
            }
        }

        if let Some(j) = self.support_under(i, &r) {
            let support = &self.bodies[j].aabb;
            if self.balanced(i, &r) {
                let mu = self.bodies[i].config.friction.min(self.bodies[j].config.friction);
                vel.x *= (1.0 - mu.clamp(0.0, 1.0)).powf(scale);
            } else {
                // Center hangs past the edge: tip off toward the overhang.
                let dir = if r.center.x >= support.right() { 1.0 } else { -1.0 };
                vel.x += dir * self.gravity.max(0.0) * scale;
            }
        }

        let body = &mut self.bodies[i];
        body.aabb = r;
        body.vel = vel;
    }

    fn refresh_contacts(&mut self) {
        let mut now = Vec::new();
        for (i, a) in self.bodies.iter().enumerate() {
            if a.config.is_static {
                continue;
            }
            let probe = a.aabb.inflate(CONTACT_SLOP);
            for (j, b) in self.bodies.iter().enumerate() {
                if i != j && b.config.is_static && overlaps(&probe, &b.aabb) {
                    now.push((i as u32, j as u32));
                }
            }
        }

        for &(a, b) in &self.contacts {
            if !now.contains(&(a, b)) {
                self.pending.push(CollisionEvent::Ended(BodyHandle(a), BodyHandle(b)));
            }
        }
        for &(a, b) in &now {
            if !self.contacts.contains(&(a, b)) {
                self.pending.push(CollisionEvent::Started(BodyHandle(a), BodyHandle(b)));
            }
        }
        self.contacts = now;
    }
}

impl PhysicsBackend for KinematicWorld {
    fn spawn(&mut self, desc: BodyDesc) -> BodyHandle {
        let h = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body {
            aabb: desc.aabb,
            vel: Vec2::ZERO,
            force: Vec2::ZERO,
            config: desc.config,
        });
        h
    }

    fn aabb(&self, body: BodyHandle) -> Aabb {
        self.body(body).aabb
    }

    fn velocity(&self, body: BodyHandle) -> Vec2 {
        self.body(body).vel
    }

    fn set_velocity(&mut self, body: BodyHandle, vel: Vec2) {
        let b = self.body_mut(body);
        if !b.config.is_static {
            b.vel = vel;
        }
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        let b = self.body_mut(body);
        if !b.config.is_static {
            b.force += force;
        }
    }

    fn reshape(&mut self, body: BodyHandle, aabb: Aabb) {
        self.body_mut(body).aabb = aabb;
    }

    fn step(&mut self, dt_ms: f64) {
        log::trace!("kinematic step dt={dt_ms}ms bodies={}", self.bodies.len());
        for i in 0..self.bodies.len() {
            if !self.bodies[i].config.is_static {
                self.integrate(i, dt_ms as f32);
            }
        }
        self.refresh_contacts();
    }

    fn drain_collisions(&mut self, out: &mut Vec<CollisionEvent>) {
        out.append(&mut self.pending);
    }
}
