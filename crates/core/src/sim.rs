use std::collections::VecDeque;

use glam::Vec2;

use crate::config::{BodyConfig, GroundingPolicy, Params};
use crate::controller::{ControlReport, MotionState, MovementController};
use crate::error::Result;
use crate::geom::Aabb;
use crate::grounded::{ground_contact, ContactTracker};
use crate::input::{InputTracker, Key};
use crate::physics::{BodyDesc, BodyHandle, CollisionEvent, KinematicWorld, PhysicsBackend};
use crate::render::{DrawHandle, Renderer};
use crate::surface::{demo_layout, Surface, Viewport};

/// Host events, queued by callbacks and applied at the start of the next tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    KeyDown(String),
    KeyUp(String),
    Key { key: Key, pressed: bool },
    Resize { width: f32, height: f32 },
    /// Window lost focus: release every key.
    Blur,
}

#[derive(Copy, Clone, Debug)]
pub struct PlayerSpawn {
    pub position: Vec2,
    pub size: Vec2,
    pub config: BodyConfig,
}

impl Default for PlayerSpawn {
    fn default() -> Self {
        Self {
            position: Vec2::new(100.0, 300.0),
            size: Vec2::new(40.0, 60.0),
            config: BodyConfig::player(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub now_ms: f64,
    pub grounded: bool,
    /// Surface index under the player, from the proximity test.
    pub support: Option<usize>,
    pub control: ControlReport,
    pub ignored_inputs: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub ticks: u32,
    pub jumped: bool,
    pub landed: bool,
    pub last: Option<TickReport>,
}

/// Converts wall-clock frame times into a bounded number of fixed ticks.
#[derive(Copy, Clone, Debug, Default)]
pub struct FixedTimestep {
    last_ms: Option<f64>,
    acc_ms: f64,
}

impl FixedTimestep {
    /// Ticks due at `now_ms`. The first call always yields one.
    pub fn advance(&mut self, now_ms: f64, dt_ms: f64, max_ticks: u32) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 1;
        };
        self.acc_ms += (now_ms - last).max(0.0);
        let due = (self.acc_ms / dt_ms).floor() as u64;
        if due > max_ticks as u64 {
            log::warn!("frame backlog of {due} ticks, running {max_ticks} and dropping the rest");
            self.acc_ms = 0.0;
            return max_ticks;
        }
        self.acc_ms -= due as f64 * dt_ms;
        due as u32
    }
}

pub struct Simulation<P: PhysicsBackend = KinematicWorld> {
    params: Params,
    viewport: Viewport,
    physics: P,
    player: BodyHandle,
    player_spawn: PlayerSpawn,
    surfaces: Vec<Surface>,
    surface_bodies: Vec<BodyHandle>,
    input: InputTracker,
    controller: MovementController,
    contacts: ContactTracker,
    queue: VecDeque<Command>,
    collisions: Vec<CollisionEvent>,
    clock: FixedTimestep,
    frame: u64,
    draw: Option<Vec<DrawHandle>>,
    layout_dirty: bool,
}

impl Simulation<KinematicWorld> {
    /// The demo level on the bundled kinematic world.
    pub fn new(params: Params, viewport: Viewport) -> Result<Self> {
        params.validate()?;
        let world = KinematicWorld::new(params.gravity, params.terminal_velocity, params.max_step_px);
        let surfaces = demo_layout(viewport)?;
        Self::with_backend(params, viewport, world, surfaces, PlayerSpawn::default())
    }

    /// Swap tunables. World settings are rebuilt; bodies keep their state.
    pub fn set_params(&mut self, params: Params) -> Result<()> {
        params.validate()?;
        self.physics
            .configure(params.gravity, params.terminal_velocity, params.max_step_px);
        self.params = params;
        Ok(())
    }
}

impl<P: PhysicsBackend> Simulation<P> {
    pub fn with_backend(
        params: Params,
        viewport: Viewport,
        mut physics: P,
        surfaces: Vec<Surface>,
        spawn: PlayerSpawn,
    ) -> Result<Self> {
        params.validate()?;

        let surface_bodies: Vec<BodyHandle> = surfaces
            .iter()
            .map(|s| {
                physics.spawn(BodyDesc {
                    aabb: s.aabb,
                    config: BodyConfig::fixed(s.fill_color),
                })
            })
            .collect();
        let player = physics.spawn(BodyDesc {
            aabb: Aabb::new(spawn.position, spawn.size * 0.5),
            config: spawn.config,
        });

        log::debug!(
            "simulation ready: viewport {}x{}, {} surfaces",
            viewport.width,
            viewport.height,
            surfaces.len()
        );

        Ok(Self {
            params,
            viewport,
            physics,
            player,
            player_spawn: spawn,
            contacts: ContactTracker::new(player, surface_bodies.iter().copied()),
            surfaces,
            surface_bodies,
            input: InputTracker::new(),
            controller: MovementController::new(),
            queue: VecDeque::new(),
            collisions: Vec::new(),
            clock: FixedTimestep::default(),
            frame: 0,
            draw: None,
            layout_dirty: false,
        })
    }

    pub fn push(&mut self, cmd: Command) {
        self.queue.push_back(cmd);
    }

    pub fn key_down(&mut self, code: &str) {
        self.push(Command::KeyDown(code.to_owned()));
    }

    pub fn key_up(&mut self, code: &str) {
        self.push(Command::KeyUp(code.to_owned()));
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.push(Command::Resize { width, height });
    }

    /// Put the player back at its spawn point, at rest.
    pub fn reset_player(&mut self) {
        let spawn = self.player_spawn;
        self.physics
            .reshape(self.player, Aabb::new(spawn.position, spawn.size * 0.5));
        self.physics.set_velocity(self.player, Vec2::ZERO);
        self.controller = MovementController::new();
    }

    fn apply(&mut self, cmd: Command) -> bool {
        let res = match cmd {
            Command::KeyDown(code) => self.input.set_key(&code, true),
            Command::KeyUp(code) => self.input.set_key(&code, false),
            Command::Key { key, pressed } => {
                self.input.set(key, pressed);
                Ok(())
            }
            Command::Resize { width, height } => self.relayout(width, height),
            Command::Blur => {
                self.input.clear();
                Ok(())
            }
        };
        match res {
            Ok(()) => true,
            Err(e) => {
                log::debug!("ignoring host event: {e}");
                false
            }
        }
    }

    fn relayout(&mut self, width: f32, height: f32) -> Result<()> {
        let vp = Viewport::new(width, height)?;
        // Validate every surface before touching any of them.
        let mut next = self.surfaces.clone();
        for s in &mut next {
            s.relayout(vp)?;
        }
        for (s, &body) in next.iter().zip(&self.surface_bodies) {
            self.physics.reshape(body, s.aabb);
        }

        // A resting player rides its support to the new height.
        let player = self.physics.aabb(self.player);
        if let Some(i) = ground_contact(&player, &self.surfaces, self.params.ground_tolerance) {
            let dy = next[i].top() - self.surfaces[i].top();
            if dy != 0.0 {
                let mut moved = player;
                moved.center.y += dy;
                self.physics.reshape(self.player, moved);
            }
        }

        self.surfaces = next;
        self.viewport = vp;
        self.layout_dirty = true;
        log::debug!("relayout for viewport {width}x{height}");
        Ok(())
    }

    /// One fixed step at wall time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        let mut ignored = 0;
        while let Some(cmd) = self.queue.pop_front() {
            if !self.apply(cmd) {
                ignored += 1;
            }
        }

        self.physics.step(self.params.fixed_dt_ms);
        self.physics.drain_collisions(&mut self.collisions);
        for ev in self.collisions.drain(..) {
            self.contacts.observe(&ev);
        }

        let support = ground_contact(
            &self.physics.aabb(self.player),
            &self.surfaces,
            self.params.ground_tolerance,
        );
        let grounded = match self.params.grounding_policy {
            GroundingPolicy::Proximity => support.is_some(),
            GroundingPolicy::Contact => self.contacts.touching(),
        };

        let control = self.controller.update(
            &self.params,
            now_ms,
            self.input.controls(),
            grounded,
            &mut self.physics,
            self.player,
        );

        self.frame += 1;
        log::trace!(
            "tick {} t={now_ms:.1} grounded={grounded} state={:?}",
            self.frame,
            control.state
        );

        TickReport {
            frame: self.frame,
            now_ms,
            grounded,
            support,
            control,
            ignored_inputs: ignored,
        }
    }

    /// Run however many fixed ticks wall time `now_ms` calls for.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let dt = self.params.fixed_dt_ms;
        let n = self.clock.advance(now_ms, dt, self.params.max_ticks_per_frame);
        let mut out = FrameReport::default();
        for k in 0..n {
            let t = now_ms - (n - 1 - k) as f64 * dt;
            let r = self.tick(t);
            out.jumped |= r.control.jumped;
            out.landed |= r.control.landed;
            out.last = Some(r);
        }
        out.ticks = n;
        out
    }

    /// Push body transforms to the renderer, creating primitives on first use.
    pub fn sync_renderer<R: Renderer>(&mut self, renderer: &mut R) {
        if self.draw.is_none() {
            let mut h = Vec::with_capacity(self.surfaces.len() + 1);
            h.push(renderer.create_rect(self.player_spawn.size, self.player_spawn.config.fill_color));
            for s in &self.surfaces {
                h.push(renderer.create_rect(s.aabb.size(), s.fill_color));
            }
            self.draw = Some(h);
            self.layout_dirty = false;
        }
        let Some(handles) = self.draw.as_ref() else {
            return;
        };

        if self.layout_dirty {
            for (s, &h) in self.surfaces.iter().zip(&handles[1..]) {
                renderer.set_size(h, s.aabb.size());
            }
            self.layout_dirty = false;
        }

        let bodies = std::iter::once(self.player).chain(self.surface_bodies.iter().copied());
        for (body, &h) in bodies.zip(handles.iter()) {
            renderer.set_transform(h, self.physics.position(body), self.physics.rotation(body));
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn player_aabb(&self) -> Aabb {
        self.physics.aabb(self.player)
    }

    pub fn player_velocity(&self) -> Vec2 {
        self.physics.velocity(self.player)
    }

    pub fn motion_state(&self) -> MotionState {
        self.controller.state()
    }

    /// Proximity test against the current layout.
    pub fn is_grounded(&self) -> bool {
        ground_contact(&self.player_aabb(), &self.surfaces, self.params.ground_tolerance).is_some()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveMode;
    use crate::render::DrawList;
    use crate::surface::{Anchor, SurfaceKind, PLATFORM_COLOR};
    use crate::DT_MS;

    fn approx_eq(a: f32, b: f32) {
        let eps = 1e-4;
        assert!((a - b).abs() <= eps, "expected {b}, got {a} (diff {})", (a - b).abs());
    }

    fn demo() -> Simulation {
        Simulation::new(Params::default(), Viewport::new(800.0, 600.0).unwrap()).unwrap()
    }

    /// Ticks until the player has settled, returns the next timestamp index.
    fn settle(sim: &mut Simulation) -> u64 {
        for i in 0..120 {
            sim.tick(i as f64 * DT_MS);
        }
        120
    }

    #[test]
    fn spawned_player_lands_on_ground() {
        let mut sim = demo();
        settle(&mut sim);
        assert!(sim.is_grounded());
        assert_eq!(sim.motion_state(), MotionState::Grounded);
        approx_eq(sim.player_aabb().bottom(), sim.surfaces()[0].top());
    }

    #[test]
    fn jump_sets_impulse_once_while_held() {
        let mut sim = demo();
        let mut i = settle(&mut sim);

        sim.key_down("Space");
        let r = sim.tick(i as f64 * DT_MS);
        i += 1;
        assert!(r.control.jumped);
        assert_eq!(sim.player_velocity().y, -10.0);

        let mut jumps = 1;
        for _ in 0..300 {
            let r = sim.tick(i as f64 * DT_MS);
            i += 1;
            jumps += r.control.jumped as u32;
        }
        assert_eq!(jumps, 1);
        assert_eq!(sim.motion_state(), MotionState::Grounded);

        sim.key_up("Space");
        sim.tick(i as f64 * DT_MS);
        sim.key_down("KeyW");
        assert!(sim.tick((i + 1) as f64 * DT_MS).control.jumped);
    }

    #[test]
    fn walking_right_on_ground() {
        let mut sim = demo();
        let i = settle(&mut sim);
        sim.key_down("ArrowRight");
        let x0 = sim.player_aabb().center.x;
        sim.tick(i as f64 * DT_MS);
        approx_eq(sim.player_velocity().x, 5.0);
        sim.tick((i + 1) as f64 * DT_MS);
        assert!(sim.player_aabb().center.x > x0);

        sim.key_down("KeyA");
        sim.tick((i + 2) as f64 * DT_MS);
        approx_eq(sim.player_velocity().x, 0.0);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut sim = demo();
        sim.key_down("KeyQ");
        sim.key_down("ArrowLeft");
        let r = sim.tick(0.0);
        assert_eq!(r.ignored_inputs, 1);
        assert!(sim.input().is_pressed("ArrowLeft"));
        assert!(!sim.input().is_pressed("KeyQ"));
    }

    #[test]
    fn blur_releases_keys() {
        let mut sim = demo();
        sim.key_down("ArrowLeft");
        sim.tick(0.0);
        sim.push(Command::Blur);
        sim.tick(DT_MS);
        assert!(sim.input().controls().is_empty());
    }

    #[test]
    fn resize_moves_ground_for_later_checks() {
        let mut sim = demo();
        let i = settle(&mut sim);
        assert!(sim.is_grounded());

        sim.resize(80.0, 600.0);
        let r = sim.tick(i as f64 * DT_MS);
        assert_eq!(sim.surfaces()[0].aabb.center.x, 40.0);
        assert!(!r.grounded);
        assert!(!sim.is_grounded());
    }

    #[test]
    fn taller_viewport_carries_resting_player_down() {
        let mut sim = demo();
        let i = settle(&mut sim);
        sim.resize(800.0, 700.0);
        let r = sim.tick(i as f64 * DT_MS);
        assert_eq!(sim.surfaces()[0].top(), 660.0);
        assert!(r.grounded);
        assert!(!r.control.left_ground);
        approx_eq(sim.player_aabb().bottom(), 660.0);
    }

    #[test]
    fn shorter_viewport_lifts_resting_player() {
        let mut sim = demo();
        let mut i = settle(&mut sim);
        sim.resize(800.0, 500.0);
        for _ in 0..300 {
            let r = sim.tick(i as f64 * DT_MS);
            i += 1;
            assert!(r.grounded, "fell through at tick {i}");
        }
        assert_eq!(sim.surfaces()[0].top(), 460.0);
        approx_eq(sim.player_aabb().bottom(), 460.0);
        assert_eq!(sim.motion_state(), MotionState::Grounded);
    }

    #[test]
    fn player_landing_on_platform_edge_tips_to_ground() {
        let spawn = PlayerSpawn {
            position: Vec2::new(410.0, 400.0),
            ..PlayerSpawn::default()
        };
        let p = Params::default();
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let world = KinematicWorld::new(p.gravity, p.terminal_velocity, p.max_step_px);
        let mut sim = Simulation::with_backend(p, vp, world, demo_layout(vp).unwrap(), spawn).unwrap();
        let mut last = TickReport::default();
        for i in 0..200 {
            last = sim.tick(i as f64 * DT_MS);
        }
        assert_eq!(last.support, Some(0));
        assert_eq!(sim.motion_state(), MotionState::Grounded);
        assert!(sim.player_aabb().center.x > 410.0);

        sim.key_down("Space");
        assert!(sim.tick(200.0 * DT_MS).control.jumped);
    }

    #[test]
    fn bad_resize_keeps_old_layout() {
        let mut sim = demo();
        sim.resize(-1.0, 600.0);
        let r = sim.tick(0.0);
        assert_eq!(r.ignored_inputs, 1);
        assert_eq!(sim.viewport().width, 800.0);
    }

    #[test]
    fn contact_policy_allows_jump_after_landing() {
        let params = Params {
            grounding_policy: GroundingPolicy::Contact,
            ..Params::default()
        };
        let mut sim = Simulation::new(params, Viewport::new(800.0, 600.0).unwrap()).unwrap();
        let i = settle(&mut sim);
        assert_eq!(sim.motion_state(), MotionState::Grounded);
        sim.key_down("ArrowUp");
        assert!(sim.tick(i as f64 * DT_MS).control.jumped);
        let r = sim.tick((i + 1) as f64 * DT_MS);
        assert!(!r.grounded);
    }

    #[test]
    fn force_drive_still_jumps() {
        let params = Params {
            drive_mode: DriveMode::Force,
            ..Params::default()
        };
        let mut sim = Simulation::new(params, Viewport::new(800.0, 600.0).unwrap()).unwrap();
        let i = settle(&mut sim);
        let y0 = sim.player_aabb().center.y;
        sim.key_down("Space");
        assert!(sim.tick(i as f64 * DT_MS).control.jumped);
        sim.tick((i + 1) as f64 * DT_MS);
        assert!(sim.player_aabb().center.y < y0);
    }

    #[test]
    fn lands_on_platform() {
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let platform = Surface::new(
            SurfaceKind::Platform,
            Anchor::FromBottom { x: 300.0, rise: 100.0, width: 200.0, height: 20.0 },
            PLATFORM_COLOR,
            vp,
        )
        .unwrap();
        let spawn = PlayerSpawn {
            position: Vec2::new(300.0, 400.0),
            ..PlayerSpawn::default()
        };
        let p = Params::default();
        let world = KinematicWorld::new(p.gravity, p.terminal_velocity, p.max_step_px);
        let mut sim = Simulation::with_backend(p, vp, world, vec![platform], spawn).unwrap();
        let mut last = TickReport::default();
        for i in 0..120 {
            last = sim.tick(i as f64 * DT_MS);
        }
        assert_eq!(last.support, Some(0));
        assert!(last.grounded);
    }

    #[test]
    fn frame_runs_fixed_ticks_and_caps_backlog() {
        let mut sim = demo();
        assert_eq!(sim.frame(1000.0).ticks, 1);
        assert_eq!(sim.frame(1000.0 + 2.0 * DT_MS + 1.0).ticks, 2);
        assert_eq!(sim.frame(5000.0).ticks, 5);
        assert_eq!(sim.frame(5000.0).ticks, 0);
        assert_eq!(sim.frame_count(), 8);
    }

    #[test]
    fn renderer_tracks_bodies_and_resize() {
        let mut sim = demo();
        let mut list = DrawList::new();
        sim.tick(0.0);
        sim.sync_renderer(&mut list);
        assert_eq!(list.sprites().len(), 4);
        assert_eq!(list.sprites()[0].position, sim.player_aabb().center);
        assert_eq!(list.sprites()[1].size, Vec2::new(800.0, 40.0));

        sim.resize(1024.0, 768.0);
        sim.tick(DT_MS);
        sim.sync_renderer(&mut list);
        assert_eq!(list.sprites().len(), 4);
        assert_eq!(list.sprites()[1].size, Vec2::new(1024.0, 40.0));
        assert_eq!(list.sprites()[1].position, Vec2::new(512.0, 748.0));
        assert_eq!(list.packed().len(), 4 * DrawList::STRIDE);
    }

    #[test]
    fn reset_returns_player_to_spawn() {
        let mut sim = demo();
        settle(&mut sim);
        sim.reset_player();
        assert_eq!(sim.player_aabb().center, Vec2::new(100.0, 300.0));
        assert_eq!(sim.player_velocity(), Vec2::ZERO);
        assert_eq!(sim.motion_state(), MotionState::Airborne);
    }

    #[test]
    fn set_params_keeps_bodies() {
        let mut sim = demo();
        settle(&mut sim);
        let before = sim.player_aabb();
        let p = Params { move_speed: 9.0, ..Params::default() };
        sim.set_params(p).unwrap();
        assert_eq!(sim.player_aabb(), before);
        assert_eq!(sim.params().move_speed, 9.0);
        assert!(sim.set_params(Params { ground_tolerance: 0.0, ..p }).is_err());
    }

    #[test]
    fn runs_are_deterministic() {
        fn trace() -> u64 {
            let mut sim = demo();
            let mut hash = 0xcbf29ce484222325u64;
            for frame in 0..180u32 {
                if frame == 0 {
                    sim.key_down("ArrowRight");
                }
                if frame == 120 {
                    sim.key_up("ArrowRight");
                }
                if frame == 60 {
                    sim.key_down("Space");
                }
                sim.tick(frame as f64 * DT_MS);
                let r = sim.player_aabb();
                for v in [r.center.x.to_bits(), r.center.y.to_bits()] {
                    for b in v.to_le_bytes() {
                        hash ^= b as u64;
                        hash = hash.wrapping_mul(0x100000001b3);
                    }
                }
            }
            hash
        }
        assert_eq!(trace(), trace());
    }
}
