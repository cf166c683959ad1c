use glam::Vec2;

use crate::config::{AirControl, DriveMode, Params};
use crate::input::Controls;
use crate::physics::{BodyHandle, PhysicsBackend};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MotionState {
    Grounded,
    #[default]
    Airborne,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlReport {
    pub state: MotionState,
    pub jumped: bool,
    pub landed: bool,
    pub left_ground: bool,
}

/// Horizontal steering and edge-triggered, cooldown-gated jumping for one body.
#[derive(Clone, Debug, Default)]
pub struct MovementController {
    state: MotionState,
    last_jump_ms: Option<f64>,
    jump_was_down: bool,
}

impl MovementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn last_jump_ms(&self) -> Option<f64> {
        self.last_jump_ms
    }

    pub fn cooled_down(&self, params: &Params, now_ms: f64) -> bool {
        self.last_jump_ms
            .map_or(true, |t| now_ms - t > params.jump_cooldown_ms)
    }

    /// One tick. `grounded` is this tick's detector output.
    pub fn update<P: PhysicsBackend>(
        &mut self,
        params: &Params,
        now_ms: f64,
        controls: Controls,
        grounded: bool,
        physics: &mut P,
        body: BodyHandle,
    ) -> ControlReport {
        let mut report = ControlReport::default();

        let jump_down = controls.contains(Controls::JUMP);
        let jump_pressed = jump_down && !self.jump_was_down;
        self.jump_was_down = jump_down;

        let cooled = self.cooled_down(params, now_ms);

        // Contact right after an impulse is ignored until the cooldown runs out.
        match self.state {
            MotionState::Grounded if !grounded => {
                self.state = MotionState::Airborne;
                report.left_ground = true;
            }
            MotionState::Airborne if grounded && cooled => {
                self.state = MotionState::Grounded;
                report.landed = true;
                log::debug!("landed at t={now_ms:.1}ms");
            }
            _ => {}
        }

        let on_ground = self.state == MotionState::Grounded;
        let steer = on_ground || params.air_control == AirControl::Always;
        // Both directions held cancel out.
        let dir = controls.contains(Controls::RIGHT) as i32 - controls.contains(Controls::LEFT) as i32;
        let want_jump = jump_pressed && on_ground && cooled;

        match params.drive_mode {
            DriveMode::Velocity => {
                let mut vel = physics.velocity(body);
                if steer && dir != 0 {
                    vel.x = dir as f32 * params.move_speed;
                } else if on_ground {
                    vel.x = 0.0;
                }
                if want_jump {
                    vel.y = params.jump_impulse;
                }
                physics.set_velocity(body, vel);
            }
            DriveMode::Force => {
                if steer && dir != 0 {
                    physics.apply_force(body, Vec2::new(dir as f32 * params.move_force, 0.0));
                }
                if want_jump {
                    physics.apply_force(body, Vec2::new(0.0, -params.jump_force));
                }
            }
        }

        if want_jump {
            self.last_jump_ms = Some(now_ms);
            self.state = MotionState::Airborne;
            report.jumped = true;
            log::debug!("jump at t={now_ms:.1}ms");
        }

        report.state = self.state;
        report
    }
}
