use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::DT_MS;

/// Where the grounded signal comes from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingPolicy {
    /// Bottom edge within tolerance of a surface top, center over the surface.
    #[default]
    Proximity,
    /// Any live collision contact between player and a surface.
    Contact,
}

/// Whether horizontal input steers the player while airborne.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirControl {
    #[default]
    GroundedOnly,
    Always,
}

/// How the controller pushes the body.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Write velocity directly.
    #[default]
    Velocity,
    /// Apply a force for the next physics step.
    Force,
}

/// Tunables. Velocities are pixels per fixed tick, times are milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Horizontal
    pub move_speed: f32,
    pub move_force: f32,
    pub drive_mode: DriveMode,
    pub air_control: AirControl,

    // Jump
    pub jump_impulse: f32,
    pub jump_force: f32,
    pub jump_cooldown_ms: f64,

    // Grounding
    pub ground_tolerance: f32,
    pub grounding_policy: GroundingPolicy,

    // World
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub max_step_px: f32,

    // Timestep
    pub fixed_dt_ms: f64,
    pub max_ticks_per_frame: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            move_force: 0.005,
            drive_mode: DriveMode::Velocity,
            air_control: AirControl::GroundedOnly,

            jump_impulse: -10.0,
            jump_force: 0.015,
            jump_cooldown_ms: 200.0,

            ground_tolerance: 6.0,
            grounding_policy: GroundingPolicy::Proximity,

            gravity: 0.28,
            terminal_velocity: 20.0,
            max_step_px: 6.0,

            fixed_dt_ms: DT_MS,
            max_ticks_per_frame: 5,
        }
    }
}

impl Params {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Params = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ground_tolerance.is_finite() && self.ground_tolerance > 0.0) {
            return Err(CoreError::InvalidParams("ground_tolerance must be positive"));
        }
        if !(self.move_speed.is_finite() && self.move_speed >= 0.0) {
            return Err(CoreError::InvalidParams("move_speed must be non-negative"));
        }
        if !(self.move_force.is_finite() && self.move_force >= 0.0) {
            return Err(CoreError::InvalidParams("move_force must be non-negative"));
        }
        if !(self.jump_impulse.is_finite() && self.jump_impulse < 0.0) {
            return Err(CoreError::InvalidParams("jump_impulse must point up (negative)"));
        }
        if !(self.jump_force.is_finite() && self.jump_force >= 0.0) {
            return Err(CoreError::InvalidParams("jump_force must be non-negative"));
        }
        if !(self.jump_cooldown_ms.is_finite() && self.jump_cooldown_ms >= 0.0) {
            return Err(CoreError::InvalidParams("jump_cooldown_ms must be non-negative"));
        }
        if !self.gravity.is_finite() {
            return Err(CoreError::InvalidParams("gravity must be finite"));
        }
        if !(self.terminal_velocity.is_finite() && self.terminal_velocity > 0.0) {
            return Err(CoreError::InvalidParams("terminal_velocity must be positive"));
        }
        if !(self.max_step_px.is_finite() && self.max_step_px > 0.0) {
            return Err(CoreError::InvalidParams("max_step_px must be positive"));
        }
        if !(self.fixed_dt_ms.is_finite() && self.fixed_dt_ms > 0.0) {
            return Err(CoreError::InvalidParams("fixed_dt_ms must be positive"));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(CoreError::InvalidParams("max_ticks_per_frame must be at least 1"));
        }
        Ok(())
    }
}

/// Creation options for a rectangular body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub is_static: bool,
    /// 0xRRGGBB
    pub fill_color: u32,
    pub friction: f32,
    pub restitution: f32,
    pub mass: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            is_static: false,
            fill_color: 0xff_ff_ff,
            friction: 0.1,
            restitution: 0.0,
            mass: 1.0,
        }
    }
}

impl BodyConfig {
    pub fn player() -> Self {
        Self {
            fill_color: 0xff_00_00,
            friction: 0.01,
            ..Self::default()
        }
    }

    pub fn fixed(fill_color: u32) -> Self {
        Self {
            is_static: true,
            fill_color,
            ..Self::default()
        }
    }
}
