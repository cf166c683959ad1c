pub mod config;
pub mod controller;
pub mod error;
pub mod geom;
pub mod grounded;
pub mod input;
pub mod physics;
pub mod render;
pub mod sim;
pub mod surface;

pub const HZ: f64 = 60.0;
/// Fixed step handed to the physics backend, in milliseconds.
pub const DT_MS: f64 = 1000.0 / HZ;

pub use config::{AirControl, BodyConfig, DriveMode, GroundingPolicy, Params};
pub use controller::{ControlReport, MotionState, MovementController};
pub use error::{CoreError, Result};
pub use geom::Aabb;
pub use grounded::{ground_contact, is_grounded, ContactTracker};
pub use input::{Controls, InputTracker, Key};
pub use physics::{BodyDesc, BodyHandle, CollisionEvent, KinematicWorld, PhysicsBackend};
pub use render::{DrawHandle, DrawList, Renderer, Sprite};
pub use sim::{Command, FixedTimestep, FrameReport, PlayerSpawn, Simulation, TickReport};
pub use surface::{demo_layout, Anchor, Surface, SurfaceKind, Viewport};
