//! Kinesis – a declarative bridge between a renderable scene graph and a
//! native physics engine.
//!
//! The engine itself — broad-phase collision, constraint solving, soft-body
//! dynamics — is an opaque backend. This crate marshals declarative body
//! descriptions across that boundary, advances a simulation clock once per
//! render tick, and republishes simulated transforms and deformations into
//! renderable nodes, with deterministic ownership of every native resource:
//! the engine is acquired once per process and refcounted by its dependents,
//! bodies are tracked by generation-checked handles, and destruction is
//! idempotent.
//!
//! # Typical session
//!
//! ```no_run
//! use kinesis::{CollisionFilter, EngineConfig, EngineHandle, RigidBodyDesc, Shape, World};
//!
//! let engine = EngineHandle::acquire(&EngineConfig::default())?;
//! let mut world = World::new(engine, CollisionFilter::default_static_dynamic());
//!
//! let ball = world.create_rigid_body(&RigidBodyDesc::new(Shape::sphere(0.5)))?;
//!
//! // Once per render tick:
//! world.step(1.0 / 60.0)?;
//! if let Some((position, orientation)) = world.rigid_pose(ball) {
//!     // feed the renderable node
//!     let _ = (position, orientation);
//! }
//!
//! world.destroy_all();
//! # Ok::<(), kinesis::BridgeError>(())
//! ```

pub mod body;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geometry;
mod registry;
pub mod sync;
pub mod utils;
pub mod world;

pub use glam::{Quat, Vec3};

pub use body::{MotionCategory, RigidBodyDesc, Shape, SoftBodyParams};
pub use config::EngineConfig;
pub use engine::EngineHandle;
pub use error::BridgeError;
pub use filter::{CollisionFilter, CollisionLayer};
pub use geometry::{to_soft_body_mesh, uv_sphere, ConstraintKind, MeshConstraint, SoftBodyMesh};
pub use sync::{sync_rigid, sync_soft, RigidTarget, SoftTarget};
pub use utils::arena::BodyHandle;
pub use world::{StepReport, World};
