/// TiltFx Core Library - Layered parallax tilt engine
///
/// This library provides the host-independent part of the tilt effect:
/// configuration, layer stack construction, per-layer transform math, the
/// two-stage pointer engine, and the frame/throttle timing helpers.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod host;
pub mod layer;
pub mod timing;
pub mod transform;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{LayerConfig, Movement, MovementField, Timings};
pub use engine::{Intake, TiltEngine};
pub use geometry::{Axis, ContainerLayout, PointerSample};
pub use host::{Host, LayerRole, Surface};
pub use layer::{Layer, LayerStack};
pub use timing::{EmulatedFrame, FrameEmulator, Throttle, FRAME_INTERVAL};
pub use transform::LayerTransform;
