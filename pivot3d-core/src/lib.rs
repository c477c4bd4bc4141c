/// Pivot3D Core Library - Scene transforms, projection, and the painter's
/// rendering pipeline
///
/// This library provides the geometry engine for software 3D rendering:
/// pivot-based rotation with cascading target propagation, frustum
/// projection, camera visibility, and depth-ordered render staging.

pub mod angle;
pub mod geometry;
pub mod projection;
pub mod render;
pub mod transform;

// Re-export commonly used types
pub use angle::{Angle, Axis};
pub use geometry::{Arrow, GeometryError, Point, Poly, Shape};
pub use projection::{Camera, Frustum, ScreenPos};
pub use render::{Canvas, Color, RenderQueue, Renderable, Stageable, Style};
pub use transform::{Pivot, PositionKey, RotationKey, Scene, TransformError};
