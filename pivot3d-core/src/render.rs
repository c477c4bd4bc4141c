/// Colors, styles, the drawing contracts, and the painter's render queue
use nalgebra::Point3;

use crate::projection::{Camera, ScreenPos};
use crate::transform::{distance, Scene};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scales the color by an externally supplied shading factor,
    /// clamped to `[0, 1]`.
    pub fn shaded(self, factor: f64) -> Color {
        let f = factor.clamp(0.0, 1.0);
        Color::new(
            (self.r as f64 * f) as u8,
            (self.g as f64 * f) as u8,
            (self.b as f64 * f) as u8,
        )
    }
}

/// Fill and stroke colors, loaded into the canvas before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fill: Color,
    pub stroke: Color,
}

impl Style {
    pub fn new(fill: Color) -> Self {
        Self { fill, stroke: fill }
    }

    pub fn set_color(&mut self, color: Color) {
        self.fill = color;
        self.stroke = color;
    }

    pub fn apply(&self, canvas: &mut dyn Canvas) {
        canvas.set_color(self.fill, self.stroke);
    }
}

/// The 2D drawing backend contract. Coordinates are canvas-centered with
/// y pointing up; implementations own the mapping to their device.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_color(&mut self, fill: Color, stroke: Color);
    fn clear(&mut self);
    fn fill_polygon(&mut self, points: &[ScreenPos]);
    fn stroke_line(&mut self, from: ScreenPos, to: ScreenPos);
    fn plot(&mut self, at: ScreenPos);
}

/// A primitive that projects itself through a camera and issues drawing
/// commands.
pub trait Renderable {
    fn center(&self, scene: &Scene) -> Point3<f64>;
    fn draw(&self, scene: &Scene, camera: &Camera, canvas: &mut dyn Canvas);
}

/// Anything that can decompose itself into zero or more renderables for
/// one frame.
pub trait Stageable {
    fn stage<'a>(&'a self, queue: &mut Vec<&'a dyn Renderable>);
}

/// Per-frame staging collection implementing the painter's algorithm:
/// stage, sort by descending camera distance, draw, drain. Nothing is
/// persisted between frames.
#[derive(Default)]
pub struct RenderQueue<'a> {
    stageables: Vec<&'a dyn Stageable>,
    renderables: Vec<&'a dyn Renderable>,
}

impl<'a> RenderQueue<'a> {
    pub fn new() -> Self {
        Self {
            stageables: Vec::new(),
            renderables: Vec::new(),
        }
    }

    pub fn add_stageable(&mut self, stageable: &'a dyn Stageable) {
        self.stageables.push(stageable);
    }

    /// Flattens every staged object into the renderable collection.
    pub fn stage(&mut self) {
        for s in &self.stageables {
            s.stage(&mut self.renderables);
        }
    }

    /// Number of renderables currently staged.
    pub fn staged_len(&self) -> usize {
        self.renderables.len()
    }

    /// Draws everything back-to-front and drains the queue.
    ///
    /// The sort is stable, so renderables equidistant from the camera
    /// keep their staging order.
    pub fn render(&mut self, scene: &Scene, camera: &Camera, canvas: &mut dyn Canvas) {
        let eye = scene.coords(camera.position);
        self.renderables.sort_by(|a, b| {
            let da = distance(eye, a.center(scene));
            let db = distance(eye, b.center(scene));
            db.total_cmp(&da)
        });
        for r in &self.renderables {
            r.draw(scene, camera, canvas);
        }
        self.renderables.clear();
        self.stageables.clear();
    }
}
