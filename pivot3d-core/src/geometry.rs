/// Drawable geometry: points, polygon faces, shapes, and vector arrows
use nalgebra::{Point3, Vector3};
use thiserror::Error;

use crate::projection::Camera;
use crate::render::{Canvas, Color, Renderable, Stageable, Style};
use crate::transform::{PositionKey, RotationKey, Scene, TransformError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("a polygon needs at least three points")]
    TooFewPoints,
    #[error("shape faces must not share position instances")]
    SharedPosition,
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// The indivisible drawable unit: a position plus a rotation pivoted on
/// that position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: PositionKey,
    pub rotation: RotationKey,
    pub style: Style,
}

impl Point {
    pub fn new(scene: &mut Scene, x: f64, y: f64, z: f64) -> Self {
        let position = scene.add_position(x, y, z);
        let rotation = scene.add_rotation(position);
        Self {
            position,
            rotation,
            style: Style::new(Color::WHITE),
        }
    }

    pub fn coords(&self, scene: &Scene) -> Point3<f64> {
        scene.coords(self.position)
    }
}

impl Renderable for Point {
    fn center(&self, scene: &Scene) -> Point3<f64> {
        self.coords(scene)
    }

    fn draw(&self, scene: &Scene, camera: &Camera, canvas: &mut dyn Canvas) {
        if let Some(at) = camera.to_screen(scene, self.coords(scene)) {
            self.style.apply(canvas);
            canvas.plot(at);
        }
    }
}

impl Stageable for Point {
    fn stage<'a>(&'a self, queue: &mut Vec<&'a dyn Renderable>) {
        queue.push(self);
    }
}

/// An ordered ring of at least three points forming a planar face.
/// Winding order defines the outward normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    points: Vec<Point>,
    pub style: Style,
}

impl Poly {
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints);
        }
        Ok(Self {
            points,
            style: Style::new(Color::WHITE),
        })
    }

    /// Four-corner convenience constructor.
    pub fn quad(a: Point, b: Point, c: Point, d: Point) -> Self {
        Self {
            points: vec![a, b, c, d],
            style: Style::new(Color::WHITE),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.set_color(color);
        for p in &mut self.points {
            p.style.set_color(color);
        }
    }

    /// Outward unit normal from the first two edges of the ring, or the
    /// zero vector when the edges are degenerate.
    pub fn normal(&self, scene: &Scene) -> Vector3<f64> {
        let a = self.points[0].coords(scene);
        let b = self.points[1].coords(scene);
        let c = self.points[2].coords(scene);
        let u = b - a;
        let v = c - b;
        v.cross(&u)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Visible if any vertex is inside the frustum. No per-edge clipping:
    /// a partially visible face is drawn in full, wherever it projects.
    pub fn is_visible(&self, scene: &Scene, camera: &Camera) -> bool {
        self.points
            .iter()
            .any(|p| camera.is_visible(scene, p.coords(scene)))
    }
}

impl Renderable for Poly {
    /// Arithmetic mean of the vertex positions.
    fn center(&self, scene: &Scene) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        for p in &self.points {
            sum += p.coords(scene).coords;
        }
        Point3::from(sum / self.points.len() as f64)
    }

    fn draw(&self, scene: &Scene, camera: &Camera, canvas: &mut dyn Canvas) {
        let world: Vec<Point3<f64>> = self.points.iter().map(|p| p.coords(scene)).collect();
        if let Some(screen) = camera.poly_to_screen(scene, &world) {
            self.style.apply(canvas);
            canvas.fill_polygon(&screen);
        }
    }
}

impl Stageable for Poly {
    fn stage<'a>(&'a self, queue: &mut Vec<&'a dyn Renderable>) {
        queue.push(self);
    }
}

/// An aggregate of polygon faces sharing one center position/rotation.
///
/// Every constituent point is wired as a transform target of the shape's
/// own position and rotation, so one transform call reaches each point
/// exactly once.
#[derive(Debug)]
pub struct Shape {
    pub position: PositionKey,
    pub rotation: RotationKey,
    polys: Vec<Poly>,
    pub style: Style,
}

impl Shape {
    pub fn new(scene: &mut Scene, x: f64, y: f64, z: f64) -> Self {
        let position = scene.add_position(x, y, z);
        let rotation = scene.add_rotation(position);
        Self {
            position,
            rotation,
            polys: Vec::new(),
            style: Style::new(Color::WHITE),
        }
    }

    pub fn polys(&self) -> &[Poly] {
        &self.polys
    }

    pub fn polys_mut(&mut self) -> &mut [Poly] {
        &mut self.polys
    }

    /// Adds a face and wires its points into the propagation lists.
    ///
    /// A point whose position node already appears anywhere in the shape
    /// is rejected: a shared point would receive one cascaded transform
    /// per owning face, multiplying the motion.
    pub fn add_poly(&mut self, scene: &mut Scene, poly: Poly) -> Result<(), GeometryError> {
        let mut seen: Vec<PositionKey> = self
            .polys
            .iter()
            .flat_map(|q| q.points().iter().map(|p| p.position))
            .collect();
        for point in poly.points() {
            if seen.contains(&point.position) {
                return Err(GeometryError::SharedPosition);
            }
            seen.push(point.position);
        }
        for point in poly.points() {
            scene.link_position_target(self.position, point.position)?;
            scene.link_rotation_target(self.rotation, point.rotation)?;
        }
        self.polys.push(poly);
        Ok(())
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.set_color(color);
        for poly in &mut self.polys {
            poly.set_color(color);
        }
    }

    /// An axis-aligned cube of the given edge length centered on `center`.
    pub fn cube(
        scene: &mut Scene,
        center: Point3<f64>,
        size: f64,
    ) -> Result<Shape, GeometryError> {
        let hs = size / 2.0;
        let mut shape = Shape::new(scene, 0.0, 0.0, 0.0);
        // Each face gets its own point instances; corners are not shared
        // between faces.
        let faces: [[[f64; 3]; 4]; 6] = [
            // Front (-z)
            [[hs, hs, -hs], [-hs, hs, -hs], [-hs, -hs, -hs], [hs, -hs, -hs]],
            // Back (+z)
            [[hs, hs, hs], [hs, -hs, hs], [-hs, -hs, hs], [-hs, hs, hs]],
            // Left (-x)
            [[-hs, hs, -hs], [-hs, hs, hs], [-hs, -hs, hs], [-hs, -hs, -hs]],
            // Right (+x)
            [[hs, hs, -hs], [hs, -hs, -hs], [hs, -hs, hs], [hs, hs, hs]],
            // Top (+y)
            [[hs, hs, hs], [-hs, hs, hs], [-hs, hs, -hs], [hs, hs, -hs]],
            // Bottom (-y)
            [[hs, -hs, hs], [hs, -hs, -hs], [-hs, -hs, -hs], [-hs, -hs, hs]],
        ];
        for corners in faces {
            let quad = Poly::quad(
                Point::new(scene, corners[0][0], corners[0][1], corners[0][2]),
                Point::new(scene, corners[1][0], corners[1][1], corners[1][2]),
                Point::new(scene, corners[2][0], corners[2][1], corners[2][2]),
                Point::new(scene, corners[3][0], corners[3][1], corners[3][2]),
            );
            shape.add_poly(scene, quad)?;
        }
        scene.translate(shape.position, center.coords);
        Ok(shape)
    }

    /// A single camera-facing square face centered on `center`.
    pub fn square(
        scene: &mut Scene,
        center: Point3<f64>,
        size: f64,
    ) -> Result<Shape, GeometryError> {
        let hs = size / 2.0;
        let mut shape = Shape::new(scene, 0.0, 0.0, 0.0);
        let quad = Poly::quad(
            Point::new(scene, hs, hs, 0.0),
            Point::new(scene, -hs, hs, 0.0),
            Point::new(scene, -hs, -hs, 0.0),
            Point::new(scene, hs, -hs, 0.0),
        );
        shape.add_poly(scene, quad)?;
        scene.translate(shape.position, center.coords);
        Ok(shape)
    }
}

impl Stageable for Shape {
    fn stage<'a>(&'a self, queue: &mut Vec<&'a dyn Renderable>) {
        for poly in &self.polys {
            poly.stage(queue);
        }
    }
}

/// Visualizes a free vector as a stroked line plus a tip marker. Holds
/// raw world coordinates (no scene nodes), so it is cheap to rebuild
/// every frame from current geometry.
#[derive(Debug, Clone)]
pub struct Arrow {
    tail: Point3<f64>,
    tip: ArrowTip,
    pub style: Style,
}

#[derive(Debug, Clone)]
struct ArrowTip {
    at: Point3<f64>,
    style: Style,
}

impl Arrow {
    pub fn new(tail: Point3<f64>, vector: Vector3<f64>) -> Self {
        Self {
            tail,
            tip: ArrowTip {
                at: tail + vector,
                style: Style::new(Color::WHITE),
            },
            style: Style::new(Color::WHITE),
        }
    }

    /// An arrow showing `poly`'s current outward normal, anchored at the
    /// face center.
    pub fn from_normal(scene: &Scene, poly: &Poly, length: f64) -> Self {
        Arrow::new(poly.center(scene), poly.normal(scene) * length)
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.set_color(color);
        self.tip.style.set_color(color);
    }
}

impl Renderable for Arrow {
    fn center(&self, _scene: &Scene) -> Point3<f64> {
        nalgebra::center(&self.tail, &self.tip.at)
    }

    fn draw(&self, scene: &Scene, camera: &Camera, canvas: &mut dyn Canvas) {
        if !camera.is_visible(scene, self.tail) && !camera.is_visible(scene, self.tip.at) {
            return;
        }
        self.style.apply(canvas);
        canvas.stroke_line(
            camera.project(scene, self.tail),
            camera.project(scene, self.tip.at),
        );
    }
}

impl Renderable for ArrowTip {
    fn center(&self, _scene: &Scene) -> Point3<f64> {
        self.at
    }

    fn draw(&self, scene: &Scene, camera: &Camera, canvas: &mut dyn Canvas) {
        if let Some(at) = camera.to_screen(scene, self.at) {
            self.style.apply(canvas);
            canvas.plot(at);
        }
    }
}

impl Stageable for Arrow {
    /// The line and the tip marker are staged as separate renderables so
    /// each sorts by its own depth.
    fn stage<'a>(&'a self, queue: &mut Vec<&'a dyn Renderable>) {
        queue.push(self);
        queue.push(&self.tip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::{Angle, Axis};
    use crate::transform::Pivot;
    use nalgebra::Vector3;

    fn vec_close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    fn cube_at_origin(scene: &mut Scene, size: f64) -> Shape {
        Shape::cube(scene, Point3::origin(), size).unwrap()
    }

    #[test]
    fn test_poly_needs_three_points() {
        let mut scene = Scene::new();
        let a = Point::new(&mut scene, 0.0, 0.0, 0.0);
        let b = Point::new(&mut scene, 1.0, 0.0, 0.0);
        assert_eq!(Poly::new(vec![a, b]), Err(GeometryError::TooFewPoints));
    }

    #[test]
    fn test_poly_center_is_vertex_mean() {
        let mut scene = Scene::new();
        let poly = Poly::new(vec![
            Point::new(&mut scene, 0.0, 0.0, 0.0),
            Point::new(&mut scene, 6.0, 0.0, 0.0),
            Point::new(&mut scene, 0.0, 6.0, 3.0),
        ])
        .unwrap();
        let c = poly.center(&scene);
        assert!(vec_close(c.coords, Vector3::new(2.0, 2.0, 1.0)));
    }

    #[test]
    fn test_degenerate_poly_has_zero_normal() {
        let mut scene = Scene::new();
        let poly = Poly::new(vec![
            Point::new(&mut scene, 0.0, 0.0, 0.0),
            Point::new(&mut scene, 1.0, 0.0, 0.0),
            Point::new(&mut scene, 2.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(vec_close(poly.normal(&scene), Vector3::zeros()));
    }

    #[test]
    fn test_poly_visibility_needs_only_one_vertex() {
        let mut scene = Scene::new();
        let camera = Camera::new(
            &mut scene,
            400,
            400,
            Angle::from_degrees(45.0),
            Angle::from_degrees(45.0),
        );

        // FOV half-width at z=300 is ~124; dragging the square to x=160
        // leaves only its left corners inside the frustum.
        let square = Shape::square(&mut scene, Point3::new(0.0, 0.0, 300.0), 100.0).unwrap();
        scene.translate(square.position, Vector3::new(160.0, 0.0, 0.0));
        assert!(square.polys()[0].is_visible(&scene, &camera));

        scene.translate(square.position, Vector3::new(140.0, 0.0, 0.0));
        assert!(!square.polys()[0].is_visible(&scene, &camera));

        let behind = Shape::square(&mut scene, Point3::new(0.0, 0.0, -300.0), 100.0).unwrap();
        assert!(!behind.polys()[0].is_visible(&scene, &camera));
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mut scene = Scene::new();
        let cube = cube_at_origin(&mut scene, 100.0);
        assert_eq!(cube.polys().len(), 6);

        let mut normals: Vec<Vector3<f64>> =
            cube.polys().iter().map(|p| p.normal(&scene)).collect();
        for expected in [
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
        ] {
            let found = normals.iter().position(|n| vec_close(*n, expected));
            assert!(found.is_some(), "missing outward normal {expected:?}");
            normals.remove(found.unwrap());
        }
    }

    #[test]
    fn test_cube_is_centered() {
        let mut scene = Scene::new();
        let center = Point3::new(0.0, 0.0, 300.0);
        let cube = Shape::cube(&mut scene, center, 100.0).unwrap();

        assert!(vec_close(scene.coords(cube.position).coords, center.coords));
        for poly in cube.polys() {
            for point in poly.points() {
                let d = point.coords(&scene) - center;
                assert!((d.x.abs() - 50.0).abs() < 1e-9);
                assert!((d.y.abs() - 50.0).abs() < 1e-9);
                assert!((d.z.abs() - 50.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_cube_quarter_turn_remaps_face_normals() {
        let mut scene = Scene::new();
        let cube = Shape::cube(&mut scene, Point3::new(0.0, 0.0, 300.0), 100.0).unwrap();

        let find = |scene: &Scene, n: Vector3<f64>| -> usize {
            cube.polys()
                .iter()
                .position(|p| vec_close(p.normal(scene), n))
                .expect("face normal not found")
        };
        let plus_x = find(&scene, Vector3::new(1.0, 0.0, 0.0));
        let plus_z = find(&scene, Vector3::new(0.0, 0.0, 1.0));

        scene.rotate(cube.rotation, Axis::Y, Angle::from_degrees(90.0), Pivot::Local);

        // A positive quarter turn about Y carries +X into +Z and +Z into
        // -X under the orbit sign convention.
        assert!(vec_close(
            cube.polys()[plus_x].normal(&scene),
            Vector3::new(0.0, 0.0, 1.0)
        ));
        assert!(vec_close(
            cube.polys()[plus_z].normal(&scene),
            Vector3::new(-1.0, 0.0, 0.0)
        ));
        // The shape's own center never moves under a local rotation.
        assert!(vec_close(
            scene.coords(cube.position).coords,
            Vector3::new(0.0, 0.0, 300.0)
        ));
    }

    #[test]
    fn test_shared_point_instances_are_rejected() {
        let mut scene = Scene::new();
        let mut shape = Shape::new(&mut scene, 0.0, 0.0, 0.0);

        let shared = Point::new(&mut scene, 1.0, 1.0, 1.0);
        let first = Poly::quad(
            shared,
            Point::new(&mut scene, -1.0, 1.0, 1.0),
            Point::new(&mut scene, -1.0, -1.0, 1.0),
            Point::new(&mut scene, 1.0, -1.0, 1.0),
        );
        shape.add_poly(&mut scene, first).unwrap();

        let second = Poly::quad(
            shared,
            Point::new(&mut scene, 1.0, 1.0, -1.0),
            Point::new(&mut scene, 1.0, -1.0, -1.0),
            Point::new(&mut scene, 1.0, -1.0, 1.0),
        );
        assert_eq!(
            shape.add_poly(&mut scene, second),
            Err(GeometryError::SharedPosition)
        );
    }

    #[test]
    fn test_staging_a_shape_yields_one_renderable_per_face() {
        let mut scene = Scene::new();
        let cube = cube_at_origin(&mut scene, 10.0);
        let empty = Shape::new(&mut scene, 0.0, 0.0, 0.0);

        let mut queue: Vec<&dyn Renderable> = Vec::new();
        cube.stage(&mut queue);
        assert_eq!(queue.len(), 6);

        queue.clear();
        empty.stage(&mut queue);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_arrow_stages_line_and_tip() {
        let arrow = Arrow::new(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 5.0, 0.0));
        let mut queue: Vec<&dyn Renderable> = Vec::new();
        arrow.stage(&mut queue);
        assert_eq!(queue.len(), 2);

        let scene = Scene::new();
        assert!(vec_close(
            queue[0].center(&scene).coords,
            Vector3::new(0.0, 2.5, 10.0)
        ));
        assert!(vec_close(
            queue[1].center(&scene).coords,
            Vector3::new(0.0, 5.0, 10.0)
        ));
    }

    #[test]
    fn test_normal_arrow_tracks_the_face() {
        let mut scene = Scene::new();
        let square = Shape::square(&mut scene, Point3::new(0.0, 0.0, 300.0), 100.0).unwrap();

        let arrow = Arrow::from_normal(&scene, &square.polys()[0], 50.0);
        let mut queue: Vec<&dyn Renderable> = Vec::new();
        arrow.stage(&mut queue);
        // Anchored at the face center, pointing along -z toward the
        // camera: the midpoint sits half the arrow length closer.
        assert!(vec_close(
            queue[0].center(&scene).coords,
            Vector3::new(0.0, 0.0, 275.0)
        ));
    }
}
