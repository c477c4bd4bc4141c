/// Frustum projection and the world-to-screen camera pipeline
use nalgebra::Point3;

use crate::angle::Angle;
use crate::transform::{PositionKey, RotationKey, Scene};

/// Minimum camera-space depth for the perspective divide. Points at the
/// camera plane project to finite (if enormous) coordinates instead of
/// dividing by zero; visibility gating filters them out before drawing.
const MIN_DEPTH: f64 = 1e-9;

/// A projected position in canvas-centered, y-up screen coordinates,
/// retaining camera-space depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// The camera's field-of-view volume.
///
/// Stateless given viewport and FOV; rebuild it when either changes.
#[derive(Debug, Clone)]
pub struct Frustum {
    h_fov: Angle,
    v_fov: Angle,
    x_dom: f64,
    y_dom: f64,
    x_dist: f64,
    y_dist: f64,
}

impl Frustum {
    pub fn new(width: u32, height: u32, h_fov: Angle, v_fov: Angle) -> Self {
        let x_dom = width as f64 / 2.0;
        let y_dom = height as f64 / 2.0;
        // Distance to the projection plane at which one world unit maps
        // to one screen unit.
        let x_dist = x_dom / (h_fov.radians() / 2.0).tan();
        let y_dist = y_dom / (v_fov.radians() / 2.0).tan();
        Self {
            h_fov,
            v_fov,
            x_dom,
            y_dom,
            x_dist,
            y_dist,
        }
    }

    /// Viewport half extents (distance from center to edge).
    pub fn half_extents(&self) -> (f64, f64) {
        (self.x_dom, self.y_dom)
    }

    /// Perspective-projects a camera-space position onto the screen.
    pub fn project(&self, pos: Point3<f64>) -> ScreenPos {
        let depth = if pos.z.abs() < MIN_DEPTH {
            MIN_DEPTH
        } else {
            pos.z
        };
        ScreenPos {
            x: pos.x * self.x_dist / depth,
            y: pos.y * self.y_dist / depth,
            depth: pos.z,
        }
    }

    /// Whether a camera-space position lies inside the field of view.
    pub fn contains(&self, pos: Point3<f64>) -> bool {
        if pos.z <= 0.0 {
            return false;
        }
        pos.x.abs() <= pos.z * (self.h_fov.radians() / 2.0).tan()
            && pos.y.abs() <= pos.z * (self.v_fov.radians() / 2.0).tan()
    }
}

/// The single authority for world → camera → screen conversion and
/// visibility. Owns its own position and rotation in the scene, so camera
/// movement uses the same transform machinery as everything else.
pub struct Camera {
    pub position: PositionKey,
    pub rotation: RotationKey,
    pub frustum: Frustum,
}

impl Camera {
    pub fn new(scene: &mut Scene, width: u32, height: u32, h_fov: Angle, v_fov: Angle) -> Self {
        let position = scene.add_position(0.0, 0.0, 0.0);
        let rotation = scene.add_rotation(position);
        Self {
            position,
            rotation,
            frustum: Frustum::new(width, height, h_fov, v_fov),
        }
    }

    /// Camera space is translation-only for now: the camera's rotation is
    /// tracked but not applied.
    // TODO: fold the camera rotation into this so turning the camera pans
    // the view instead of only updating its stored angles.
    pub fn to_camera_space(&self, scene: &Scene, pos: Point3<f64>) -> Point3<f64> {
        pos - scene.coords(self.position).coords
    }

    pub fn is_visible(&self, scene: &Scene, pos: Point3<f64>) -> bool {
        self.frustum.contains(self.to_camera_space(scene, pos))
    }

    /// Unconditional projection of a world position; pairs with
    /// `to_screen`, which gates on visibility.
    pub fn project(&self, scene: &Scene, pos: Point3<f64>) -> ScreenPos {
        self.frustum.project(self.to_camera_space(scene, pos))
    }

    /// `None` means "not on screen, skip drawing".
    pub fn to_screen(&self, scene: &Scene, pos: Point3<f64>) -> Option<ScreenPos> {
        if !self.is_visible(scene, pos) {
            return None;
        }
        Some(self.project(scene, pos))
    }

    /// Projects a polygon's vertex ring. `None` unless at least one
    /// vertex is inside the frustum; otherwise every vertex is projected
    /// unconditionally, so a partially visible polygon keeps its full
    /// ring rather than dropping the off-screen vertices.
    pub fn poly_to_screen(
        &self,
        scene: &Scene,
        points: &[Point3<f64>],
    ) -> Option<Vec<ScreenPos>> {
        if !points.iter().any(|p| self.is_visible(scene, *p)) {
            return None;
        }
        Some(points.iter().map(|p| self.project(scene, *p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn square_camera(scene: &mut Scene) -> Camera {
        Camera::new(scene, 400, 400, Angle::from_degrees(45.0), Angle::from_degrees(45.0))
    }

    #[test]
    fn test_center_point_projects_to_canvas_center() {
        let frustum = Frustum::new(400, 400, Angle::from_degrees(45.0), Angle::from_degrees(45.0));
        let p = frustum.project(Point3::new(0.0, 0.0, 300.0));
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
        assert!((p.depth - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_scale_at_projection_plane() {
        let frustum = Frustum::new(400, 400, Angle::from_degrees(45.0), Angle::from_degrees(45.0));
        let plane = 200.0 / (22.5f64.to_radians()).tan();
        let p = frustum.project(Point3::new(10.0, -20.0, plane));
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_containment_bounds() {
        let frustum = Frustum::new(400, 400, Angle::from_degrees(45.0), Angle::from_degrees(45.0));
        assert!(frustum.contains(Point3::new(0.0, 0.0, 300.0)));
        assert!(!frustum.contains(Point3::new(0.0, 0.0, -300.0)));
        assert!(!frustum.contains(Point3::new(0.0, 0.0, 0.0)));

        let edge = 300.0 * (22.5f64.to_radians()).tan();
        assert!(frustum.contains(Point3::new(edge, 0.0, 300.0)));
        assert!(!frustum.contains(Point3::new(edge + 1.0, 0.0, 300.0)));
    }

    #[test]
    fn test_point_at_camera_position_is_handled() {
        let mut scene = Scene::new();
        let camera = square_camera(&mut scene);

        let at_camera = scene.coords(camera.position);
        assert!(camera.to_screen(&scene, at_camera).is_none());

        // The override path must stay finite for the degenerate depth.
        let p = camera.project(&scene, at_camera);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn test_visibility_follows_the_camera() {
        let mut scene = Scene::new();
        let camera = square_camera(&mut scene);
        let behind = Point3::new(0.0, 0.0, -300.0);

        assert!(!camera.is_visible(&scene, behind));

        // Once the camera backs up past it, the same world point sits in
        // front of the camera and becomes visible.
        scene.translate(camera.position, Vector3::new(0.0, 0.0, -600.0));
        assert!(camera.is_visible(&scene, behind));
        let screen = camera.to_screen(&scene, behind).unwrap();
        assert!((screen.depth - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_partially_visible_poly_keeps_all_vertices() {
        let mut scene = Scene::new();
        let camera = square_camera(&mut scene);

        let inside = Point3::new(0.0, 0.0, 300.0);
        let outside = Point3::new(10_000.0, 0.0, 300.0);
        let ring = [inside, outside, Point3::new(0.0, 10_000.0, 300.0)];

        let projected = camera.poly_to_screen(&scene, &ring).unwrap();
        assert_eq!(projected.len(), 3);

        let all_out = [outside, Point3::new(0.0, 10_000.0, 300.0)];
        assert!(camera.poly_to_screen(&scene, &all_out).is_none());
    }
}
