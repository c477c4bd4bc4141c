/// Scene arena for positions, rotations, and their propagation graph
use nalgebra::{Point3, Vector3};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::angle::{Angle, Axis};

new_key_type! {
    pub struct PositionKey;
    pub struct RotationKey;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("linking this target would close a propagation cycle")]
    CyclicTarget,
}

/// Pivot selection for a rotation.
///
/// `Local` rotates the object in place about its own position and only
/// changes its cumulative per-axis angle. `At` rotates about an external
/// point: the cumulative angle still advances, and the owning position is
/// repositioned along a circle around the pivot. A pivot that happens to
/// coincide with the object's own position degenerates to a zero-radius
/// orbit, which lands on the same coordinates as `Local`.
#[derive(Debug, Clone, Copy)]
pub enum Pivot {
    Local,
    At(Point3<f64>),
}

/// The vector carrying `a` onto `b`.
pub fn difference(a: Point3<f64>, b: Point3<f64>) -> Vector3<f64> {
    b - a
}

/// Euclidean distance between two points.
pub fn distance(a: Point3<f64>, b: Point3<f64>) -> f64 {
    difference(a, b).norm()
}

/// Distance projected onto the plane orthogonal to `axis`.
///
/// This is the orbit radius used by pivot rotation: the axis-aligned
/// component of the difference is discarded.
pub fn planar_distance(axis: Axis, a: Point3<f64>, b: Point3<f64>) -> f64 {
    let d = b - a;
    match axis {
        Axis::X => d.y.hypot(d.z),
        Axis::Y => d.x.hypot(d.z),
        Axis::Z => d.x.hypot(d.y),
    }
}

#[derive(Debug)]
struct PositionNode {
    coords: Point3<f64>,
    targets: Vec<PositionKey>,
}

#[derive(Debug)]
struct RotationNode {
    angles: [Angle; 3],
    position: PositionKey,
    targets: Vec<RotationKey>,
}

/// Arena of position and rotation nodes.
///
/// Targets are directed edges: mutating a node cascades the same mutation
/// through its outgoing edges. Edge insertion rejects cycles, so cascades
/// always terminate. A node reachable through two distinct edge paths is
/// mutated once per path, so construction code (see `Shape`) is
/// responsible for keeping propagation trees disjoint.
///
/// Key lookups index the underlying slotmaps directly and panic on a key
/// from another scene.
#[derive(Debug, Default)]
pub struct Scene {
    positions: SlotMap<PositionKey, PositionNode>,
    rotations: SlotMap<RotationKey, RotationNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_position(&mut self, x: f64, y: f64, z: f64) -> PositionKey {
        self.positions.insert(PositionNode {
            coords: Point3::new(x, y, z),
            targets: Vec::new(),
        })
    }

    /// Adds a rotation bound to `position`, its pivot for local rotation.
    pub fn add_rotation(&mut self, position: PositionKey) -> RotationKey {
        self.rotations.insert(RotationNode {
            angles: [Angle::ZERO; 3],
            position,
            targets: Vec::new(),
        })
    }

    pub fn coords(&self, key: PositionKey) -> Point3<f64> {
        self.positions[key].coords
    }

    pub fn rotation_position(&self, rot: RotationKey) -> PositionKey {
        self.rotations[rot].position
    }

    /// Target-free copy of a position.
    pub fn clone_position(&mut self, key: PositionKey) -> PositionKey {
        let c = self.positions[key].coords;
        self.add_position(c.x, c.y, c.z)
    }

    /// Clones a position together with its entire target subgraph.
    pub fn deep_clone_position(&mut self, key: PositionKey) -> PositionKey {
        let (coords, targets) = {
            let node = &self.positions[key];
            (node.coords, node.targets.clone())
        };
        let clone = self.add_position(coords.x, coords.y, coords.z);
        for t in targets {
            let t_clone = self.deep_clone_position(t);
            // Fresh nodes cannot close a cycle.
            self.positions[clone].targets.push(t_clone);
        }
        clone
    }

    /// Links `target` so that it follows every translation of `owner`.
    pub fn link_position_target(
        &mut self,
        owner: PositionKey,
        target: PositionKey,
    ) -> Result<(), TransformError> {
        if self.position_reaches(target, owner) {
            return Err(TransformError::CyclicTarget);
        }
        self.positions[owner].targets.push(target);
        Ok(())
    }

    /// Links `target` so that it follows every rotation of `owner`.
    pub fn link_rotation_target(
        &mut self,
        owner: RotationKey,
        target: RotationKey,
    ) -> Result<(), TransformError> {
        if self.rotation_reaches(target, owner) {
            return Err(TransformError::CyclicTarget);
        }
        self.rotations[owner].targets.push(target);
        Ok(())
    }

    fn position_reaches(&self, from: PositionKey, needle: PositionKey) -> bool {
        let mut stack = vec![from];
        while let Some(k) = stack.pop() {
            if k == needle {
                return true;
            }
            stack.extend(self.positions[k].targets.iter().copied());
        }
        false
    }

    fn rotation_reaches(&self, from: RotationKey, needle: RotationKey) -> bool {
        let mut stack = vec![from];
        while let Some(k) = stack.pop() {
            if k == needle {
                return true;
            }
            stack.extend(self.rotations[k].targets.iter().copied());
        }
        false
    }

    /// Adds `delta` to the position and to every target transitively.
    pub fn translate(&mut self, key: PositionKey, delta: Vector3<f64>) {
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            let node = &mut self.positions[k];
            node.coords += delta;
            stack.extend(node.targets.iter().copied());
        }
    }

    /// Absolute repositioning, expressed as a translation so targets stay
    /// consistent.
    pub fn set_position(&mut self, key: PositionKey, to: Point3<f64>) {
        let delta = to - self.positions[key].coords;
        self.translate(key, delta);
    }

    /// The angle of a rotation on the plane orthogonal to `axis`.
    ///
    /// Local pivots return the stored cumulative angle. External pivots
    /// reconstruct the current angular position on the orbit from raw
    /// coordinates instead of stored state, which keeps stored angle and
    /// actual position from drifting apart in compound hierarchies.
    pub fn rotation_angle(&self, rot: RotationKey, axis: Axis, pivot: Pivot) -> Angle {
        match pivot {
            Pivot::Local => self.rotations[rot].angles[axis.index()],
            Pivot::At(p) => {
                let at = self.coords(self.rotations[rot].position);
                let d = p - at;
                let raw = match axis {
                    Axis::X => d.z.atan2(d.y),
                    Axis::Y => d.z.atan2(d.x),
                    Axis::Z => d.y.atan2(d.x),
                };
                Angle::new(raw)
            }
        }
    }

    /// Rotates by `delta` about `pivot`, cascading to target rotations.
    pub fn rotate(&mut self, rot: RotationKey, axis: Axis, delta: Angle, pivot: Pivot) {
        let current = self.rotation_angle(rot, axis, pivot);
        self.spin(rot, axis, delta);
        if let Pivot::At(p) = pivot {
            self.orbit(rot, axis, current + delta, p);
        }
    }

    /// Absolute-angle setter built on top of `rotate`.
    pub fn set_rotation(&mut self, rot: RotationKey, axis: Axis, angle: Angle, pivot: Pivot) {
        let current = self.rotation_angle(rot, axis, pivot);
        self.rotate(rot, axis, angle - current, pivot);
    }

    /// Advances the cumulative angle and cascades the same delta to every
    /// target, pivoting targets about this rotation's own position. The
    /// cascade runs before any orbital repositioning of this rotation, so
    /// targets orbit the pre-rotation center and pick up the center's
    /// displacement through the position target edges afterwards.
    fn spin(&mut self, rot: RotationKey, axis: Axis, delta: Angle) {
        let (own, targets) = {
            let node = &mut self.rotations[rot];
            let i = axis.index();
            node.angles[i] = node.angles[i] + delta;
            (node.position, node.targets.clone())
        };
        let pivot = self.coords(own);
        for t in targets {
            self.rotate(t, axis, delta, Pivot::At(pivot));
        }
    }

    /// Repositions the owning position on its orbit around `pivot`.
    fn orbit(&mut self, rot: RotationKey, axis: Axis, angle: Angle, pivot: Point3<f64>) {
        let pos = self.rotations[rot].position;
        let at = self.coords(pos);
        let radius = planar_distance(axis, at, pivot);
        // Inverted cos/sin is the convention rotation_angle reconstructs
        // the orbit angle with (it measures pivot - position). Keep the
        // two in lockstep or orbits drift.
        let cos = -angle.cos();
        let sin = -angle.sin();
        let next = match axis {
            Axis::X => Point3::new(at.x, pivot.y + radius * cos, pivot.z + radius * sin),
            Axis::Y => Point3::new(pivot.x + radius * cos, at.y, pivot.z + radius * sin),
            Axis::Z => Point3::new(pivot.x + radius * cos, pivot.y + radius * sin, at.z),
        };
        self.set_position(pos, next);
    }
}
