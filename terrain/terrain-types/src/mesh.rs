//! Indexed triangle solids.

use nalgebra::{Point3, Vector3};

/// A closed, indexed triangle solid.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index.
///
/// # Memory Layout
///
/// - `vertices`: `Vec<Point3<f64>>` - positions in model units
/// - `faces`: `Vec<[u32; 3]>` - triangles as vertex indices
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside,
/// so normals point outward by the right-hand rule and a correctly built
/// solid has positive [`signed_volume`](Self::signed_volume).
///
/// # Example
///
/// ```
/// use terrain_types::{Point3, SolidMesh};
///
/// let mut mesh = SolidMesh::new();
/// let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
/// mesh.push_face([a, b, c]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolidMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into `vertices`, CCW from outside.
    pub faces: Vec<[u32; 3]>,
}

impl SolidMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Append a vertex and return its index.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: solids are limited to u32 indices; builders check the count up front
    pub fn push_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// Append a triangle.
    #[inline]
    pub fn push_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Resolve a face into its three corner positions.
    ///
    /// Returns `None` if the face or any of its indices is out of range.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<[Point3<f64>; 3]> {
        let [i0, i1, i2] = *self.faces.get(face_index)?;
        Some([
            *self.vertices.get(i0 as usize)?,
            *self.vertices.get(i1 as usize)?,
            *self.vertices.get(i2 as usize)?,
        ])
    }

    /// Iterate over faces with resolved corner positions.
    ///
    /// Faces with out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }

    /// Whether every vertex coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }

    /// Compute the signed volume of the solid.
    ///
    /// Uses the divergence theorem: the sum of signed tetrahedra formed by
    /// each face and the origin. Positive for a closed solid with outward
    /// winding, negative when inside-out, meaningless when open.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let volume: f64 = self
            .triangles()
            .map(|[v0, v1, v2]| v0.coords.dot(&v1.coords.cross(&v2.coords)))
            .sum();
        volume / 6.0
    }

    /// Unit normal of a face, or the zero vector for a degenerate face.
    #[must_use]
    pub fn face_normal(&self, face_index: usize) -> Option<Vector3<f64>> {
        let [v0, v1, v2] = self.triangle(face_index)?;
        Some(unit_normal(&v0, &v1, &v2))
    }
}

/// Normalized `(v1 - v0) × (v2 - v0)`, or zero when the triangle is degenerate.
#[must_use]
pub(crate) fn unit_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let normal = (v1 - v0).cross(&(v2 - v0));
    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::zeros()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tetrahedron() -> SolidMesh {
        let mut mesh = SolidMesh::new();
        let o = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let x = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let y = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
        let z = mesh.push_vertex(Point3::new(0.0, 0.0, 1.0));
        mesh.push_face([o, y, x]);
        mesh.push_face([o, x, z]);
        mesh.push_face([o, z, y]);
        mesh.push_face([x, y, z]);
        mesh
    }

    #[test]
    fn tetrahedron_volume_is_positive() {
        let vol = tetrahedron().signed_volume();
        assert!((vol - 1.0 / 6.0).abs() < 1e-12, "got {vol}");
    }

    #[test]
    fn flipped_tetrahedron_is_inside_out() {
        let mut mesh = tetrahedron();
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        assert!(mesh.signed_volume() < 0.0);
    }

    #[test]
    fn bounds_and_finiteness() {
        let mut mesh = tetrahedron();
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(hi, Point3::new(1.0, 1.0, 1.0));
        assert!(mesh.is_finite());

        mesh.vertices[0].z = f64::NAN;
        assert!(!mesh.is_finite());
        assert!(SolidMesh::new().bounds().is_none());
    }

    #[test]
    fn degenerate_face_has_zero_normal() {
        let mut mesh = SolidMesh::new();
        let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.push_vertex(Point3::new(2.0, 0.0, 0.0));
        mesh.push_face([a, b, c]);
        assert_eq!(mesh.face_normal(0).unwrap(), Vector3::zeros());
        assert!(mesh.face_normal(1).is_none());
    }

    #[test]
    fn out_of_range_faces_are_skipped() {
        let mut mesh = tetrahedron();
        mesh.push_face([0, 1, 99]);
        assert_eq!(mesh.triangles().count(), 4);
    }
}
