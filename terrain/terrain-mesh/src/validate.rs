//! Closed-solid validation by edge adjacency.

use hashbrown::HashMap;
use terrain_types::SolidMesh;

/// Face incidence per undirected edge, split by traversal direction.
///
/// In a closed, consistently wound solid every edge is traversed exactly
/// once in each direction.
#[derive(Debug, Clone, Default)]
pub struct EdgeMap {
    /// `(lo, hi)` → (faces traversing `lo → hi`, faces traversing `hi → lo`).
    edges: HashMap<(u32, u32), (u32, u32)>,
}

impl EdgeMap {
    /// Count edge uses over `faces`.
    ///
    /// # Example
    ///
    /// ```
    /// use terrain_mesh::EdgeMap;
    ///
    /// let map = EdgeMap::build(&[[0, 1, 2], [2, 1, 3]]);
    /// assert_eq!(map.edge_count(), 5);
    /// assert_eq!(map.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edges: HashMap<(u32, u32), (u32, u32)> = HashMap::with_capacity(faces.len() * 2);
        for &[a, b, c] in faces {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                let entry = edges.entry(normalize_edge(from, to)).or_default();
                if from < to {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }
        Self { edges }
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges used by exactly one face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.values().filter(|(f, r)| f + r == 1).count()
    }

    /// Edges used by more than two faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edges.values().filter(|(f, r)| f + r > 2).count()
    }

    /// Two-face edges whose faces traverse it in the same direction.
    #[must_use]
    pub fn misoriented_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|&&(f, r)| f + r == 2 && f != r)
            .count()
    }
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

/// Result of [`validate_solid`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolidReport {
    /// Total vertices.
    pub vertex_count: usize,
    /// Total faces.
    pub face_count: usize,
    /// Distinct edges.
    pub edge_count: usize,
    /// Edges used by exactly one face.
    pub boundary_edge_count: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edge_count: usize,
    /// Edges whose two faces disagree on winding.
    pub misoriented_edge_count: usize,
    /// Faces referencing a vertex that does not exist.
    pub invalid_face_count: usize,
    /// Whether any vertex coordinate is NaN or infinite.
    pub has_non_finite: bool,
    /// Signed volume; positive for an outward-wound closed solid.
    pub signed_volume: f64,
}

impl SolidReport {
    /// Every edge borders exactly two faces.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.face_count > 0 && self.boundary_edge_count == 0 && self.non_manifold_edge_count == 0
    }

    /// No edge borders more than two faces.
    #[must_use]
    pub const fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// The solid encloses negative volume.
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume < 0.0
    }

    /// Closed, consistently wound outward, finite, and index-valid.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.is_watertight()
            && self.misoriented_edge_count == 0
            && self.invalid_face_count == 0
            && !self.has_non_finite
            && self.signed_volume > 0.0
    }
}

impl std::fmt::Display for SolidReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        writeln!(
            f,
            "Solid: {} vertices, {} faces, {} edges",
            self.vertex_count, self.face_count, self.edge_count
        )?;
        writeln!(f, "  watertight: {}", yes_no(self.is_watertight()))?;
        writeln!(f, "  manifold: {}", yes_no(self.is_manifold()))?;
        writeln!(f, "  volume: {:.3}", self.signed_volume)?;
        if self.boundary_edge_count > 0 {
            writeln!(f, "  boundary edges: {}", self.boundary_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "  non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        if self.misoriented_edge_count > 0 {
            writeln!(f, "  misoriented edges: {}", self.misoriented_edge_count)?;
        }
        if self.invalid_face_count > 0 {
            writeln!(f, "  invalid faces: {}", self.invalid_face_count)?;
        }
        if self.has_non_finite {
            writeln!(f, "  non-finite coordinates present")?;
        }
        Ok(())
    }
}

/// Check that `mesh` is a closed, outward-wound, finite solid.
///
/// # Example
///
/// ```
/// use terrain_mesh::validate_solid;
/// use terrain_types::{Point3, SolidMesh};
///
/// let mut mesh = SolidMesh::new();
/// let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
/// mesh.push_face([a, b, c]);
///
/// let report = validate_solid(&mesh);
/// assert_eq!(report.boundary_edge_count, 3);
/// assert!(!report.is_watertight());
/// ```
#[must_use]
pub fn validate_solid(mesh: &SolidMesh) -> SolidReport {
    let edges = EdgeMap::build(&mesh.faces);
    let n = mesh.vertices.len();
    let invalid_face_count = mesh
        .faces
        .iter()
        .filter(|face| face.iter().any(|&i| i as usize >= n))
        .count();

    SolidReport {
        vertex_count: n,
        face_count: mesh.faces.len(),
        edge_count: edges.edge_count(),
        boundary_edge_count: edges.boundary_edge_count(),
        non_manifold_edge_count: edges.non_manifold_edge_count(),
        misoriented_edge_count: edges.misoriented_edge_count(),
        invalid_face_count,
        has_non_finite: !mesh.is_finite(),
        signed_volume: mesh.signed_volume(),
    }
}
