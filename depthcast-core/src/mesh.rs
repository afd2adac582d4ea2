//! Triangle-mesh geometry for multi-part rigid bodies

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};

/// Triangles with an area below this are treated as degenerate
const MIN_TRIANGLE_AREA: f64 = 1e-12;

/// Triangle mesh of a single rigid body
///
/// Geometry is immutable after construction. Per-triangle normals follow the
/// winding order of the triangle indices, and the center of mass is the
/// area-weighted mean of the triangle centroids with the accumulated surface
/// area as its weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyMesh {
    vertices: Vec<Point3d>,
    triangles: Vec<[usize; 3]>,
    normals: Vec<Vector3d>,
    center_of_mass: Point3d,
    com_weight: f64,
}

impl BodyMesh {
    /// Create a mesh from vertices and triangle index triples
    ///
    /// Fails if any triangle references a vertex index outside the vertex
    /// sequence.
    pub fn new(vertices: Vec<Point3d>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        for (triangle_index, triangle) in triangles.iter().enumerate() {
            for &vertex_index in triangle {
                if vertex_index >= vertices.len() {
                    return Err(Error::InvalidArgument(format!(
                        "triangle {} references vertex {} but the mesh has {} vertices",
                        triangle_index,
                        vertex_index,
                        vertices.len()
                    )));
                }
            }
        }

        let normals = face_normals(&vertices, &triangles);
        let (center_of_mass, com_weight) = area_weighted_center(&vertices, &triangles);

        Ok(Self {
            vertices,
            triangles,
            normals,
            center_of_mass,
            com_weight,
        })
    }

    /// Get the mesh vertices
    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    /// Get the triangle index triples
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Get the per-triangle normals (zero for degenerate triangles)
    pub fn normals(&self) -> &[Vector3d] {
        &self.normals
    }

    /// Get the area-weighted center of mass
    pub fn center_of_mass(&self) -> Point3d {
        self.center_of_mass
    }

    /// Get the center-of-mass weight (accumulated surface area)
    pub fn com_weight(&self) -> f64 {
        self.com_weight
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// An immutable ordered collection of body meshes
///
/// The body count is fixed for the set's lifetime. Sets are safe to share
/// read-only across threads; `Arc<MeshSet>` is the intended sharing unit for
/// renderer instances running on worker threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSet {
    bodies: Vec<BodyMesh>,
}

impl MeshSet {
    /// Create a mesh set from parallel per-body vertex and index sequences
    ///
    /// Fails if the two sequences differ in length or if any triangle
    /// references an out-of-range vertex; no partial set is left behind.
    pub fn new(vertices: Vec<Vec<Point3d>>, indices: Vec<Vec<[usize; 3]>>) -> Result<Self> {
        if vertices.len() != indices.len() {
            return Err(Error::InvalidArgument(format!(
                "got {} vertex sequences but {} index sequences",
                vertices.len(),
                indices.len()
            )));
        }

        let bodies = vertices
            .into_iter()
            .zip(indices)
            .map(|(vertices, triangles)| BodyMesh::new(vertices, triangles))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { bodies })
    }

    /// Create a mesh set from already-built body meshes
    pub fn from_bodies(bodies: Vec<BodyMesh>) -> Self {
        Self { bodies }
    }

    /// Get the number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get the mesh of body `index`
    ///
    /// Panics if `index` is out of range.
    pub fn body(&self, index: usize) -> &BodyMesh {
        &self.bodies[index]
    }

    /// Get all body meshes
    pub fn bodies(&self) -> &[BodyMesh] {
        &self.bodies
    }

    /// Check if the set contains no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Get the total number of triangles across all bodies
    pub fn triangle_count(&self) -> usize {
        self.bodies.iter().map(|body| body.triangle_count()).sum()
    }
}

fn face_normals(vertices: &[Point3d], triangles: &[[usize; 3]]) -> Vec<Vector3d> {
    triangles
        .iter()
        .map(|triangle| {
            let v0 = vertices[triangle[0]];
            let v1 = vertices[triangle[1]];
            let v2 = vertices[triangle[2]];

            let normal = (v1 - v0).cross(&(v2 - v0));
            let magnitude = normal.magnitude();
            if magnitude < MIN_TRIANGLE_AREA {
                Vector3d::zeros()
            } else {
                normal / magnitude
            }
        })
        .collect()
}

fn area_weighted_center(vertices: &[Point3d], triangles: &[[usize; 3]]) -> (Point3d, f64) {
    let mut weighted_sum = Vector3d::zeros();
    let mut total_area = 0.0;

    for triangle in triangles {
        let v0 = vertices[triangle[0]];
        let v1 = vertices[triangle[1]];
        let v2 = vertices[triangle[2]];

        let area = 0.5 * (v1 - v0).cross(&(v2 - v0)).magnitude();
        if area < MIN_TRIANGLE_AREA {
            continue;
        }

        let centroid = (v0.coords + v1.coords + v2.coords) / 3.0;
        weighted_sum += centroid * area;
        total_area += area;
    }

    if total_area > 0.0 {
        (Point3d::from(weighted_sum / total_area), total_area)
    } else {
        (Point3d::origin(), 0.0)
    }
}
