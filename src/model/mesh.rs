//! Model geometry types

use serde::{Serialize, Deserialize};

use crate::error::{ModelError, PrimitiveKind};
use crate::rasterizer::Vec3;

/// Wireframe edge (indices into the vertex array)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Same edge with the smaller index first
    pub fn canonical(self) -> Self {
        if self.a <= self.b {
            self
        } else {
            Self { a: self.b, b: self.a }
        }
    }
}

/// Triangle face (indices into the vertex array).
/// Counter-clockwise winding seen from the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { a, b, c }
    }

    pub fn indices(self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    /// The three boundary edges in winding order
    pub fn edges(self) -> [Edge; 3] {
        [
            Edge::new(self.a, self.b),
            Edge::new(self.b, self.c),
            Edge::new(self.c, self.a),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub vertices: Vec<Vec3>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub faces: Vec<Face>,
}

impl Model {
    pub fn new(vertices: Vec<Vec3>, edges: Vec<Edge>, faces: Vec<Face>) -> Self {
        Self { vertices, edges, faces }
    }

    /// Edge-only model
    pub fn wireframe(vertices: Vec<Vec3>, edges: Vec<Edge>) -> Self {
        Self::new(vertices, edges, Vec::new())
    }

    /// Face-only model
    pub fn solid(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self::new(vertices, Vec::new(), faces)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.faces.is_empty()
    }

    /// Vertex positions of an edge, or `None` if an index is out of range
    pub fn edge_vertices(&self, edge: Edge) -> Option<(Vec3, Vec3)> {
        Some((*self.vertices.get(edge.a)?, *self.vertices.get(edge.b)?))
    }

    /// Vertex positions of a face, or `None` if an index is out of range
    pub fn face_vertices(&self, face: Face) -> Option<[Vec3; 3]> {
        Some([
            *self.vertices.get(face.a)?,
            *self.vertices.get(face.b)?,
            *self.vertices.get(face.c)?,
        ])
    }

    /// Check every index against the vertex count; reports the first bad one
    pub fn validate(&self) -> Result<(), ModelError> {
        let vertex_count = self.vertices.len();
        let bad = |kind, primitive, index| ModelError::InvalidIndex {
            kind,
            primitive,
            index,
            vertex_count,
        };

        for (i, edge) in self.edges.iter().enumerate() {
            for index in [edge.a, edge.b] {
                if index >= vertex_count {
                    return Err(bad(PrimitiveKind::Edge, i, index));
                }
            }
        }
        for (i, face) in self.faces.iter().enumerate() {
            for index in face.indices() {
                if index >= vertex_count {
                    return Err(bad(PrimitiveKind::Face, i, index));
                }
            }
        }
        Ok(())
    }

    /// Unique edges of all faces, smaller index first, in first-seen order
    pub fn edges_from_faces(&self) -> Vec<Edge> {
        let mut seen = std::collections::HashSet::new();
        let mut edges = Vec::new();
        for face in &self.faces {
            for edge in face.edges() {
                let edge = edge.canonical();
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }
}
