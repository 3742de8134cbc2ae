use crate::math::Vec3;

/// Floats per vertex: position(3) + normal(3)
pub const VERTEX_STRIDE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }

    /// Layout: position(3) + normal(3)
    pub fn to_array(&self) -> [f32; VERTEX_STRIDE] {
        [
            self.position.x, self.position.y, self.position.z,
            self.normal.x, self.normal.y, self.normal.z,
        ]
    }
}

/// Indexed triangle mesh shared by every instance of one population
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add vertices and return the starting index
    pub fn add_vertices(&mut self, verts: impl IntoIterator<Item = Vertex>) -> u32 {
        let start = self.vertices.len() as u32;
        self.vertices.extend(verts);
        start
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles, CCW winding
    pub fn add_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }

    pub fn vertex_data(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    pub fn index_data(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Largest distance of any vertex from the origin
    pub fn radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.position.length())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_to_array() {
        let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::UP);
        assert_eq!(v.to_array(), [1.0, 2.0, 3.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_quad_is_two_triangles() {
        let mut mesh = Mesh::new();
        let start = mesh.add_vertices((0..4).map(|i| Vertex::new(Vec3::splat(i as f32), Vec3::UP)));
        mesh.add_quad(start, start + 1, start + 2, start + 3);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.index_data(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertex_data().len(), 4 * VERTEX_STRIDE);
    }
}
