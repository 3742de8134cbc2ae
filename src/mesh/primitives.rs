//! Unit meshes for the instanced populations
//!
//! Every primitive is centred on the origin; instances place and size it
//! through their model matrix.

use std::f32::consts::{PI, TAU};

use super::geometry::{Mesh, Vertex};
use crate::math::Vec3;

/// Axis-aligned cube with edge length `size` and flat face normals
pub fn cube(size: f32) -> Mesh {
    let h = size * 0.5;
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::UP;
    let z = Vec3::new(0.0, 0.0, 1.0);
    // (normal, u, v) with u x v == normal so each face winds CCW from outside
    let faces = [(x, y, z), (-x, z, y), (y, z, x), (-y, x, z), (z, x, y), (-z, y, x)];

    let mut mesh = Mesh::new();
    for (normal, u, v) in faces {
        let center = normal.scale(h);
        let corners = [
            center - u.scale(h) - v.scale(h),
            center + u.scale(h) - v.scale(h),
            center + u.scale(h) + v.scale(h),
            center - u.scale(h) + v.scale(h),
        ];
        let start = mesh.add_vertices(corners.into_iter().map(|p| Vertex::new(p, normal)));
        mesh.add_quad(start, start + 1, start + 2, start + 3);
    }
    mesh
}

/// Latitude/longitude sphere with smooth normals
pub fn uv_sphere(radius: f32, segments: usize, rings: usize) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = Mesh::new();

    for r in 0..=rings {
        let phi = r as f32 / rings as f32 * PI;
        mesh.add_vertices((0..=segments).map(|s| {
            let theta = s as f32 / segments as f32 * TAU;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            Vertex::new(normal.scale(radius), normal)
        }));
    }

    let row = segments as u32 + 1;
    for r in 0..rings as u32 {
        for s in 0..segments as u32 {
            let a = r * row + s;
            let b = a + row;
            mesh.add_quad(a, a + 1, b + 1, b);
        }
    }
    mesh
}

/// Regular octahedron with its vertices `radius` from the centre
pub fn octahedron(radius: f32) -> Mesh {
    let mut mesh = Mesh::new();
    let signs = [1.0f32, -1.0];

    for sx in signs {
        for sy in signs {
            for sz in signs {
                let normal = Vec3::new(sx, sy, sz).normalize();
                let px = Vec3::new(sx * radius, 0.0, 0.0);
                let py = Vec3::new(0.0, sy * radius, 0.0);
                let pz = Vec3::new(0.0, 0.0, sz * radius);

                // An odd number of negative axes mirrors the face
                let corners = if sx * sy * sz > 0.0 { [px, py, pz] } else { [px, pz, py] };
                let start = mesh.add_vertices(corners.into_iter().map(|p| Vertex::new(p, normal)));
                mesh.add_triangle(start, start + 1, start + 2);
            }
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every non-degenerate triangle's winding normal points outward
    fn assert_outward(mesh: &Mesh) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize].position);
            let face = (b - a).cross(&(c - a));
            if face.length() < 1e-6 {
                continue;
            }
            let centroid = (a + b + c).scale(1.0 / 3.0);
            assert!(face.dot(&centroid) > 0.0, "inward face at {:?}", centroid);
        }
    }

    #[test]
    fn test_cube() {
        let mesh = cube(1.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for v in &mesh.vertices {
            assert!(v.position.x.abs() <= 0.5 && v.position.y.abs() <= 0.5 && v.position.z.abs() <= 0.5);
            assert!(v.normal.dot(&v.position) > 0.0);
        }
        assert_outward(&mesh);
    }

    #[test]
    fn test_uv_sphere() {
        let mesh = uv_sphere(1.0, 16, 16);
        assert_eq!(mesh.vertex_count(), 17 * 17);
        assert_eq!(mesh.triangle_count(), 16 * 16 * 2);
        for v in &mesh.vertices {
            assert!((v.position.length() - 1.0).abs() < 1e-5);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert_outward(&mesh);
    }

    #[test]
    fn test_octahedron() {
        let mesh = octahedron(1.0);
        assert_eq!(mesh.triangle_count(), 8);
        assert!((mesh.radius() - 1.0).abs() < 1e-6);
        assert_outward(&mesh);
    }
}
