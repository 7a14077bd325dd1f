//! Procedural UV sphere meshes for the atoms

use std::f32::consts::PI;

/// Mesh vertex with normal and texture coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl SphereMesh {
    /// Latitude/longitude sphere. The seam and the poles carry duplicated
    /// vertices so the texture wraps once around the equator.
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = [
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                ];
                vertices.push(MeshVertex {
                    position: normal.map(|n| n * radius),
                    normal,
                    uv: [u, v],
                });
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = (iy * row + ix + 1) as u16;
                let b = (iy * row + ix) as u16;
                let c = ((iy + 1) * row + ix) as u16;
                let d = ((iy + 1) * row + ix + 1) as u16;

                // The top and bottom rows collapse to triangles
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_vertex_and_index_counts() {
        let sphere = SphereMesh::new(5.0, 16, 16);
        assert_eq!(sphere.vertices.len(), 17 * 17);
        // Two triangles per quad except one per quad in the pole rows
        assert_eq!(sphere.indices.len(), (16 * 16 * 2 - 2 * 16) * 3);
    }

    #[test]
    fn test_vertices_on_radius() {
        let sphere = SphereMesh::new(2.0, 12, 12);
        for vertex in &sphere.vertices {
            assert!((length(vertex.position) - 2.0).abs() < 1e-4);
            assert!((length(vertex.normal) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_indices_in_range() {
        let sphere = SphereMesh::new(1.0, 12, 12);
        let count = sphere.vertices.len() as u16;
        assert!(sphere.indices.iter().all(|&i| i < count));
        assert_eq!(sphere.index_count() % 3, 0);
    }

    #[test]
    fn test_triangles_face_outward() {
        let sphere = SphereMesh::new(1.0, 16, 16);
        for tri in sphere.indices.chunks_exact(3) {
            let p: Vec<glam::Vec3> = tri
                .iter()
                .map(|&i| glam::Vec3::from(sphere.vertices[i as usize].position))
                .collect();
            let face_normal = (p[1] - p[0]).cross(p[2] - p[0]);
            let centroid = (p[0] + p[1] + p[2]) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_degenerate_segments_are_clamped() {
        let sphere = SphereMesh::new(1.0, 0, 0);
        assert_eq!(sphere.vertices.len(), 4 * 3);
        assert!(!sphere.indices.is_empty());
    }
}
