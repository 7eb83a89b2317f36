use bytemuck::NoUninit;
use glam::{Mat3, Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Axis-aligned box centered at the origin
    pub fn cuboid(size: Vec3, color: [f32; 4]) -> Self {
        let h = size * 0.5;
        // (normal, u axis, v axis) per face; u x v == normal keeps CCW winding
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Mesh::empty();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            let center = normal * h;
            let du = u * h;
            let dv = v * h;
            for corner in [center - du - dv, center + du - dv, center + du + dv, center - du + dv] {
                mesh.vertices.push(Vertex { pos: corner.to_array(), normal: normal.to_array(), color });
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// UV sphere centered at the origin
    pub fn sphere(radius: f32, segments: u32, rings: u32, color: [f32; 4]) -> Self {
        let mut mesh = Mesh::empty();
        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let theta = std::f32::consts::TAU * segment as f32 / segments as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                mesh.vertices.push(Vertex {
                    pos: (normal * radius).to_array(),
                    normal: normal.to_array(),
                    color,
                });
            }
        }
        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        mesh
    }

    /// Horizontal square at y = 0 facing up
    pub fn plane(size: f32, color: [f32; 4]) -> Self {
        let h = size * 0.5;
        let normal = [0.0, 1.0, 0.0];
        let vertices = [[-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h], [-h, 0.0, -h]]
            .into_iter()
            .map(|pos| Vertex { pos, normal, color })
            .collect();
        Mesh { vertices, indices: vec![0, 1, 2, 0, 2, 3] }
    }

    /// Append `other` with positions and normals transformed
    pub fn append_transformed(&mut self, other: &Mesh, transform: Mat4) {
        let base = self.vertices.len() as u32;
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        self.vertices.extend(other.vertices.iter().map(|v| Vertex {
            pos: transform.transform_point3(Vec3::from(v.pos)).to_array(),
            normal: (normal_matrix * Vec3::from(v.normal)).normalize_or_zero().to_array(),
            color: v.color,
        }));
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Translation + rotation + scale
pub fn transform(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_wind_outward() {
        let mesh = Mesh::cuboid(Vec3::new(2.0, 1.0, 4.0), [1.0; 4]);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].pos));
            let face_normal = (b - a).cross(c - a);
            let stored = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(stored) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = Mesh::sphere(0.2, 16, 8, [1.0; 4]);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.pos).length() - 0.2).abs() < 1e-5);
        }
    }

    #[test]
    fn append_offsets_indices_and_positions() {
        let mut mesh = Mesh::plane(2.0, [1.0; 4]);
        let other = Mesh::plane(2.0, [1.0; 4]);
        mesh.append_transformed(&other, transform(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, Vec3::ONE));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices[6..], [4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.vertices[4].pos[1], 1.0);
    }
}
