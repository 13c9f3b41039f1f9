use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(pos: Vec3, normal: Vec3) -> Self {
        Self { pos: pos.to_array(), normal: normal.normalize_or_zero().to_array() }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Push two triangles per grid cell of a `(rows + 1) x (cols + 1)` vertex grid
fn grid_indices(indices: &mut Vec<u32>, base: u32, rows: u32, cols: u32) {
    let stride = cols + 1;
    for j in 1..=rows {
        for i in 1..=cols {
            let a = base + stride * j + i - 1;
            let b = base + stride * (j - 1) + i - 1;
            let c = base + stride * (j - 1) + i;
            let d = base + stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

/// Ring torus in the xy plane
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Mesh {
    let mut vertices = Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let pos = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            vertices.push(Vertex::new(pos, pos - center));
        }
    }

    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    grid_indices(&mut indices, 0, radial_segments, tubular_segments);
    Mesh { vertices, indices }
}

/// Cone standing on the xz plane, apex up, centered on the origin
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Mesh {
    let half = height / 2.0;
    let slope = radius / height;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Mantle: one row at the apex, one at the base
    for row in 0..=1u32 {
        let ring_radius = row as f32 * radius;
        let y = half - row as f32 * height;
        for x in 0..=radial_segments {
            let theta = x as f32 / radial_segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex::new(
                Vec3::new(ring_radius * sin, y, ring_radius * cos),
                Vec3::new(sin, slope, cos),
            ));
        }
    }
    let stride = radial_segments + 1;
    for x in 0..radial_segments {
        let a = x;
        let b = stride + x;
        let c = stride + x + 1;
        let d = x + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    // Base cap
    let center_start = vertices.len() as u32;
    for _ in 0..radial_segments {
        vertices.push(Vertex::new(Vec3::new(0.0, -half, 0.0), Vec3::NEG_Y));
    }
    let ring_start = vertices.len() as u32;
    for x in 0..=radial_segments {
        let theta = x as f32 / radial_segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        vertices.push(Vertex::new(Vec3::new(radius * sin, -half, radius * cos), Vec3::NEG_Y));
    }
    for x in 0..radial_segments {
        let c = center_start + x;
        let i = ring_start + x;
        indices.extend_from_slice(&[i + 1, i, c]);
    }

    Mesh { vertices, indices }
}

/// (p, q) torus knot swept with a circular tube
pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32, p: u32, q: u32) -> Mesh {
    let curve = |u: f32| {
        let q_over_p = q as f32 / p as f32 * u;
        let cs = q_over_p.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * q_over_p.sin() * 0.5,
        )
    };

    let mut vertices = Vec::with_capacity(((tubular_segments + 1) * (radial_segments + 1)) as usize);
    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * p as f32 * TAU;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);

        // Frenet-like frame along the curve
        let tangent = p2 - p1;
        let mut normal = p2 + p1;
        let binormal = tangent.cross(normal).normalize_or_zero();
        normal = binormal.cross(tangent).normalize_or_zero();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let pos = p1 + normal * cx + binormal * cy;
            vertices.push(Vertex::new(pos, pos - p1));
        }
    }

    let mut indices = Vec::with_capacity((tubular_segments * radial_segments * 6) as usize);
    grid_indices(&mut indices, 0, tubular_segments, radial_segments);
    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(mesh: &Mesh) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n), "index out of range");
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "normal not unit length: {len}");
        }
    }

    #[test]
    fn test_torus_counts_and_extent() {
        let mesh = torus(1.0, 0.4, 16, 60);
        assert_eq!(mesh.vertices.len(), 17 * 61);
        assert_eq!(mesh.indices.len(), 16 * 60 * 6);
        assert_well_formed(&mesh);

        let max_r = mesh
            .vertices
            .iter()
            .map(|v| Vec3::new(v.pos[0], v.pos[1], 0.0).length())
            .fold(0.0f32, f32::max);
        assert!((max_r - 1.4).abs() < 1e-4);
    }

    #[test]
    fn test_cone_counts_and_extent() {
        let mesh = cone(1.0, 2.0, 32);
        assert_eq!(mesh.vertices.len(), 2 * 33 + 32 + 33);
        assert_eq!(mesh.indices.len(), 32 * 6 + 32 * 3);
        assert_well_formed(&mesh);

        let max_y = mesh.vertices.iter().map(|v| v.pos[1]).fold(f32::MIN, f32::max);
        let min_y = mesh.vertices.iter().map(|v| v.pos[1]).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 1.0);
        assert_eq!(min_y, -1.0);
    }

    #[test]
    fn test_torus_knot_counts() {
        let mesh = torus_knot(0.8, 0.35, 100, 16, 2, 3);
        assert_eq!(mesh.vertices.len(), 101 * 17);
        assert_eq!(mesh.indices.len(), 100 * 16 * 6);
        assert_well_formed(&mesh);
    }

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}
