use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SceneConfig;
use crate::model::geometry::{self, Mesh};
use crate::model::material::{ColorParams, PointsMaterial, Rgb, ToonGradient, ToonMaterial};
use crate::model::{Camera, CameraRig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape {
    Torus,
    Cone,
    TorusKnot,
}

impl SectionShape {
    pub const ALL: [SectionShape; 3] = [SectionShape::Torus, SectionShape::Cone, SectionShape::TorusKnot];

    pub fn mesh(self) -> Mesh {
        match self {
            SectionShape::Torus => geometry::torus(1.0, 0.4, 16, 60),
            SectionShape::Cone => geometry::cone(1.0, 2.0, 32),
            SectionShape::TorusKnot => geometry::torus_knot(0.8, 0.35, 100, 16, 2, 3),
        }
    }
}

/// One mesh per scroll section
#[derive(Debug, Clone, Copy)]
pub struct SectionMesh {
    pub shape: SectionShape,
    pub position: Vec3,
    /// Euler x/y rotation in radians
    pub rotation: Vec2,
}

impl SectionMesh {
    pub fn model_matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0);
        Mat4::from_rotation_translation(rot, self.position)
    }
}

/// Background point field spanning every section
#[derive(Debug, Clone)]
pub struct Particles {
    pub positions: Vec<Vec3>,
}

impl Particles {
    pub fn scatter(config: &SceneConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.particle_seed);
        let top = config.objects_distance * 0.5;
        let depth = config.objects_distance * config.section_count() as f32;
        let positions = (0..config.particle_count)
            .map(|_| {
                let x = (rng.random::<f32>() - 0.5) * config.particle_spread;
                let y = top - rng.random::<f32>() * depth;
                let z = (rng.random::<f32>() - 0.5) * config.particle_spread;
                Vec3::new(x, y, z)
            })
            .collect();
        Self { positions }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector from the scene origin toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// Everything drawn each frame plus the camera that views it.
///
/// Built once at startup. The frame loop mutates only section rotations,
/// the camera's local y and the rig position; the color panel mutates
/// material colors through [`SceneGraph::set_material_color`].
pub struct SceneGraph {
    pub sections: [SectionMesh; 3],
    pub particles: Particles,
    pub light: DirectionalLight,
    pub toon: ToonMaterial,
    pub points: PointsMaterial,
    pub color_params: ColorParams,
    pub camera: Camera,
    pub rig: CameraRig,
}

impl SceneGraph {
    pub fn new(config: &SceneConfig, gradient: ToonGradient, width: u32, height: u32) -> Self {
        let sections = std::array::from_fn(|i| SectionMesh {
            shape: SectionShape::ALL[i],
            position: Vec3::new(config.section_x_offsets[i], -config.objects_distance * i as f32, 0.0),
            rotation: Vec2::ZERO,
        });

        let color_params = ColorParams { material_color: config.material_color };
        let camera = Camera::new(
            config.camera_fov_y_deg,
            width,
            height,
            config.camera_z_near,
            config.camera_z_far,
            config.camera_depth,
        );

        tracing::info!(
            particles = config.particle_count,
            color = %config.material_color.to_hex(),
            "scene graph built"
        );

        Self {
            sections,
            particles: Particles::scatter(config),
            light: DirectionalLight {
                position: config.light_position,
                color: Rgb::new(255, 255, 255),
                intensity: config.light_intensity,
            },
            toon: ToonMaterial { color: config.material_color, gradient },
            points: PointsMaterial { color: config.material_color, size: config.particle_size, size_attenuation: true },
            color_params,
            camera,
            rig: CameraRig::default(),
        }
    }

    /// Returns true when the color actually changed
    pub fn set_material_color(&mut self, color: Rgb) -> bool {
        if self.color_params.material_color == color {
            return false;
        }
        self.color_params.material_color = color;
        self.color_params.apply(&mut self.toon, &mut self.points);
        tracing::debug!(color = %color.to_hex(), "material color changed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneGraph {
        SceneGraph::new(&SceneConfig::default(), ToonGradient::three_tone(), 800, 600)
    }

    #[test]
    fn test_sections_step_down_by_objects_distance() {
        let scene = scene();
        let ys: Vec<f32> = scene.sections.iter().map(|s| s.position.y).collect();
        let xs: Vec<f32> = scene.sections.iter().map(|s| s.position.x).collect();
        assert_eq!(ys, vec![0.0, -4.0, -8.0]);
        assert_eq!(xs, vec![2.0, -2.0, 2.0]);
        assert_eq!(scene.sections[1].shape, SectionShape::Cone);
    }

    #[test]
    fn test_particles_stay_in_bounds() {
        let config = SceneConfig::default();
        let particles = Particles::scatter(&config);
        assert_eq!(particles.positions.len(), 200);
        for p in &particles.positions {
            assert!(p.x >= -5.0 && p.x < 5.0);
            assert!(p.z >= -5.0 && p.z < 5.0);
            assert!(p.y <= 2.0 && p.y > 2.0 - 12.0);
        }
    }

    #[test]
    fn test_particles_reproducible_from_seed() {
        let a = Particles::scatter(&SceneConfig::default().with_particle_seed(7));
        let b = Particles::scatter(&SceneConfig::default().with_particle_seed(7));
        let c = Particles::scatter(&SceneConfig::default().with_particle_seed(8));
        assert_eq!(a.positions, b.positions);
        assert_ne!(a.positions, c.positions);
    }

    #[test]
    fn test_set_material_color_fans_out() {
        let mut scene = scene();
        let color = Rgb::new(0x12, 0x34, 0x56);
        assert!(scene.set_material_color(color));
        assert_eq!(scene.toon.color, color);
        assert_eq!(scene.points.color, color);
        assert!(!scene.set_material_color(color));
    }

    #[test]
    fn test_camera_starts_at_depth() {
        let scene = scene();
        assert_eq!(scene.camera.local, Vec3::new(0.0, 0.0, 6.0));
        assert_eq!(scene.rig.position, Vec2::ZERO);
    }

    #[test]
    fn test_model_matrix_places_mesh() {
        let mut section = scene().sections[2];
        section.rotation = Vec2::new(0.6, 0.6);
        let origin = section.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(2.0, -8.0, 0.0)).length() < 1e-6);
    }
}
