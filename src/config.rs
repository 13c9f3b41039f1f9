use glam::Vec3;

use crate::controller::CursorMapping;
use crate::error::SceneError;
use crate::model::Rgb;

/// Every tunable constant of the landing scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// World-space vertical gap between consecutive sections
    pub objects_distance: f32,
    /// Horizontal offset of each section mesh, top to bottom
    pub section_x_offsets: [f32; 3],
    pub particle_count: usize,
    /// Side length of the square the particles are spread over on x and z
    pub particle_spread: f32,
    pub particle_size: f32,
    pub particle_seed: u64,
    pub damping_factor: f32,
    /// Radians per second applied to both rotation axes of every section mesh
    pub rotation_speed: f32,
    pub camera_fov_y_deg: f32,
    pub camera_z_near: f32,
    pub camera_z_far: f32,
    pub camera_depth: f32,
    pub max_pixel_ratio: f64,
    pub light_position: Vec3,
    pub light_intensity: f32,
    pub material_color: Rgb,
    pub cursor_mapping: CursorMapping,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            objects_distance: 4.0,
            section_x_offsets: [2.0, -2.0, 2.0],
            particle_count: 200,
            particle_spread: 10.0,
            particle_size: 0.03,
            particle_seed: 0x5eed_5c20_11,
            damping_factor: 5.0,
            rotation_speed: 0.2,
            camera_fov_y_deg: 35.0,
            camera_z_near: 0.1,
            camera_z_far: 100.0,
            camera_depth: 6.0,
            max_pixel_ratio: 2.0,
            light_position: Vec3::new(1.0, 1.0, 0.0),
            light_intensity: 1.0,
            material_color: Rgb::new(0xff, 0xed, 0xed),
            cursor_mapping: CursorMapping::Axis,
        }
    }
}

impl SceneConfig {
    pub fn with_material_color(mut self, hex: &str) -> Result<Self, SceneError> {
        self.material_color = Rgb::from_hex(hex)?;
        Ok(self)
    }

    pub fn with_particle_seed(mut self, seed: u64) -> Self {
        self.particle_seed = seed;
        self
    }

    pub fn with_cursor_mapping(mut self, mapping: CursorMapping) -> Self {
        self.cursor_mapping = mapping;
        self
    }

    /// Number of scrollable sections, one per section mesh
    pub fn section_count(&self) -> usize {
        self.section_x_offsets.len()
    }

    /// Renderer pixel ratio for a given device pixel ratio
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Read overrides from the process environment (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, SceneError> {
        let mut config = Self::default();
        if let Ok(mapping) = std::env::var("SCROLLSCAPE_CURSOR") {
            config = config.with_cursor_mapping(parse_cursor_mapping(&mapping));
        }
        match std::env::var("SCROLLSCAPE_COLOR") {
            Ok(hex) => config.with_material_color(&hex),
            Err(_) => Ok(config),
        }
    }
}

/// `axis` or `swapped`; anything else falls back to the default with a warning
pub fn parse_cursor_mapping(value: &str) -> CursorMapping {
    match value.trim().to_ascii_lowercase().as_str() {
        "axis" => CursorMapping::Axis,
        "swapped" => CursorMapping::Swapped,
        other => {
            tracing::warn!(value = other, "unknown cursor mapping, using axis");
            CursorMapping::default()
        }
    }
}
