use image::{GrayImage, Luma};

use crate::error::SceneError;

/// 8-bit sRGB color, as edited in the color panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self, SceneError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(SceneError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| SceneError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }

    /// Linear-light components for shading into an sRGB surface
    pub fn to_linear(self) -> [f32; 3] {
        fn decode(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [decode(self.r), decode(self.g), decode(self.b)]
    }
}

/// One-row lookup texture that quantizes diffuse light into bands.
///
/// Sampled with nearest filtering, so each texel is one visible tone.
#[derive(Debug, Clone)]
pub struct ToonGradient {
    image: GrayImage,
}

impl ToonGradient {
    /// Default three-tone ramp: shadow, mid, lit
    pub fn three_tone() -> Self {
        Self::from_tones(&[0, 128, 255])
    }

    pub fn from_tones(tones: &[u8]) -> Self {
        let width = tones.len().max(1) as u32;
        let image = GrayImage::from_fn(width, 1, |x, _| Luma([tones.get(x as usize).copied().unwrap_or(255)]));
        Self { image }
    }

    /// Decode an encoded gradient image; only its first row is used
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, SceneError> {
        let decoded = image::load_from_memory(bytes)?.to_luma8();
        let width = decoded.width();
        let image = GrayImage::from_fn(width, 1, |x, _| *decoded.get_pixel(x, 0));
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn texels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

#[derive(Debug, Clone)]
pub struct ToonMaterial {
    pub color: Rgb,
    pub gradient: ToonGradient,
}

#[derive(Debug, Clone)]
pub struct PointsMaterial {
    pub color: Rgb,
    /// Point size; with attenuation, pixels at unit depth per half drawing-buffer height
    pub size: f32,
    pub size_attenuation: bool,
}

/// Parameters edited by the color panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorParams {
    pub material_color: Rgb,
}

impl ColorParams {
    /// Push the panel color into both materials that share it
    pub fn apply(&self, toon: &mut ToonMaterial, points: &mut PointsMaterial) {
        toon.color = self.material_color;
        points.color = self.material_color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#ffeded").unwrap(), Rgb::new(255, 237, 237));
        assert_eq!(Rgb::from_hex("00ff10").unwrap(), Rgb::new(0, 255, 16));
        assert!(Rgb::from_hex("#fff").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert_eq!(Rgb::new(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn test_linear_endpoints() {
        assert_eq!(Rgb::new(0, 0, 0).to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb::new(255, 255, 255).to_linear();
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
        // mid gray is darker in linear light
        assert!(Rgb::new(128, 128, 128).to_linear()[0] < 0.5);
    }

    #[test]
    fn test_three_tone_gradient() {
        let gradient = ToonGradient::three_tone();
        assert_eq!(gradient.width(), 3);
        assert_eq!(gradient.texels(), &[0, 128, 255]);
    }

    #[test]
    fn test_color_fan_out_updates_both_materials() {
        let mut toon = ToonMaterial { color: Rgb::new(0, 0, 0), gradient: ToonGradient::three_tone() };
        let mut points = PointsMaterial { color: Rgb::new(0, 0, 0), size: 0.03, size_attenuation: true };
        let params = ColorParams { material_color: Rgb::new(10, 20, 30) };
        params.apply(&mut toon, &mut points);
        assert_eq!(toon.color, params.material_color);
        assert_eq!(points.color, params.material_color);
    }

    #[test]
    fn test_gradient_decodes_from_jpeg() {
        // 8px-wide bands line up with JPEG blocks, so tones survive compression
        let bands = GrayImage::from_fn(24, 8, |x, _| Luma([[0u8, 128, 255][x as usize / 8]]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(bands)
            .write_to(&mut bytes, image::ImageFormat::Jpeg)
            .unwrap();

        let gradient = ToonGradient::from_encoded(bytes.get_ref()).unwrap();
        assert_eq!(gradient.width(), 24);
        let texels = gradient.texels();
        assert!(texels[4] < 16);
        assert!((texels[12] as i32 - 128).abs() < 16);
        assert!(texels[20] > 239);
    }
}
