/// Layer stack and movement configuration
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::geometry::Axis;

/// Bounds for the number of independently moving front layers.
pub const MIN_EXTRA_LAYERS: i32 = 1;
pub const MAX_EXTRA_LAYERS: i32 = 5;

/// One of the six per-layer movement components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementField {
    RotateX,
    RotateY,
    RotateZ,
    TranslateX,
    TranslateY,
    TranslateZ,
}

impl MovementField {
    pub const ALL: [MovementField; 6] = [
        MovementField::RotateX,
        MovementField::RotateY,
        MovementField::RotateZ,
        MovementField::TranslateX,
        MovementField::TranslateY,
        MovementField::TranslateZ,
    ];

    /// The pointer axis that drives this component.
    ///
    /// Vertical pointer motion tilts about X and pushes along Y and Z;
    /// horizontal motion tilts about Y, rolls about Z and pushes along X.
    pub fn axis(self) -> Axis {
        match self {
            MovementField::RotateX | MovementField::TranslateY | MovementField::TranslateZ => {
                Axis::Vertical
            }
            MovementField::RotateY | MovementField::RotateZ | MovementField::TranslateX => {
                Axis::Horizontal
            }
        }
    }
}

/// Maximum deviations for the outermost moving layer.
///
/// Translations are in pixels, rotations in degrees. A negative amplitude
/// reverses the direction of that component.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Movement {
    /// Perspective distance shared by every layer; 0 applies none
    #[serde(alias = "perspective")]
    pub perspective_depth: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub translate_z: f64,
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub rotate_z: f64,
}

impl Movement {
    pub fn amplitude(&self, field: MovementField) -> f64 {
        match field {
            MovementField::RotateX => self.rotate_x,
            MovementField::RotateY => self.rotate_y,
            MovementField::RotateZ => self.rotate_z,
            MovementField::TranslateX => self.translate_x,
            MovementField::TranslateY => self.translate_y,
            MovementField::TranslateZ => self.translate_z,
        }
    }

    fn normalized(&self) -> Self {
        let perspective_depth = if self.perspective_depth.is_finite() && self.perspective_depth > 0.0 {
            self.perspective_depth
        } else {
            0.0
        };

        Self {
            perspective_depth,
            translate_x: finite_or_zero(self.translate_x),
            translate_y: finite_or_zero(self.translate_y),
            translate_z: finite_or_zero(self.translate_z),
            rotate_x: finite_or_zero(self.rotate_x),
            rotate_y: finite_or_zero(self.rotate_y),
            rotate_z: finite_or_zero(self.rotate_z),
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            perspective_depth: 1500.0,
            translate_x: 10.0,
            translate_y: 10.0,
            translate_z: 2.0,
            rotate_x: 3.0,
            rotate_y: 3.0,
            rotate_z: 0.0,
        }
    }
}

/// Host-side delays, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timings {
    /// Wait after pointer-leave before the rest transform is written, so an
    /// in-flight frame lands first.
    #[serde(deserialize_with = "saturating_u32")]
    pub reset_delay_ms: u32,
    /// Minimum spacing between two layout re-measurements on resize.
    #[serde(deserialize_with = "saturating_u32")]
    pub resize_interval_ms: u32,
}

impl Timings {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.reset_delay_ms))
    }

    pub fn resize_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.resize_interval_ms))
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reset_delay_ms: 60,
            resize_interval_ms: 50,
        }
    }
}

/// Configuration supplied when a tilt effect is constructed.
///
/// Every field is optional when deserialized; missing fields take the
/// defaults. Values are taken as given and only sanitized by
/// [`LayerConfig::normalized`], which the layer stack builder applies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerConfig {
    /// Number of front layers, clamped to `1..=5`
    #[serde(alias = "extraImgs", deserialize_with = "saturating_i32")]
    pub extra_layer_count: i32,
    /// Opacity of every front layer
    #[serde(alias = "opacity")]
    pub layer_opacity: f64,
    /// When false the back layer joins the moving set as the outermost layer
    #[serde(alias = "bgfixed")]
    pub back_layer_fixed: bool,
    pub movement: Movement,
    pub timings: Timings,
}

impl LayerConfig {
    /// Clamp every field into its valid range.
    ///
    /// Out-of-range layer counts are clamped, a missing or negative
    /// perspective becomes 0, and non-finite numbers never survive.
    pub fn normalized(&self) -> Self {
        let layer_opacity = if self.layer_opacity.is_finite() {
            self.layer_opacity.clamp(0.0, 1.0)
        } else {
            Self::default().layer_opacity
        };

        Self {
            extra_layer_count: self.extra_layer_count.clamp(MIN_EXTRA_LAYERS, MAX_EXTRA_LAYERS),
            layer_opacity,
            back_layer_fixed: self.back_layer_fixed,
            movement: self.movement.normalized(),
            timings: self.timings,
        }
    }

    /// Effective number of front layers after clamping.
    pub fn extra_layers(&self) -> usize {
        self.extra_layer_count.clamp(MIN_EXTRA_LAYERS, MAX_EXTRA_LAYERS) as usize
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            extra_layer_count: 3,
            layer_opacity: 0.6,
            back_layer_fixed: true,
            movement: Movement::default(),
            timings: Timings::default(),
        }
    }
}

// Any number is accepted; out-of-range values saturate, fractions truncate
// and NaN becomes 0. Range clamping happens in `normalized`.
fn saturating_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(f64::deserialize(deserializer)? as i32)
}

fn saturating_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(f64::deserialize(deserializer)? as u32)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let config = LayerConfig::default();
        assert_eq!(config.extra_layer_count, 3);
        assert!((config.layer_opacity - 0.6).abs() < 1e-12);
        assert!(config.back_layer_fixed);
        assert_eq!(config.movement.perspective_depth, 1500.0);
        assert_eq!(config.movement.translate_x, 10.0);
        assert_eq!(config.movement.translate_y, 10.0);
        assert_eq!(config.movement.translate_z, 2.0);
        assert_eq!(config.movement.rotate_x, 3.0);
        assert_eq!(config.movement.rotate_y, 3.0);
        assert_eq!(config.movement.rotate_z, 0.0);
        assert_eq!(config.timings.reset_delay(), Duration::from_millis(60));
        assert_eq!(config.timings.resize_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: LayerConfig = toml::from_str(
            r#"
            extraLayerCount = 2
            backLayerFixed = false

            [movement]
            rotateZ = 4.5
            "#,
        )
        .unwrap();

        assert_eq!(config.extra_layer_count, 2);
        assert!(!config.back_layer_fixed);
        assert!((config.layer_opacity - 0.6).abs() < 1e-12);
        assert_eq!(config.movement.rotate_z, 4.5);
        assert_eq!(config.movement.translate_x, 10.0);
        assert_eq!(config.timings.reset_delay_ms, 60);
    }

    #[test]
    fn test_legacy_option_names() {
        let config: LayerConfig = toml::from_str(
            r#"
            extraImgs = 4
            opacity = 0.3
            bgfixed = false

            [movement]
            perspective = 800
            "#,
        )
        .unwrap();

        assert_eq!(config.extra_layer_count, 4);
        assert!((config.layer_opacity - 0.3).abs() < 1e-12);
        assert!(!config.back_layer_fixed);
        assert_eq!(config.movement.perspective_depth, 800.0);
    }

    #[test]
    fn test_out_of_range_integers_saturate() {
        let config: LayerConfig = toml::from_str("extraLayerCount = 10000000000\n").unwrap();
        assert_eq!(config.normalized().extra_layer_count, 5);
        assert_eq!(config.extra_layers(), 5);

        let config: LayerConfig = toml::from_str("extraLayerCount = -10000000000\n").unwrap();
        assert_eq!(config.normalized().extra_layer_count, 1);

        let config: LayerConfig = toml::from_str(
            r#"
            [timings]
            resetDelayMs = -5
            resizeIntervalMs = 1e12
            "#,
        )
        .unwrap();
        assert_eq!(config.timings.reset_delay(), Duration::ZERO);
        assert_eq!(config.timings.resize_interval_ms, u32::MAX);
    }

    #[test]
    fn test_fractional_layer_count_truncates() {
        let config: LayerConfig = toml::from_str("extraLayerCount = 2.7\n").unwrap();
        assert_eq!(config.extra_layer_count, 2);
    }

    #[test]
    fn test_perspective_normalization() {
        let mut config = LayerConfig::default();
        config.movement.perspective_depth = -20.0;
        assert_eq!(config.normalized().movement.perspective_depth, 0.0);

        config.movement.perspective_depth = f64::NAN;
        assert_eq!(config.normalized().movement.perspective_depth, 0.0);

        config.movement.perspective_depth = 0.0;
        assert_eq!(config.normalized().movement.perspective_depth, 0.0);
    }

    #[test]
    fn test_field_axes() {
        assert_eq!(MovementField::RotateX.axis(), Axis::Vertical);
        assert_eq!(MovementField::TranslateY.axis(), Axis::Vertical);
        assert_eq!(MovementField::TranslateZ.axis(), Axis::Vertical);
        assert_eq!(MovementField::RotateY.axis(), Axis::Horizontal);
        assert_eq!(MovementField::RotateZ.axis(), Axis::Horizontal);
        assert_eq!(MovementField::TranslateX.axis(), Axis::Horizontal);
    }

    proptest! {
        #[test]
        fn extra_layers_always_clamped(count in any::<i32>()) {
            let config = LayerConfig { extra_layer_count: count, ..LayerConfig::default() };
            let normalized = config.normalized();
            prop_assert!((1..=5).contains(&normalized.extra_layer_count));
            prop_assert!((1..=5).contains(&config.extra_layers()));
        }

        #[test]
        fn opacity_always_in_unit_range(opacity in proptest::num::f64::ANY) {
            let config = LayerConfig { layer_opacity: opacity, ..LayerConfig::default() };
            let normalized = config.normalized();
            prop_assert!((0.0..=1.0).contains(&normalized.layer_opacity));
        }

        #[test]
        fn amplitudes_always_finite(value in proptest::num::f64::ANY) {
            let movement = Movement {
                perspective_depth: value,
                translate_x: value,
                translate_y: value,
                translate_z: value,
                rotate_x: value,
                rotate_y: value,
                rotate_z: value,
            };
            let config = LayerConfig { movement, ..LayerConfig::default() }.normalized();
            prop_assert!(config.movement.perspective_depth >= 0.0);
            for field in MovementField::ALL {
                prop_assert!(config.movement.amplitude(field).is_finite());
            }
        }
    }
}
