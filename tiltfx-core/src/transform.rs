/// Per-layer 3D transforms and the depth-scaled movement law
use nalgebra::{Matrix4, Point2, Vector3};

use crate::config::{Movement, MovementField};
use crate::geometry::{along, ContainerLayout};

/// Signed component for one field of one layer.
///
/// The layer's personal amplitude is `depth_index * amplitude / layer_count`.
/// A position running from 0 to `extent` maps linearly onto
/// `-personal..=personal`, so the container center yields 0. A zero
/// amplitude disables the field, and a zero or non-finite extent yields 0
/// instead of propagating `NaN`.
pub fn component(
    amplitude: f64,
    depth_index: usize,
    layer_count: usize,
    position: f64,
    extent: f64,
) -> f64 {
    if amplitude == 0.0 || layer_count == 0 || extent == 0.0 || !extent.is_finite() {
        return 0.0;
    }

    let personal = depth_index as f64 * amplitude / layer_count as f64;
    let value = personal * (2.0 * position / extent - 1.0);
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// A layer's composed transform: perspective, then translate, then rotate
/// about X, Y and Z in that order.
///
/// Translations are in pixels, rotations in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub perspective: f64,
    pub translate: Vector3<f64>,
    pub rotate: Vector3<f64>,
}

impl LayerTransform {
    /// The rest transform: perspective kept, no translation, no rotation.
    pub fn rest(perspective: f64) -> Self {
        Self {
            perspective,
            translate: Vector3::zeros(),
            rotate: Vector3::zeros(),
        }
    }

    /// Transform for the moving layer at `depth_index` (1-based) of
    /// `layer_count`, given the pointer position relative to the container.
    pub fn for_layer(
        movement: &Movement,
        depth_index: usize,
        layer_count: usize,
        relative: &Point2<f64>,
        layout: &ContainerLayout,
    ) -> Self {
        let value = |field: MovementField| {
            let axis = field.axis();
            component(
                movement.amplitude(field),
                depth_index,
                layer_count,
                along(relative, axis),
                layout.extent(axis),
            )
        };

        Self {
            perspective: movement.perspective_depth,
            translate: Vector3::new(
                value(MovementField::TranslateX),
                value(MovementField::TranslateY),
                value(MovementField::TranslateZ),
            ),
            rotate: Vector3::new(
                value(MovementField::RotateX),
                value(MovementField::RotateY),
                value(MovementField::RotateZ),
            ),
        }
    }

    pub fn get(&self, field: MovementField) -> f64 {
        match field {
            MovementField::RotateX => self.rotate.x,
            MovementField::RotateY => self.rotate.y,
            MovementField::RotateZ => self.rotate.z,
            MovementField::TranslateX => self.translate.x,
            MovementField::TranslateY => self.translate.y,
            MovementField::TranslateZ => self.translate.z,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.translate == Vector3::zeros() && self.rotate == Vector3::zeros()
    }

    pub fn is_finite(&self) -> bool {
        self.perspective.is_finite()
            && self.translate.iter().all(|v| v.is_finite())
            && self.rotate.iter().all(|v| v.is_finite())
    }

    /// CSS `transform` value.
    ///
    /// Rotations are written as three single-axis `rotate3d` calls so the
    /// X, Y, Z order is preserved by the browser.
    pub fn to_css(&self) -> String {
        if self.is_rest() {
            return format!(
                "perspective({}px) translate3d(0,0,0) rotate3d(1,1,1,0deg)",
                self.perspective
            );
        }

        format!(
            "perspective({}px) translate3d({}px,{}px,{}px) rotate3d(1,0,0,{}deg) rotate3d(0,1,0,{}deg) rotate3d(0,0,1,{}deg)",
            self.perspective,
            self.translate.x,
            self.translate.y,
            self.translate.z,
            self.rotate.x,
            self.rotate.y,
            self.rotate.z,
        )
    }

    /// Homogeneous matrix equivalent of [`to_css`](Self::to_css), for hosts
    /// that project layers themselves.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        perspective_matrix(self.perspective)
            * Matrix4::new_translation(&self.translate)
            * rotation_matrix(&self.rotate)
    }
}

/// CSS-style perspective: points at `z` are scaled by `d / (d - z)`.
/// A distance of 0 applies no perspective.
pub fn perspective_matrix(distance: f64) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    if distance > 0.0 && distance.is_finite() {
        m[(3, 2)] = -1.0 / distance;
    }
    m
}

/// Rotation about X, then Y, then Z, from angles in degrees.
pub fn rotation_matrix(degrees: &Vector3<f64>) -> Matrix4<f64> {
    let rx = Matrix4::new_rotation(Vector3::new(degrees.x.to_radians(), 0.0, 0.0));
    let ry = Matrix4::new_rotation(Vector3::new(0.0, degrees.y.to_radians(), 0.0));
    let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, degrees.z.to_radians()));

    rx * ry * rz
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_component_edges_and_center() {
        // 3 layers, amplitude 3, extent 300
        for depth in 1..=3 {
            let personal = depth as f64 * 3.0 / 3.0;
            assert!((component(3.0, depth, 3, 0.0, 300.0) + personal).abs() < EPS);
            assert!((component(3.0, depth, 3, 300.0, 300.0) - personal).abs() < EPS);
            assert_eq!(component(3.0, depth, 3, 150.0, 300.0), 0.0);
        }
    }

    #[test]
    fn test_component_five_layers() {
        for depth in [1, 3, 5] {
            let personal = depth as f64 * 10.0 / 5.0;
            assert!((component(10.0, depth, 5, 0.0, 400.0) + personal).abs() < EPS);
            assert!((component(10.0, depth, 5, 400.0, 400.0) - personal).abs() < EPS);
        }
    }

    #[test]
    fn test_negative_amplitude_reverses() {
        assert!((component(-10.0, 3, 3, 0.0, 100.0) - 10.0).abs() < EPS);
        assert!((component(-10.0, 3, 3, 100.0, 100.0) + 10.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_extent() {
        assert_eq!(component(3.0, 2, 3, 10.0, 0.0), 0.0);
        assert_eq!(component(3.0, 2, 3, 0.0, 0.0), 0.0);
        assert_eq!(component(3.0, 2, 3, 10.0, f64::INFINITY), 0.0);
        assert_eq!(component(3.0, 2, 0, 10.0, 100.0), 0.0);
    }

    #[test]
    fn test_for_layer_axes() {
        let movement = Movement::default();
        let layout = ContainerLayout::new(400.0, 300.0);
        let t = LayerTransform::for_layer(&movement, 3, 3, &Point2::new(400.0, 0.0), &layout);

        assert!((t.rotate.x + 3.0).abs() < EPS);
        assert!((t.rotate.y - 3.0).abs() < EPS);
        assert_eq!(t.rotate.z, 0.0);
        assert!((t.translate.x - 10.0).abs() < EPS);
        assert!((t.translate.y + 10.0).abs() < EPS);
        assert!((t.translate.z + 2.0).abs() < EPS);
        assert_eq!(t.perspective, 1500.0);
    }

    #[test]
    fn test_rest_css() {
        let rest = LayerTransform::rest(1500.0);
        assert!(rest.is_rest());
        assert_eq!(
            rest.to_css(),
            "perspective(1500px) translate3d(0,0,0) rotate3d(1,1,1,0deg)"
        );
    }

    #[test]
    fn test_moving_css() {
        let t = LayerTransform {
            perspective: 1500.0,
            translate: Vector3::new(10.0, -5.5, 2.0),
            rotate: Vector3::new(-3.0, 1.5, 0.0),
        };
        assert_eq!(
            t.to_css(),
            "perspective(1500px) translate3d(10px,-5.5px,2px) rotate3d(1,0,0,-3deg) rotate3d(0,1,0,1.5deg) rotate3d(0,0,1,0deg)"
        );
    }

    #[test]
    fn test_rest_matrix_is_perspective_only() {
        let m = LayerTransform::rest(0.0).to_matrix();
        assert!((m - Matrix4::identity()).norm() < EPS);

        let m = LayerTransform::rest(1000.0).to_matrix();
        assert!((m - perspective_matrix(1000.0)).norm() < EPS);
    }

    #[test]
    fn test_rotation_order() {
        // X then Y differs from Y then X
        let xy = rotation_matrix(&Vector3::new(90.0, 90.0, 0.0));
        let rx = rotation_matrix(&Vector3::new(90.0, 0.0, 0.0));
        let ry = rotation_matrix(&Vector3::new(0.0, 90.0, 0.0));
        assert!((xy - rx * ry).norm() < EPS);
        assert!((xy - ry * rx).norm() > 0.5);
    }

    #[test]
    fn test_translation_applied_before_rotation() {
        let t = LayerTransform {
            perspective: 0.0,
            translate: Vector3::new(10.0, 0.0, 0.0),
            rotate: Vector3::new(0.0, 0.0, 90.0),
        };
        // The origin is only translated, rotation acts on the local frame.
        let p = t.to_matrix().transform_point(&Point3::origin());
        assert!((p.x - 10.0).abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    proptest! {
        #[test]
        fn zero_amplitude_is_exactly_zero(
            depth in 1usize..=6,
            position in -1e6f64..1e6,
            extent in 0f64..1e6,
        ) {
            prop_assert_eq!(component(0.0, depth, 6, position, extent), 0.0);
        }

        #[test]
        fn center_is_exactly_zero(
            amplitude in -1e3f64..1e3,
            depth in 1usize..=6,
            extent in 1f64..1e5,
        ) {
            prop_assert_eq!(component(amplitude, depth, 6, extent / 2.0, extent), 0.0);
        }

        #[test]
        fn zero_sized_layout_never_produces_nan(
            x in -1e4f64..1e4,
            y in -1e4f64..1e4,
            width in prop_oneof![Just(0.0f64), 1f64..1e4],
            height in prop_oneof![Just(0.0f64), 1f64..1e4],
            depth in 1usize..=6,
        ) {
            let layout = ContainerLayout::new(width, height);
            let t = LayerTransform::for_layer(&Movement::default(), depth, 6, &Point2::new(x, y), &layout);
            prop_assert!(t.is_finite());
            if width == 0.0 {
                prop_assert_eq!(t.translate.x, 0.0);
                prop_assert_eq!(t.rotate.y, 0.0);
            }
            if height == 0.0 {
                prop_assert_eq!(t.rotate.x, 0.0);
                prop_assert_eq!(t.translate.y, 0.0);
                prop_assert_eq!(t.translate.z, 0.0);
            }
        }
    }
}
