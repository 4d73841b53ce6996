/// Seams between the engine and the environment that displays the layers
use nalgebra::Point2;

use crate::geometry::ContainerLayout;
use crate::transform::LayerTransform;

/// Which visual layer a surface backs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// The full-opacity layer at the bottom of the stack
    Back,
    /// A translucent layer above the back layer
    Front,
}

/// A visual surface the engine writes transforms to.
pub trait Surface {
    fn set_transform(&mut self, transform: &LayerTransform);
}

/// The environment hosting one tilt effect.
///
/// A host creates surfaces bound to the image source, swaps the original
/// image for the layered container, and answers layout queries. It never
/// decides what transforms to write.
pub trait Host {
    type Surface: Surface;
    /// Failure of the host's own structural calls (element creation,
    /// mounting). Hosts that cannot fail use [`std::convert::Infallible`].
    type Error;

    /// Create one surface bound to `source`. `opacity` is set for front
    /// layers and left to the host's default for the back layer.
    fn create_surface(
        &mut self,
        role: LayerRole,
        source: &str,
        opacity: Option<f64>,
    ) -> Result<Self::Surface, Self::Error>;

    /// Replace the original image with the layered container. Called once,
    /// after every surface has been created.
    fn mount(&mut self) -> Result<(), Self::Error>;

    /// Current rendered size of the layered container.
    fn measure(&self) -> ContainerLayout;

    /// Top-left of the layered container in document coordinates.
    fn container_origin(&self) -> Point2<f64>;
}
