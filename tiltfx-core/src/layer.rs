/// Layer stack construction
use crate::config::LayerConfig;
use crate::geometry::ContainerLayout;
use crate::host::{Host, LayerRole, Surface};
use crate::transform::LayerTransform;

/// One depth-ordered visual surface
#[derive(Debug)]
pub struct Layer<S> {
    pub role: LayerRole,
    /// 1-based movement rank; `None` for a fixed back layer
    pub depth_index: Option<usize>,
    surface: S,
    current: LayerTransform,
}

impl<S: Surface> Layer<S> {
    fn new(role: LayerRole, depth_index: Option<usize>, surface: S, perspective: f64) -> Self {
        Self {
            role,
            depth_index,
            surface,
            current: LayerTransform::rest(perspective),
        }
    }

    /// Write `transform` to the surface and remember it.
    pub fn apply(&mut self, transform: LayerTransform) {
        self.surface.set_transform(&transform);
        self.current = transform;
    }

    /// The last transform written through [`apply`](Self::apply).
    pub fn current(&self) -> &LayerTransform {
        &self.current
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// The back layer plus its front layers, split into the moving set and an
/// optional fixed back layer.
///
/// The moving set is ordered by depth index, so the layer at position `k`
/// has depth index `k + 1`.
#[derive(Debug)]
pub struct LayerStack<S> {
    moving: Vec<Layer<S>>,
    fixed: Option<Layer<S>>,
    layout: ContainerLayout,
}

impl<S: Surface> LayerStack<S> {
    /// Build the stack for one image.
    ///
    /// `config` must already be normalized. Creates the back surface, then
    /// one surface per front layer, mounts the result in place of the
    /// original image and takes the first layout measurement.
    pub fn build<H>(host: &mut H, source: &str, config: &LayerConfig) -> Result<Self, H::Error>
    where
        H: Host<Surface = S>,
    {
        let perspective = config.movement.perspective_depth;
        let extra = config.extra_layers();

        let back = host.create_surface(LayerRole::Back, source, None)?;

        let mut moving = Vec::with_capacity(extra + 1);
        for depth in 1..=extra {
            let surface = host.create_surface(LayerRole::Front, source, Some(config.layer_opacity))?;
            moving.push(Layer::new(LayerRole::Front, Some(depth), surface, perspective));
        }

        let fixed = if config.back_layer_fixed {
            Some(Layer::new(LayerRole::Back, None, back, perspective))
        } else {
            moving.push(Layer::new(LayerRole::Back, Some(extra + 1), back, perspective));
            None
        };

        host.mount()?;
        let layout = host.measure();

        tracing::debug!(
            moving = moving.len(),
            back_fixed = fixed.is_some(),
            width = layout.width,
            height = layout.height,
            "built layer stack"
        );

        Ok(Self {
            moving,
            fixed,
            layout,
        })
    }

    /// Number of layers that follow the pointer.
    pub fn layer_count(&self) -> usize {
        self.moving.len()
    }

    pub fn moving(&self) -> &[Layer<S>] {
        &self.moving
    }

    pub fn moving_mut(&mut self) -> &mut [Layer<S>] {
        &mut self.moving
    }

    pub fn fixed(&self) -> Option<&Layer<S>> {
        self.fixed.as_ref()
    }

    /// Every layer, back to front.
    pub fn layers(&self) -> impl Iterator<Item = &Layer<S>> {
        let back_moving = self.moving.iter().filter(|l| l.role == LayerRole::Back);
        let fronts = self.moving.iter().filter(|l| l.role == LayerRole::Front);
        self.fixed.iter().chain(back_moving).chain(fronts)
    }

    /// Every layer, mutably, in no particular order.
    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer<S>> {
        self.fixed.iter_mut().chain(self.moving.iter_mut())
    }

    pub fn layout(&self) -> ContainerLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: ContainerLayout) {
        self.layout = layout;
    }
}
