/// The tilt interaction engine.
///
/// Input is split into two stages. Event intake ([`TiltEngine::pointer_moved`])
/// only records the latest pointer position and tells the host whether a
/// refresh tick must be requested. The tick stage ([`TiltEngine::tick`])
/// consumes that position and writes one transform per moving layer.
use std::time::Duration;

use nalgebra::Point2;

use crate::config::LayerConfig;
use crate::geometry::{relative_position, PointerSample};
use crate::host::Host;
use crate::layer::LayerStack;
use crate::timing::Throttle;
use crate::transform::LayerTransform;

/// What the host should do after a pointer move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intake {
    /// No tick is outstanding; request one.
    RequestFrame,
    /// A tick is already pending and will use this position instead.
    Coalesced,
}

pub struct TiltEngine<H: Host> {
    host: H,
    config: LayerConfig,
    stack: LayerStack<H::Surface>,
    pending: Option<Point2<f64>>,
    frame_outstanding: bool,
    left: bool,
    resize_throttle: Throttle,
}

impl<H: Host> TiltEngine<H> {
    /// Build the layer stack for `source` inside `host`.
    pub fn new(mut host: H, source: &str, config: &LayerConfig) -> Result<Self, H::Error> {
        let config = config.normalized();
        let stack = LayerStack::build(&mut host, source, &config)?;

        Ok(Self {
            host,
            resize_throttle: Throttle::new(config.timings.resize_interval()),
            config,
            stack,
            pending: None,
            frame_outstanding: false,
            left: false,
        })
    }

    /// Record a pointer move inside the container.
    ///
    /// A move also withdraws any reset scheduled by an earlier
    /// [`pointer_left`](Self::pointer_left).
    pub fn pointer_moved(&mut self, sample: &PointerSample) -> Intake {
        self.pending = Some(sample.document_position());
        self.left = false;

        if self.frame_outstanding {
            Intake::Coalesced
        } else {
            self.frame_outstanding = true;
            Intake::RequestFrame
        }
    }

    /// Run one refresh tick. Returns the number of layers written.
    ///
    /// The container origin is read now, and the cached layout is whatever
    /// the last accepted resize measured.
    pub fn tick(&mut self) -> usize {
        self.frame_outstanding = false;
        let Some(document) = self.pending.take() else {
            return 0;
        };

        let relative = relative_position(document, self.host.container_origin());
        let layout = self.stack.layout();
        let layer_count = self.stack.layer_count();
        let movement = self.config.movement;

        for (k, layer) in self.stack.moving_mut().iter_mut().enumerate() {
            let depth = layer.depth_index.unwrap_or(k + 1);
            layer.apply(LayerTransform::for_layer(&movement, depth, layer_count, &relative, &layout));
        }

        tracing::trace!(x = relative.x, y = relative.y, layers = layer_count, "tilt frame");
        layer_count
    }

    /// Note that the pointer left the container. Returns how long the host
    /// should wait before calling [`reset_after_leave`](Self::reset_after_leave).
    pub fn pointer_left(&mut self) -> Duration {
        self.left = true;
        self.config.timings.reset_delay()
    }

    /// The delayed half of [`pointer_left`](Self::pointer_left): reset the
    /// layers unless the pointer has come back since. Returns whether the
    /// reset ran.
    pub fn reset_after_leave(&mut self) -> bool {
        if !self.left {
            return false;
        }
        self.left = false;
        self.reset();
        true
    }

    /// Write the rest transform to every layer, fixed back layer included.
    pub fn reset(&mut self) {
        let rest = LayerTransform::rest(self.config.movement.perspective_depth);
        for layer in self.stack.layers_mut() {
            layer.apply(rest);
        }
        tracing::trace!("layers at rest");
    }

    /// Handle a window resize at `now_ms`. Re-measures the container unless
    /// the throttle is cooling; never writes transforms.
    pub fn window_resized(&mut self, now_ms: f64) -> bool {
        if !self.resize_throttle.try_acquire(now_ms) {
            return false;
        }

        let layout = self.host.measure();
        tracing::debug!(width = layout.width, height = layout.height, "container re-measured");
        self.stack.set_layout(layout);
        true
    }

    /// Forget any recorded but unprocessed pointer position.
    ///
    /// The host must also cancel its pending tick; a tick that still fires
    /// afterwards writes nothing.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.frame_outstanding = false;
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frame_outstanding
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn stack(&self) -> &LayerStack<H::Surface> {
        &self.stack
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
