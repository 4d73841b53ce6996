//! In-memory host used by the unit tests.
use std::convert::Infallible;

use nalgebra::Point2;

use crate::geometry::ContainerLayout;
use crate::host::{Host, LayerRole, Surface};
use crate::transform::LayerTransform;

#[derive(Debug)]
pub struct RecordingSurface {
    pub role: LayerRole,
    pub source: String,
    pub opacity: Option<f64>,
    pub writes: Vec<LayerTransform>,
}

impl RecordingSurface {
    pub fn last(&self) -> Option<&LayerTransform> {
        self.writes.last()
    }
}

impl Surface for RecordingSurface {
    fn set_transform(&mut self, transform: &LayerTransform) {
        self.writes.push(*transform);
    }
}

#[derive(Debug)]
pub struct RecordingHost {
    pub layout: ContainerLayout,
    pub origin: Point2<f64>,
    pub mounts: usize,
    pub created: usize,
}

impl RecordingHost {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            layout: ContainerLayout::new(width, height),
            origin: Point2::origin(),
            mounts: 0,
            created: 0,
        }
    }
}

impl Host for RecordingHost {
    type Surface = RecordingSurface;
    type Error = Infallible;

    fn create_surface(
        &mut self,
        role: LayerRole,
        source: &str,
        opacity: Option<f64>,
    ) -> Result<RecordingSurface, Infallible> {
        self.created += 1;
        Ok(RecordingSurface {
            role,
            source: source.to_string(),
            opacity,
            writes: Vec::new(),
        })
    }

    fn mount(&mut self) -> Result<(), Infallible> {
        self.mounts += 1;
        Ok(())
    }

    fn measure(&self) -> ContainerLayout {
        self.layout
    }

    fn container_origin(&self) -> Point2<f64> {
        self.origin
    }
}
