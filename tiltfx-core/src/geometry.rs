/// Pointer coordinates and the container's layout box
use nalgebra::{Point2, Vector2};

/// Pointer axis a movement component is driven by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Cached width/height of the layered container.
///
/// Re-measured only at build time and on throttled resize, so it may lag
/// the live layout between two measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerLayout {
    pub width: f64,
    pub height: f64,
}

impl ContainerLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The extent used to normalize positions along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// True when either dimension cannot be divided by.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite()) || self.width == 0.0 || self.height == 0.0
    }
}

/// A raw pointer event as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Absolute document coordinates, when the host provides them
    pub page: Option<Point2<f64>>,
    /// Viewport coordinates
    pub client: Point2<f64>,
    /// Document scroll offsets at the time of the event
    pub scroll: Vector2<f64>,
}

impl PointerSample {
    /// A sample that already carries document coordinates.
    pub fn at_page(x: f64, y: f64) -> Self {
        Self {
            page: Some(Point2::new(x, y)),
            client: Point2::new(x, y),
            scroll: Vector2::zeros(),
        }
    }

    /// Position in document coordinates, falling back to viewport
    /// coordinates plus scroll when no page position is available.
    pub fn document_position(&self) -> Point2<f64> {
        match self.page {
            Some(page) => page,
            None => self.client + self.scroll,
        }
    }
}

/// Pointer position relative to the container's top-left corner.
///
/// `container_origin` is the container's own top-left in document
/// coordinates (its viewport box plus the current scroll offsets).
pub fn relative_position(document: Point2<f64>, container_origin: Point2<f64>) -> Point2<f64> {
    Point2::from(document - container_origin)
}

/// Component of `point` along `axis`.
pub fn along(point: &Point2<f64>, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => point.x,
        Axis::Vertical => point.y,
    }
}
