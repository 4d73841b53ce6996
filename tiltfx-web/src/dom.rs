/// DOM host: `<div>` layers stacked inside a wrapper that replaces the image
use nalgebra::{Point2, Vector2};
use tiltfx_core::{ContainerLayout, Host, LayerRole, LayerTransform, PointerSample, Surface};
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement, HtmlImageElement, MouseEvent, Node};

use crate::error::WebError;

pub const WRAPPER_CLASS: &str = "tilt";
pub const BACK_CLASS: &str = "tilt__back";
pub const FRONT_CLASS: &str = "tilt__front";

/// A layer element; transforms are written to its inline style.
#[derive(Debug)]
pub struct DomLayer {
    element: HtmlElement,
}

impl Surface for DomLayer {
    fn set_transform(&mut self, transform: &LayerTransform) {
        let css = transform.to_css();
        let style = self.element.style();
        let _ = style.set_property("-webkit-transform", &css);
        let _ = style.set_property("transform", &css);
    }
}

/// Hosts one tilt effect in place of an `<img>` element.
pub struct DomHost {
    document: Document,
    image: HtmlImageElement,
    wrapper: HtmlElement,
}

impl DomHost {
    /// Create the (still detached) wrapper for `image`.
    pub fn new(document: Document, image: HtmlImageElement) -> Result<Self, WebError> {
        let wrapper = create_div(&document, WRAPPER_CLASS)?;
        Ok(Self {
            document,
            image,
            wrapper,
        })
    }

    /// The element that replaced the image and receives pointer events.
    pub fn wrapper(&self) -> &HtmlElement {
        &self.wrapper
    }

    pub fn source(&self) -> String {
        self.image.src()
    }

    /// Read a pointer sample from a mouse event.
    pub fn sample(&self, event: &MouseEvent) -> PointerSample {
        pointer_sample(
            (event.page_x(), event.page_y()),
            (event.client_x(), event.client_y()),
            document_scroll(&self.document),
        )
    }
}

impl Host for DomHost {
    type Surface = DomLayer;
    type Error = WebError;

    fn create_surface(
        &mut self,
        role: LayerRole,
        source: &str,
        opacity: Option<f64>,
    ) -> Result<DomLayer, WebError> {
        let class = match role {
            LayerRole::Back => BACK_CLASS,
            LayerRole::Front => FRONT_CLASS,
        };
        let element = create_div(&self.document, class)?;
        let style = element.style();
        style.set_property("background-image", &background_image(source))?;
        if let Some(opacity) = opacity {
            style.set_property("opacity", &opacity.to_string())?;
        }
        self.wrapper.append_child(&element)?;

        Ok(DomLayer { element })
    }

    fn mount(&mut self) -> Result<(), WebError> {
        let parent = self.image.parent_node().ok_or(WebError::Detached)?;
        let image: &Node = &self.image;
        parent.insert_before(&self.wrapper, Some(image))?;
        parent.remove_child(image)?;
        Ok(())
    }

    fn measure(&self) -> ContainerLayout {
        ContainerLayout::new(
            f64::from(self.wrapper.offset_width()),
            f64::from(self.wrapper.offset_height()),
        )
    }

    fn container_origin(&self) -> Point2<f64> {
        let bounds = self.wrapper.get_bounding_client_rect();
        let scroll = document_scroll(&self.document);
        Point2::new(bounds.left() + scroll.x, bounds.top() + scroll.y)
    }
}

fn create_div(document: &Document, class: &str) -> Result<HtmlElement, WebError> {
    let element = document.create_element("div")?;
    element.set_class_name(class);
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| WebError::Dom("created element is not an HtmlElement".to_string()))
}

/// CSS `background-image` value for an image URL, as a quoted string so
/// parentheses, quotes and whitespace in the URL survive.
pub fn background_image(source: &str) -> String {
    let mut value = String::with_capacity(source.len() + 7);
    value.push_str("url(\"");
    for c in source.chars() {
        match c {
            '"' | '\\' => {
                value.push('\\');
                value.push(c);
            }
            // Newlines end a CSS string; escape them as code points.
            '\n' => value.push_str("\\a "),
            '\r' => value.push_str("\\d "),
            _ => value.push(c),
        }
    }
    value.push_str("\")");
    value
}

/// Combined scroll offsets of `<body>` and `<html>`.
pub fn document_scroll(document: &Document) -> Vector2<f64> {
    let mut scroll = Vector2::zeros();
    if let Some(body) = document.body() {
        scroll += Vector2::new(f64::from(body.scroll_left()), f64::from(body.scroll_top()));
    }
    if let Some(root) = document.document_element() {
        scroll += Vector2::new(f64::from(root.scroll_left()), f64::from(root.scroll_top()));
    }
    scroll
}

/// Build a pointer sample from raw event coordinates.
///
/// A page position of exactly (0, 0) is what browsers without page
/// coordinates report, so it falls back to viewport plus scroll.
pub fn pointer_sample(page: (i32, i32), client: (i32, i32), scroll: Vector2<f64>) -> PointerSample {
    let page = if page != (0, 0) {
        Some(Point2::new(f64::from(page.0), f64::from(page.1)))
    } else {
        None
    };

    PointerSample {
        page,
        client: Point2::new(f64::from(client.0), f64::from(client.1)),
        scroll,
    }
}
