/// TiltFx Web - WASM bindings for the layered tilt effect
///
/// Replaces marked `<img>` elements with a stack of `<div>` layers that
/// follow the mouse. Layer transforms are written once per animation frame;
/// browsers without `requestAnimationFrame` fall back to `setTimeout`.
use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use web_sys::HtmlImageElement;

pub mod dom;
pub mod error;
pub mod frame;
pub mod tilt;

pub use error::WebError;
pub use tilt::TiltFx;

/// Marker selecting the images that are turned into tilt effects.
pub const DEFAULT_SELECTOR: &str = "img.tilt-effect";

thread_local! {
    static INSTANCES: RefCell<Vec<TiltFx>> = const { RefCell::new(Vec::new()) };
}

/// Create one tilt effect per image matching `selector` (default
/// `img.tilt-effect`). Returns how many were created.
///
/// The effects are owned by a page-wide registry; call [`destroy_all`] to
/// tear them down.
#[wasm_bindgen(js_name = initAll)]
pub fn init_all(selector: Option<String>, options: JsValue) -> Result<u32, JsValue> {
    let config = tilt::parse_options(options)?;
    let selector = selector.as_deref().unwrap_or(DEFAULT_SELECTOR);

    let window = web_sys::window().ok_or(WebError::NoWindow)?;
    let document = window.document().ok_or(WebError::NoDocument)?;
    let nodes = document.query_selector_all(selector)?;

    // Collect first: mounting removes the images from the live document.
    let images: Vec<HtmlImageElement> = (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
        .collect();

    let mut created = 0;
    for image in images {
        let effect = TiltFx::attach(image, &config)?;
        INSTANCES.with(|instances| instances.borrow_mut().push(effect));
        created += 1;
    }

    tracing::debug!(selector, created, "tilt effects initialised");
    Ok(created)
}

/// Tear down every effect created by [`init_all`].
#[wasm_bindgen(js_name = destroyAll)]
pub fn destroy_all() {
    let effects = INSTANCES.with(|instances| std::mem::take(&mut *instances.borrow_mut()));
    for mut effect in effects {
        effect.destroy();
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    Ok(())
}
