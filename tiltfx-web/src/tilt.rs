/// The browser-facing tilt effect: event subscriptions, frame scheduling and
/// teardown around a [`TiltEngine`] hosted in the DOM.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tiltfx_core::{Intake, LayerConfig, TiltEngine};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, HtmlImageElement, MouseEvent, Window};

use crate::dom::DomHost;
use crate::error::WebError;
use crate::frame::{now_ms, FrameHandle, FrameRequester};

type TickClosure = Closure<dyn FnMut(JsValue)>;
type TimerClosure = Closure<dyn FnMut()>;
type MouseClosure = Closure<dyn FnMut(MouseEvent)>;
type EventClosure = Closure<dyn FnMut(Event)>;

/// State shared by the event handlers and the scheduled callbacks.
struct Shared {
    engine: RefCell<TiltEngine<DomHost>>,
    window: Window,
    frames: RefCell<FrameRequester>,
    pending_frame: Cell<Option<FrameHandle>>,
    pending_reset: Cell<Option<i32>>,
    tick: RefCell<Option<TickClosure>>,
    reset: RefCell<Option<TimerClosure>>,
}

impl Shared {
    fn pointer_moved(&self, event: &MouseEvent) {
        self.clear_reset();
        let intake = {
            let mut engine = self.engine.borrow_mut();
            let sample = engine.host().sample(event);
            engine.pointer_moved(&sample)
        };

        if intake == Intake::RequestFrame {
            self.request_frame();
        }
    }

    fn request_frame(&self) {
        let tick = self.tick.borrow();
        let Some(tick) = tick.as_ref() else {
            return;
        };

        match self.frames.borrow_mut().request(tick.as_ref().unchecked_ref()) {
            Ok(handle) => self.pending_frame.set(Some(handle)),
            Err(error) => {
                tracing::error!(%error, "failed to request a frame");
                self.engine.borrow_mut().cancel_pending();
            }
        }
    }

    fn on_tick(&self) {
        self.pending_frame.set(None);
        self.engine.borrow_mut().tick();
    }

    fn pointer_left(&self) {
        let delay = self.engine.borrow_mut().pointer_left();
        self.clear_reset();

        let reset = self.reset.borrow();
        let Some(reset) = reset.as_ref() else {
            return;
        };

        let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(reset.as_ref().unchecked_ref(), timeout)
        {
            Ok(id) => self.pending_reset.set(Some(id)),
            Err(error) => tracing::error!(error = ?error, "failed to schedule layer reset"),
        }
    }

    fn on_reset(&self) {
        self.pending_reset.set(None);
        self.engine.borrow_mut().reset_after_leave();
    }

    fn window_resized(&self) {
        self.engine.borrow_mut().window_resized(now_ms(&self.window));
    }

    fn clear_reset(&self) {
        if let Some(id) = self.pending_reset.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn cancel_frame(&self) {
        if let Some(handle) = self.pending_frame.take() {
            self.frames.borrow().cancel(handle);
        }
        self.engine.borrow_mut().cancel_pending();
    }
}

/// Listener closures kept alive for as long as they are registered.
struct Listeners {
    wrapper: HtmlElement,
    mouse_move: MouseClosure,
    mouse_leave: MouseClosure,
    resize: EventClosure,
}

/// One layered tilt effect replacing an `<img>` element.
#[wasm_bindgen]
pub struct TiltFx {
    shared: Rc<Shared>,
    listeners: Option<Listeners>,
}

#[wasm_bindgen]
impl TiltFx {
    /// Replace `image` with a layered tilt container.
    ///
    /// `options` is a plain object with any subset of the configuration
    /// fields; `undefined` or `null` selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(image: HtmlImageElement, options: JsValue) -> Result<TiltFx, JsValue> {
        let config = parse_options(options)?;
        Ok(Self::attach(image, &config)?)
    }

    /// Number of layers that follow the pointer.
    #[wasm_bindgen(js_name = layerCount)]
    pub fn layer_count(&self) -> usize {
        self.shared.engine.borrow().stack().layer_count()
    }

    /// Remove every event subscription and cancel pending callbacks.
    ///
    /// The layered container stays in the document at rest position.
    pub fn destroy(&mut self) {
        let Some(listeners) = self.listeners.take() else {
            return;
        };

        let wrapper = &listeners.wrapper;
        let _ = wrapper.remove_event_listener_with_callback(
            "mousemove",
            listeners.mouse_move.as_ref().unchecked_ref(),
        );
        let _ = wrapper.remove_event_listener_with_callback(
            "mouseleave",
            listeners.mouse_leave.as_ref().unchecked_ref(),
        );
        let _ = self
            .shared
            .window
            .remove_event_listener_with_callback("resize", listeners.resize.as_ref().unchecked_ref());

        self.shared.cancel_frame();
        self.shared.clear_reset();
        self.shared.tick.borrow_mut().take();
        self.shared.reset.borrow_mut().take();

        tracing::debug!("tilt effect destroyed");
    }
}

impl TiltFx {
    /// Build the layers for `image` and subscribe to pointer and resize
    /// events.
    pub fn attach(image: HtmlImageElement, config: &LayerConfig) -> Result<TiltFx, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;

        let host = DomHost::new(document, image)?;
        let source = host.source();
        let engine = TiltEngine::new(host, &source, config)?;

        let shared = Rc::new(Shared {
            engine: RefCell::new(engine),
            frames: RefCell::new(FrameRequester::detect(window.clone())),
            window,
            pending_frame: Cell::new(None),
            pending_reset: Cell::new(None),
            tick: RefCell::new(None),
            reset: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        *shared.tick.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: JsValue| {
            with_shared(&weak, Shared::on_tick);
        }) as Box<dyn FnMut(JsValue)>));

        let weak = Rc::downgrade(&shared);
        *shared.reset.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            with_shared(&weak, Shared::on_reset);
        }) as Box<dyn FnMut()>));

        let listeners = subscribe(&shared)?;
        tracing::debug!(
            layers = shared.engine.borrow().stack().layer_count(),
            emulated_frames = shared.frames.borrow().is_emulated(),
            "tilt effect attached"
        );

        Ok(TiltFx {
            shared,
            listeners: Some(listeners),
        })
    }
}

impl Drop for TiltFx {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn subscribe(shared: &Rc<Shared>) -> Result<Listeners, WebError> {
    let wrapper = shared.engine.borrow().host().wrapper().clone();

    let weak = Rc::downgrade(shared);
    let mouse_move = Closure::wrap(Box::new(move |event: MouseEvent| {
        with_shared(&weak, |shared| shared.pointer_moved(&event));
    }) as Box<dyn FnMut(MouseEvent)>);

    let weak = Rc::downgrade(shared);
    let mouse_leave = Closure::wrap(Box::new(move |_event: MouseEvent| {
        with_shared(&weak, Shared::pointer_left);
    }) as Box<dyn FnMut(MouseEvent)>);

    let weak = Rc::downgrade(shared);
    let resize = Closure::wrap(Box::new(move |_event: Event| {
        with_shared(&weak, Shared::window_resized);
    }) as Box<dyn FnMut(Event)>);

    wrapper.add_event_listener_with_callback("mousemove", mouse_move.as_ref().unchecked_ref())?;
    wrapper.add_event_listener_with_callback("mouseleave", mouse_leave.as_ref().unchecked_ref())?;
    shared
        .window
        .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;

    Ok(Listeners {
        wrapper,
        mouse_move,
        mouse_leave,
        resize,
    })
}

fn with_shared(weak: &Weak<Shared>, f: impl FnOnce(&Shared)) {
    if let Some(shared) = weak.upgrade() {
        f(&shared);
    }
}

/// Read configuration from a JS options object.
pub fn parse_options(options: JsValue) -> Result<LayerConfig, WebError> {
    if options.is_undefined() || options.is_null() {
        return Ok(LayerConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(options)?)
}
