/// Refresh-tick requests: `requestAnimationFrame` when the browser has it,
/// otherwise `setTimeout` paced by a [`FrameEmulator`].
use js_sys::{Function, Reflect};
use tiltfx_core::FrameEmulator;
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::error::WebError;

/// A pending frame request that can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHandle {
    Animation(i32),
    Timeout(i32),
}

#[derive(Debug)]
enum Source {
    Native,
    Emulated(FrameEmulator),
}

/// Schedules one callback per request on the next refresh tick.
#[derive(Debug)]
pub struct FrameRequester {
    window: Window,
    source: Source,
}

impl FrameRequester {
    /// Use the native refresh callback if both request and cancel exist.
    pub fn detect(window: Window) -> Self {
        let native = has_function(&window, "requestAnimationFrame")
            && has_function(&window, "cancelAnimationFrame");

        let source = if native {
            Source::Native
        } else {
            tracing::warn!("requestAnimationFrame unavailable, emulating frames with setTimeout");
            Source::Emulated(FrameEmulator::default())
        };

        Self { window, source }
    }

    /// Run `callback` on the next tick. It receives a millisecond timestamp.
    pub fn request(&mut self, callback: &Function) -> Result<FrameHandle, WebError> {
        match &mut self.source {
            Source::Native => {
                let id = self.window.request_animation_frame(callback)?;
                Ok(FrameHandle::Animation(id))
            }
            Source::Emulated(emulator) => {
                let frame = emulator.request(now_ms(&self.window));
                let id = self.window.set_timeout_with_callback_and_timeout_and_arguments_1(
                    callback,
                    frame.delay_ms.ceil() as i32,
                    &JsValue::from_f64(frame.timestamp_ms),
                )?;
                Ok(FrameHandle::Timeout(id))
            }
        }
    }

    pub fn cancel(&self, handle: FrameHandle) {
        match handle {
            FrameHandle::Animation(id) => {
                let _ = self.window.cancel_animation_frame(id);
            }
            FrameHandle::Timeout(id) => self.window.clear_timeout_with_handle(id),
        }
    }

    pub fn is_emulated(&self) -> bool {
        matches!(self.source, Source::Emulated(_))
    }
}

/// Milliseconds on the page's monotonic clock, or wall-clock time when the
/// window has no `performance` object.
pub fn now_ms(window: &Window) -> f64 {
    match window.performance() {
        Some(performance) => performance.now(),
        None => js_sys::Date::now(),
    }
}

fn has_function(window: &Window, name: &str) -> bool {
    Reflect::get(window, &JsValue::from_str(name))
        .map(|value| value.is_function())
        .unwrap_or(false)
}
