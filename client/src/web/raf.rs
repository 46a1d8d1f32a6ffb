use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::render_loop::{FrameScheduler, FrameToken};

/// `requestAnimationFrame`-backed frame scheduler.
///
/// Holds one JS closure for its whole life and hands it to the browser on each
/// `schedule`. The closure runs `on_frame`, which is expected to call back
/// into the owning view's `frame()`.
pub struct RafScheduler {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl RafScheduler {
    pub fn new(mut on_frame: impl FnMut() + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            callback: RefCell::new(None),
        });
        let cb = Closure::<dyn FnMut()>::new(move || on_frame());
        *inner.callback.borrow_mut() = Some(cb);
        Self { inner }
    }
}

impl FrameScheduler for RafScheduler {
    fn schedule(&mut self) -> Option<FrameToken> {
        let window = self.inner.window.as_ref()?;
        let cb_ref = self.inner.callback.borrow();
        let cb = cb_ref.as_ref()?;
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .ok()
            .map(FrameToken)
    }

    fn cancel(&mut self, token: FrameToken) {
        if let Some(window) = self.inner.window.as_ref() {
            let _ = window.cancel_animation_frame(token.0);
        }
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        // The view cancels its pending frame before this runs; dropping the
        // closure releases whatever `on_frame` captured.
        self.inner.callback.borrow_mut().take();
    }
}
