use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use scrollee_engine::scroll::global;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, Window};

/// Milliseconds since page load as a `Duration`
fn now(window: &Window) -> Duration {
    let millis = window
        .performance()
        .map(|performance| performance.now())
        .unwrap_or(0.0);
    Duration::from_secs_f64(millis.max(0.0) / 1000.0)
}

/// One-shot `setTimeout` that ends the scroll when it fires, restarted on
/// every scroll event
struct ScrollEndTimer {
    window: Window,
    delay_ms: i32,
    handle: Rc<Cell<Option<i32>>>,
    callback: Closure<dyn FnMut()>,
}

impl ScrollEndTimer {
    fn new(window: Window, delay: Duration) -> Self {
        let handle = Rc::new(Cell::new(None));
        let fired = handle.clone();
        let callback = Closure::wrap(Box::new(move || {
            fired.set(None);
            global::with(|broadcaster| {
                if broadcaster.scroll_end_deadline().is_some() {
                    broadcaster.end_scroll();
                }
            });
        }) as Box<dyn FnMut()>);

        Self {
            window,
            delay_ms: delay.as_millis().min(i32::MAX as u128) as i32,
            handle,
            callback,
        }
    }

    fn restart(&self) {
        self.cancel();
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.callback.as_ref().unchecked_ref(),
                self.delay_ms,
            ) {
            Ok(handle) => self.handle.set(Some(handle)),
            Err(e) => log::warn!("failed to schedule scroll end: {e:?}"),
        }
    }

    fn cancel(&self) {
        if let Some(handle) = self.handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// Window `scroll`/`resize` listeners feeding the global broadcaster.
///
/// Listeners stay installed until [`ScrolleeBinding::disable`] is called or
/// the binding is dropped.
pub struct ScrolleeBinding {
    window: Window,
    timer: Rc<ScrollEndTimer>,
    scroll_closure: Closure<dyn FnMut(Event)>,
    resize_closure: Closure<dyn FnMut(Event)>,
    listening: bool,
}

impl ScrolleeBinding {
    /// Bring up the global broadcaster if needed and start listening
    pub fn install(scroll_end_delay: Duration) -> Result<Self, wasm_bindgen::JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        global::init(scroll_end_delay);
        let delay = global::with(|broadcaster| broadcaster.scroll_end_delay())
            .unwrap_or(scroll_end_delay);
        let timer = Rc::new(ScrollEndTimer::new(window.clone(), delay));

        let scroll_closure = {
            let window = window.clone();
            let timer = timer.clone();
            Closure::wrap(Box::new(move |_event: Event| {
                let offset = window.scroll_y().unwrap_or(0.0);
                let now = now(&window);
                global::with(|broadcaster| broadcaster.handle_scroll(offset, now));
                timer.restart();
            }) as Box<dyn FnMut(Event)>)
        };
        let resize_closure = Closure::wrap(Box::new(move |_event: Event| {
            global::with(|broadcaster| broadcaster.handle_resize());
        }) as Box<dyn FnMut(Event)>);

        window.add_event_listener_with_callback(
            "scroll",
            scroll_closure.as_ref().unchecked_ref(),
        )?;
        window.add_event_listener_with_callback(
            "resize",
            resize_closure.as_ref().unchecked_ref(),
        )?;
        log::debug!("window scroll listeners installed");

        Ok(Self {
            window,
            timer,
            scroll_closure,
            resize_closure,
            listening: true,
        })
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Remove the window listeners and drop any pending scroll end
    pub fn disable(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        self.timer.cancel();

        for (kind, closure) in [
            ("scroll", &self.scroll_closure),
            ("resize", &self.resize_closure),
        ] {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            {
                log::warn!("failed to remove {kind} listener: {e:?}");
            }
        }
        global::with(|broadcaster| broadcaster.disable());
        log::debug!("window scroll listeners removed");
    }
}

impl Drop for ScrolleeBinding {
    fn drop(&mut self) {
        self.disable();
    }
}
