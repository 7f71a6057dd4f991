//! POST the grid to the classification service with the browser's `fetch`.

use std::cell::Cell;
use std::rc::Rc;

use digit_sketch::classifier::{parse_response, Prediction};
use digit_sketch::ClassifierError;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response, Window};

use crate::utils::js_value_to_string;

fn transport(err: JsValue) -> ClassifierError {
    ClassifierError::Transport(js_value_to_string(&err))
}

/// Aborts the request when it fires; cleared on drop.
struct AbortTimer {
    window: Window,
    handle: i32,
    fired: Rc<Cell<bool>>,
    _callback: Closure<dyn FnMut()>,
}

impl AbortTimer {
    fn start(window: &Window, controller: &AbortController, ms: u64) -> Result<Self, ClassifierError> {
        let fired = Rc::new(Cell::new(false));
        let callback = {
            let fired = Rc::clone(&fired);
            let controller = controller.clone();
            Closure::wrap(Box::new(move || {
                fired.set(true);
                controller.abort();
            }) as Box<dyn FnMut()>)
        };
        let timeout = i32::try_from(ms).unwrap_or(i32::MAX);
        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                timeout,
            )
            .map_err(transport)?;
        Ok(Self {
            window: window.clone(),
            handle,
            fired,
            _callback: callback,
        })
    }

    fn fired(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for AbortTimer {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.handle);
    }
}

/// Send `body` to `url` and parse the reply.
///
/// With `timeout_ms` set, the request is aborted once it elapses and the
/// failure is reported as [`ClassifierError::Timeout`].
pub(crate) async fn fetch_prediction(
    url: String,
    body: String,
    timeout_ms: Option<u64>,
    layer_names: Vec<String>,
) -> Result<Prediction, ClassifierError> {
    let window =
        web_sys::window().ok_or_else(|| ClassifierError::Transport("no window".into()))?;
    let controller = AbortController::new().map_err(transport)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(&body));
    init.set_signal(Some(&controller.signal()));
    let request = Request::new_with_str_and_init(&url, &init).map_err(transport)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(transport)?;

    let timer = timeout_ms
        .map(|ms| AbortTimer::start(&window, &controller, ms))
        .transpose()?;
    let timed_out = |err: JsValue| match (&timer, timeout_ms) {
        (Some(t), Some(ms)) if t.fired() => ClassifierError::Timeout(ms),
        _ => transport(err),
    };

    debug!("POST {} ({} bytes)", url, body.len());
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(&timed_out)?
        .dyn_into()
        .map_err(transport)?;
    if !response.ok() {
        warn!("classifier answered HTTP {}", response.status());
    }
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(&timed_out)?;
    let text = text
        .as_string()
        .ok_or_else(|| ClassifierError::Malformed("response body is not text".into()))?;

    parse_response(&text, &layer_names)
}
