//! Classification service protocol and the in-flight request contract.
//!
//! The service itself is a black box reached over HTTP by the front ends;
//! this module owns everything that does not depend on the transport: the
//! request body, response parsing, and the single-request gate that keeps the
//! predict control disabled while a call is pending.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClassifierError, Result};
use crate::feature_map::{FeatureMap, LayerActivations};
use crate::grid::IntensityGrid;
use crate::scores::{render_scores, Ranking};

/// Prefix of the per-channel feature-map fields, e.g. `featuremap210` is
/// layer 2, channel 10.
pub const FEATURE_MAP_PREFIX: &str = "featuremap";

/// Message used when a failed response carries none.
pub const DEFAULT_FAILURE: &str = "Prediction failed";

// ============================================================================
// Request
// ============================================================================

/// Body of the classification request: `{"pixels": [[...28 floats] x 28]}`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRequest<'a> {
    pub pixels: &'a IntensityGrid,
}

impl<'a> ClassificationRequest<'a> {
    pub fn new(pixels: &'a IntensityGrid) -> Self {
        Self { pixels }
    }

    pub fn to_json(&self) -> String {
        // A grid of finite floats always serializes.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"pixels\":[]}"))
    }
}

// ============================================================================
// Response
// ============================================================================

/// A successful classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub probabilities: Vec<f64>,
    pub latency_ms: Option<f64>,
    pub layers: LayerActivations,
}

impl Prediction {
    pub fn ranking(&self) -> Result<Ranking> {
        render_scores(&self.probabilities)
    }

    /// Status line text, e.g. `Latency: 12ms`.
    pub fn latency_text(&self) -> Option<String> {
        self.latency_ms.map(|ms| format!("Latency: {}ms", ms))
    }
}

/// Split `featuremap<L><I>` into `(layer, index)`; the layer is one digit.
pub fn parse_feature_map_key(key: &str) -> Option<(usize, usize)> {
    let digits = key.strip_prefix(FEATURE_MAP_PREFIX)?;
    if digits.len() < 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let layer = digits[..1].parse().ok()?;
    let index = digits[1..].parse().ok()?;
    Some((layer, index))
}

fn layer_name(layer_names: &[String], layer: usize) -> String {
    layer
        .checked_sub(1)
        .and_then(|i| layer_names.get(i))
        .cloned()
        .unwrap_or_else(|| format!("layer{}", layer))
}

fn malformed(msg: impl Into<String>) -> ClassifierError {
    ClassifierError::Malformed(msg.into())
}

fn collect_layers(
    obj: &Map<String, Value>,
    layer_names: &[String],
) -> Result<LayerActivations, ClassifierError> {
    let mut keyed: Vec<(usize, usize, &str, &Value)> = obj
        .iter()
        .filter_map(|(k, v)| parse_feature_map_key(k).map(|(l, i)| (l, i, k.as_str(), v)))
        .collect();
    keyed.sort_by_key(|&(l, i, _, _)| (l, i));

    let mut layers = LayerActivations::new();
    for (layer, _, key, value) in keyed {
        let map = feature_map_from_value(key, value)?;
        layers.push(&layer_name(layer_names, layer), vec![map]);
    }
    Ok(layers)
}

/// Parse a response body.
///
/// Anything other than a JSON object with `"status": "success"` and a
/// non-empty numeric `probabilities` array is a failure. Feature-map fields are grouped
/// by layer number (named through `layer_names`, 1-based) in channel order.
pub fn parse_response(
    body: &str,
    layer_names: &[String],
) -> Result<Prediction, ClassifierError> {
    let value: Value = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| malformed("response is not a JSON object"))?;

    if obj.get("status").and_then(Value::as_str) != Some("success") {
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_FAILURE);
        return Err(ClassifierError::Status(message.to_string()));
    }

    let probabilities = obj
        .get("probabilities")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing probabilities"))?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| malformed("probabilities must be numbers"))?;
    if probabilities.is_empty() {
        return Err(malformed("probabilities is empty"));
    }

    let latency_ms = obj.get("latency_ms").and_then(Value::as_f64);
    let layers = collect_layers(obj, layer_names)?;
    debug!(
        "prediction parsed: {} classes, {} layers, {} maps",
        probabilities.len(),
        layers.len(),
        layers.total_maps()
    );

    Ok(Prediction {
        probabilities,
        latency_ms,
        layers,
    })
}

fn feature_map_from_value(key: &str, value: &Value) -> Result<FeatureMap, ClassifierError> {
    let rows: Vec<Vec<f64>> =
        serde_json::from_value(value.clone()).map_err(|e| malformed(format!("{}: {}", key, e)))?;
    FeatureMap::from_rows(&rows).map_err(|e| malformed(format!("{}: {}", key, e)))
}

/// The alert text shown for any failed attempt.
pub fn failure_message(err: &ClassifierError) -> String {
    let reason = err.to_string();
    if reason.is_empty() {
        format!("Prediction failed: {}", DEFAULT_FAILURE)
    } else {
        format!("Prediction failed: {}", reason)
    }
}

// ============================================================================
// In-flight gate
// ============================================================================

/// Status badge state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PredictionStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error(String),
}

impl PredictionStatus {
    pub fn badge_text(&self) -> &'static str {
        match self {
            PredictionStatus::Idle => "",
            PredictionStatus::Processing => "Processing",
            PredictionStatus::Success => "Success",
            PredictionStatus::Error(_) => "Error",
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    status: PredictionStatus,
}

/// Allows one prediction at a time.
///
/// Clones share state, so the UI and the pending future see the same gate.
#[derive(Debug, Clone, Default)]
pub struct PredictionGate {
    state: Rc<RefCell<GateState>>,
}

impl PredictionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. Fails with [`ClassifierError::Busy`] while another
    /// request is pending.
    pub fn try_begin(&self) -> Result<InFlight, ClassifierError> {
        let mut state = self.state.borrow_mut();
        if state.in_flight {
            warn!("prediction requested while one is pending");
            return Err(ClassifierError::Busy);
        }
        state.in_flight = true;
        state.status = PredictionStatus::Processing;
        Ok(InFlight {
            state: Rc::clone(&self.state),
            settled: false,
        })
    }

    /// `true` while a request is pending; the trigger control is disabled.
    pub fn is_busy(&self) -> bool {
        self.state.borrow().in_flight
    }

    pub fn status(&self) -> PredictionStatus {
        self.state.borrow().status.clone()
    }

    /// Back to idle, e.g. after the user clears the drawing.
    pub fn clear_status(&self) {
        let mut state = self.state.borrow_mut();
        if !state.in_flight {
            state.status = PredictionStatus::Idle;
        }
    }
}

/// Proof that a request is pending. Dropping it re-opens the gate whatever
/// the outcome, including an unwinding panic or a dropped future.
#[derive(Debug)]
pub struct InFlight {
    state: Rc<RefCell<GateState>>,
    settled: bool,
}

impl InFlight {
    /// Record the outcome and re-open the gate.
    pub fn settle(mut self, outcome: &Result<Prediction, ClassifierError>) {
        let status = match outcome {
            Ok(_) => PredictionStatus::Success,
            Err(e) => PredictionStatus::Error(failure_message(e)),
        };
        self.state.borrow_mut().status = status;
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.in_flight = false;
        if !self.settled {
            state.status =
                PredictionStatus::Error(failure_message(&ClassifierError::Transport(
                    "request abandoned".into(),
                )));
        }
    }
}
