use digit_sketch::basics::PointD;
use digit_sketch::classifier::{
    failure_message, ClassificationRequest, Prediction, PredictionGate,
};
use digit_sketch::config::SketchConfig;
use digit_sketch::diagram::{output_fill, NetworkDiagram};
use digit_sketch::image::RgbaImage;
use digit_sketch::preset::digit_two;
use digit_sketch::scores::Ranking;
use digit_sketch::visualizer::{compose_grid_image, feature_map_to_image, render_grid};
use digit_sketch::StrokeRasterizer;
use log::{info, LevelFilter};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

mod console_log;
mod fetch;
mod utils;

use utils::js_error;

#[wasm_bindgen(start)]
pub fn start() {
    console_log::init(LevelFilter::Info);
}

/// Route `log` output below `level` ("error" .. "trace") to the console.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: LevelFilter = level.parse().map_err(js_error)?;
    console_log::init(filter);
    Ok(())
}

/// Get the library version string.
#[wasm_bindgen]
pub fn version() -> String {
    format!("digit-sketch {}", env!("CARGO_PKG_VERSION"))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| js_error("canvas: missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| js_error("canvas: context is not 2d"))
}

fn put_image(canvas: &HtmlCanvasElement, img: &RgbaImage) -> Result<(), JsValue> {
    let ctx = context_2d(canvas)?;
    ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    let data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(&img.data),
        img.width,
        img.height,
    )?;
    ctx.put_image_data(&data, 0.0, 0.0)
}

/// One drawing session bound to a configuration.
///
/// Pointer coordinates are canvas pixels in `[0, 280)`.
#[wasm_bindgen]
pub struct Sketchpad {
    raster: StrokeRasterizer,
    config: SketchConfig,
    gate: PredictionGate,
}

#[wasm_bindgen]
impl Sketchpad {
    /// `config_json` may be omitted or any subset of the configuration fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Sketchpad, JsValue> {
        let config = match config_json {
            Some(s) => SketchConfig::from_json_str(&s).map_err(js_error)?,
            None => SketchConfig::default(),
        };
        info!("sketchpad ready, classifier at {}", config.predict_url());
        Ok(Self {
            raster: StrokeRasterizer::new(),
            config,
            gate: PredictionGate::new(),
        })
    }

    pub fn begin_stroke(&mut self, x: f64, y: f64) {
        self.raster.begin_stroke(PointD::new(x, y));
    }

    pub fn continue_stroke(&mut self, x: f64, y: f64) -> usize {
        self.raster.continue_stroke(PointD::new(x, y))
    }

    pub fn end_stroke(&mut self) {
        self.raster.end_stroke();
    }

    pub fn is_drawing(&self) -> bool {
        self.raster.is_drawing()
    }

    pub fn reset(&mut self) {
        self.raster.reset();
        self.gate.clear_status();
    }

    pub fn load_preset(&mut self) {
        self.raster.load_preset(digit_two());
    }

    /// Milliseconds to wait after the preset before the first prediction.
    pub fn autopredict_delay_ms(&self) -> u32 {
        u32::try_from(self.config.autopredict_delay_ms).unwrap_or(u32::MAX)
    }

    /// Grid intensities, row-major.
    pub fn grid_values(&self) -> Vec<f64> {
        self.raster
            .grid()
            .rows()
            .iter()
            .flat_map(|row| row.iter().copied())
            .collect()
    }

    /// 280×280 RGBA pixels of the strokes on a transparent background.
    pub fn grid_pixels(&self) -> Vec<u8> {
        render_grid(self.raster.grid()).data
    }

    /// Paint the grid, optionally over the guide lines.
    pub fn paint(&self, canvas: &HtmlCanvasElement, guides: bool) -> Result<(), JsValue> {
        let img = if guides {
            compose_grid_image(self.raster.grid())
        } else {
            render_grid(self.raster.grid())
        };
        put_image(canvas, &img)
    }

    pub fn request_body(&self) -> String {
        ClassificationRequest::new(self.raster.grid()).to_json()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn status_badge(&self) -> String {
        self.gate.status().badge_text().to_string()
    }

    /// Classify the current grid.
    ///
    /// Rejects immediately while another prediction is pending. The promise
    /// resolves to a [`PredictionView`] or rejects with the alert text.
    pub fn predict(&self) -> Result<js_sys::Promise, JsValue> {
        let in_flight = self
            .gate
            .try_begin()
            .map_err(|e| js_error(failure_message(&e)))?;
        let url = self.config.predict_url();
        let body = self.request_body();
        let timeout = self.config.request_timeout_ms;
        let layer_names = self.config.layer_names.clone();

        Ok(wasm_bindgen_futures::future_to_promise(async move {
            let outcome = fetch::fetch_prediction(url, body, timeout, layer_names).await;
            in_flight.settle(&outcome);
            match outcome {
                Ok(prediction) => Ok(PredictionView::new(prediction)?.into()),
                Err(err) => Err(js_error(failure_message(&err))),
            }
        }))
    }
}

/// A successful prediction, ready for display.
#[wasm_bindgen]
pub struct PredictionView {
    prediction: Prediction,
    ranking: Ranking,
}

impl PredictionView {
    fn new(prediction: Prediction) -> Result<Self, JsValue> {
        let ranking = prediction.ranking().map_err(js_error)?;
        Ok(Self {
            prediction,
            ranking,
        })
    }
}

#[wasm_bindgen]
impl PredictionView {
    pub fn probabilities(&self) -> Vec<f64> {
        self.prediction.probabilities.clone()
    }

    pub fn best_label(&self) -> String {
        self.ranking.best_label()
    }

    /// Scores best first, as JSON `[{label, percentage, is_top}, ...]`.
    pub fn scores_json(&self) -> String {
        let entries: Vec<_> = self
            .ranking
            .entries()
            .iter()
            .map(|e| json!({"label": e.label, "percentage": e.percentage, "is_top": e.is_top}))
            .collect();
        serde_json::Value::Array(entries).to_string()
    }

    pub fn scores_text(&self) -> String {
        self.ranking.to_string()
    }

    pub fn latency_text(&self) -> Option<String> {
        self.prediction.latency_text()
    }

    /// CSS fill of output neuron `label`.
    pub fn output_fill(&self, label: usize) -> String {
        let p = self
            .prediction
            .probabilities
            .get(label)
            .copied()
            .unwrap_or(0.0);
        output_fill(p).to_css()
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.prediction.layers.names().map(str::to_string).collect()
    }

    pub fn map_count(&self, layer: &str) -> usize {
        self.prediction.layers.get(layer).map_or(0, <[_]>::len)
    }

    /// Paint feature map `index` of `layer` at its native size.
    pub fn paint_feature_map(
        &self,
        canvas: &HtmlCanvasElement,
        layer: &str,
        index: usize,
    ) -> Result<(), JsValue> {
        let map = self
            .prediction
            .layers
            .get(layer)
            .and_then(|maps| maps.get(index))
            .ok_or_else(|| js_error(format!("no feature map {}[{}]", layer, index)))?;
        let img = feature_map_to_image(map);
        canvas.set_width(img.width);
        canvas.set_height(img.height);
        put_image(canvas, &img)
    }
}

/// Network diagram geometry as JSON, for the SVG overlay.
#[wasm_bindgen]
pub fn network_layout() -> String {
    let diagram = NetworkDiagram::mnist_default();
    let layers: Vec<_> = diagram
        .layers()
        .iter()
        .map(|l| {
            let rects: Vec<_> = l
                .neuron_rects()
                .iter()
                .map(|r| json!([r.x1, r.y1, r.x2 - r.x1, r.y2 - r.y1]))
                .collect();
            let anchor = l.label_anchor();
            json!({
                "key": l.key,
                "label": l.label,
                "kind": format!("{:?}", l.kind),
                "stroke": l.stroke.to_css(),
                "rects": rects,
                "label_at": [anchor.x, anchor.y],
            })
        })
        .collect();
    let connections: Vec<_> = diagram
        .all_connections()
        .iter()
        .map(|s| json!([s.from.x, s.from.y, s.to.x, s.to.y]))
        .collect();
    json!({"layers": layers, "connections": connections}).to_string()
}
