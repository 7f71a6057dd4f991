//! End-to-end flow: draw, serialize, parse a canned response, visualize.

use digit_sketch::basics::PointD;
use digit_sketch::classifier::{parse_response, ClassificationRequest};
use digit_sketch::color::Rgba8;
use digit_sketch::config::SketchConfig;
use digit_sketch::preset::digit_two;
use digit_sketch::visualizer::{render_grid, render_layers};
use digit_sketch::{ClassifierError, IntensityGrid, StrokeRasterizer};
use serde_json::{json, Value};

fn canned_response() -> String {
    let ramp: Vec<Vec<f64>> = (0..4)
        .map(|y| (0..4).map(|x| (y * 4 + x) as f64).collect())
        .collect();
    json!({
        "status": "success",
        "probabilities": [0.01, 0.02, 0.7, 0.05, 0.02, 0.05, 0.05, 0.05, 0.03, 0.02],
        "latency_ms": 18,
        "featuremap11": ramp,
        "featuremap12": [[1.0, 1.0], [1.0, 1.0]],
        "featuremap21": [[0.0, 2.0], [4.0, 6.0]],
        "featuremap31": [[5.0]],
    })
    .to_string()
}

#[test]
fn test_stroke_to_request_body() {
    let mut r = StrokeRasterizer::new();
    r.begin_stroke(PointD::new(70.0, 140.0));
    assert_eq!(r.continue_stroke(PointD::new(210.0, 140.0)), 21);
    r.end_stroke();

    let body: Value =
        serde_json::from_str(&ClassificationRequest::new(r.grid()).to_json()).unwrap();
    let pixels = body["pixels"].as_array().unwrap();
    assert_eq!(pixels.len(), 28);
    assert!(pixels.iter().all(|row| row.as_array().unwrap().len() == 28));

    // Cell 14 takes two centre hits and one side hit from each neighbour.
    let centre = pixels[14][14].as_f64().unwrap();
    assert!((centre - 0.45).abs() < 1e-9);
    assert!(pixels[13][14].as_f64().unwrap() < centre);
    assert_eq!(pixels[0][0].as_f64().unwrap(), 0.0);

    let back: IntensityGrid = serde_json::from_value(body["pixels"].clone()).unwrap();
    assert_eq!(&back, r.grid());
}

#[test]
fn test_response_to_images_and_ranking() {
    let config = SketchConfig::default();
    let prediction = parse_response(&canned_response(), &config.layer_names).unwrap();
    assert_eq!(prediction.latency_text().as_deref(), Some("Latency: 18ms"));

    let ranking = prediction.ranking().unwrap();
    assert_eq!(ranking.best().label, 2);
    assert_eq!(ranking.best().percentage, "70.0");
    assert_eq!(ranking.best_label(), "Digit \"2\"");

    let rendered = render_layers(&prediction.layers);
    let names: Vec<&str> = rendered.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["conv", "relu", "maxpool"]);

    let conv = &rendered[0].1;
    assert_eq!(conv.len(), 2);
    assert_eq!((conv[0].width, conv[0].height), (4, 4));
    assert_eq!(conv[0].pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(conv[0].pixel(3, 3), [255, 255, 255, 255]);
    // A constant map renders black.
    assert_eq!(conv[1].pixel(1, 1), [0, 0, 0, 255]);
    // A single-cell map is constant too.
    assert_eq!(rendered[2].1[0].pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn test_failed_response_reports_message() {
    let err = parse_response(r#"{"status": "error", "message": "model offline"}"#, &[])
        .unwrap_err();
    assert_eq!(err, ClassifierError::Status("model offline".into()));
}

#[test]
fn test_preset_then_reset() {
    let mut r = StrokeRasterizer::new();
    r.load_preset(digit_two());
    let img = render_grid(r.grid());
    // Cell (3, 23) is fully lit in the preset.
    assert_eq!(img.pixel(35, 235), [255, 255, 255, 255]);
    assert!(!img.is_transparent());

    // Every cell's square carries the cell's intensity as opacity.
    for (x, y, v) in r.grid().iter_cells() {
        let expected = Rgba8::from_double(v);
        let (px, py) = (x as u32 * 10, y as u32 * 10);
        assert_eq!(img.pixel(px, py)[3], expected, "cell ({}, {})", x, y);
        assert_eq!(img.pixel(px + 9, py + 9)[3], expected, "cell ({}, {})", x, y);
    }

    r.reset();
    assert!(r.grid().is_blank());
    assert!(render_grid(r.grid()).is_transparent());
}
