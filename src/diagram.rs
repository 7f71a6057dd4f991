//! Static layout of the network diagram.
//!
//! Pure geometry: neuron boxes, a thinned set of connection segments, and
//! label anchors for each column. Renderers (SVG in the browser, the native
//! tool) draw these however they like.

use crate::basics::{PointD, RectD};
use crate::color::Rgba8;

/// Vertical centre line every column is laid out around.
pub const DIAGRAM_CENTER_Y: f64 = 450.0;
/// Gap between neurons stacked in a column.
pub const ROW_GAP: f64 = 10.0;
/// Gap between neuron columns inside one layer.
pub const COL_GAP: f64 = 15.0;
/// Distance from the bottom of a column to its title baseline.
pub const LABEL_OFFSET: f64 = 30.0;

/// Fill used for output neurons, scaled by class probability.
pub const OUTPUT_COLOR: Rgba8 = Rgba8::from_hex(0x137fec);

/// Diagram columns that show the response's feature-map layers 1, 2, 3.
const FEATURE_LAYER_KEYS: [&str; 3] = ["conv", "relu", "maxpool"];

pub fn feature_layer_keys() -> &'static [&'static str] {
    &FEATURE_LAYER_KEYS
}

/// How a column is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeuronKind {
    /// Square tile holding an image (input grid or feature map).
    Tile,
    /// Round node with no image.
    Node,
    /// Square tile with a class label, filled by probability.
    Output,
}

/// One column of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub x: f64,
    pub neurons: usize,
    pub size: f64,
    pub cols: usize,
    pub kind: NeuronKind,
    pub stroke: Rgba8,
}

impl LayerSpec {
    fn rows(&self) -> usize {
        self.neurons.div_ceil(self.cols.max(1))
    }

    fn start_y(&self) -> f64 {
        DIAGRAM_CENTER_Y - (self.rows() as f64 * (self.size + ROW_GAP)) / 2.0
    }

    /// Top-left corner of neuron `i`.
    pub fn neuron_origin(&self, i: usize) -> PointD {
        let cols = self.cols.max(1);
        let (row, col) = (i / cols, i % cols);
        PointD::new(
            self.x + col as f64 * (self.size + COL_GAP),
            self.start_y() + row as f64 * (self.size + ROW_GAP),
        )
    }

    pub fn neuron_center(&self, i: usize) -> PointD {
        let o = self.neuron_origin(i);
        PointD::new(o.x + self.size / 2.0, o.y + self.size / 2.0)
    }

    pub fn neuron_rects(&self) -> Vec<RectD> {
        (0..self.neurons)
            .map(|i| {
                let o = self.neuron_origin(i);
                RectD::new(o.x, o.y, o.x + self.size, o.y + self.size)
            })
            .collect()
    }

    /// Centre of the column title.
    pub fn label_anchor(&self) -> PointD {
        let height = self.rows() as f64 * (self.size + ROW_GAP);
        let cols = self.cols.max(1);
        PointD::new(
            self.x + ((cols - 1) as f64 * (self.size + COL_GAP)) / 2.0 + self.size / 2.0,
            DIAGRAM_CENTER_Y + height / 2.0 + LABEL_OFFSET,
        )
    }
}

/// A connection line between two neuron centres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: PointD,
    pub to: PointD,
}

/// Ordered columns of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkDiagram {
    layers: Vec<LayerSpec>,
}

impl NetworkDiagram {
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }

    /// The small MNIST CNN the sketchpad visualizes.
    pub fn mnist_default() -> Self {
        let blue = Rgba8::from_hex(0x3b82f6);
        let column = |key, label, x, neurons, size, kind, stroke| LayerSpec {
            key,
            label,
            x,
            neurons,
            size,
            cols: 1,
            kind,
            stroke,
        };
        Self::new(vec![
            column("input", "Input", 50.0, 1, 130.0, NeuronKind::Tile, blue),
            column("conv", "Conv2d + Relu", 400.0, 10, 70.0, NeuronKind::Tile, blue),
            column(
                "relu",
                "conv2d 10 + Relu",
                600.0,
                10,
                70.0,
                NeuronKind::Tile,
                Rgba8::from_hex(0xeab308),
            ),
            column(
                "maxpool",
                "Maxpool2d",
                800.0,
                10,
                70.0,
                NeuronKind::Tile,
                Rgba8::from_hex(0xa855f7),
            ),
            column("dense", "GAP", 1050.0, 10, 40.0, NeuronKind::Node, blue),
            column("dense2", "FCL", 1150.0, 10, 40.0, NeuronKind::Node, blue),
            column(
                "output",
                "Output",
                1350.0,
                10,
                35.0,
                NeuronKind::Output,
                OUTPUT_COLOR,
            ),
        ])
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn layer(&self, key: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.key == key)
    }

    /// Connections from every neuron of `from` to every
    /// `ceil(to.neurons / 3)`-th neuron of `to`.
    pub fn connections(&self, from: &LayerSpec, to: &LayerSpec) -> Vec<Segment> {
        let step = to.neurons.div_ceil(3).max(1);
        let mut out = Vec::new();
        for i in 0..from.neurons {
            for j in (0..to.neurons).step_by(step) {
                out.push(Segment {
                    from: from.neuron_center(i),
                    to: to.neuron_center(j),
                });
            }
        }
        out
    }

    /// Connections between every adjacent pair of columns, drawn first so
    /// they sit behind the neurons.
    pub fn all_connections(&self) -> Vec<Segment> {
        self.layers
            .windows(2)
            .flat_map(|w| self.connections(&w[0], &w[1]))
            .collect()
    }
}

/// Output neuron fill for a class probability.
pub fn output_fill(probability: f64) -> Rgba8 {
    OUTPUT_COLOR.with_alpha(Rgba8::from_double(probability))
}
