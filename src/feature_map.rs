//! Classifier feature maps and the named per-layer collection they arrive in.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SketchError};

/// Square matrix of activations for one channel of one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<Vec<f64>>")]
pub struct FeatureMap {
    side: usize,
    values: Vec<f64>,
}

impl FeatureMap {
    /// Build from nested rows. Empty and non-square input is rejected.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let side = rows.len();
        if side == 0 {
            return Err(SketchError::EmptyInput("feature map"));
        }
        let mut values = Vec::with_capacity(side * side);
        for (row, r) in rows.iter().enumerate() {
            if r.len() != side {
                return Err(SketchError::NotSquare {
                    row,
                    len: r.len(),
                    expected: side,
                });
            }
            values.extend_from_slice(r);
        }
        Ok(Self { side, values })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.side + x]
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest and largest activation.
    pub fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Min-max normalize into `[0, 1]`, row-major.
    ///
    /// A constant map has no range and normalizes to all zeros.
    pub fn normalized(&self) -> Vec<f64> {
        let (min, max) = self.min_max();
        if max > min {
            let range = max - min;
            self.values.iter().map(|v| (v - min) / range).collect()
        } else {
            vec![0.0; self.values.len()]
        }
    }
}

impl From<FeatureMap> for Vec<Vec<f64>> {
    fn from(map: FeatureMap) -> Self {
        map.values.chunks(map.side).map(|r| r.to_vec()).collect()
    }
}

impl<'de> Deserialize<'de> for FeatureMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        Self::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// LayerActivations
// ============================================================================

/// Feature maps of one named layer, in channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub maps: Vec<FeatureMap>,
}

/// Ordered mapping from layer name to its feature maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerActivations {
    layers: Vec<Layer>,
}

impl LayerActivations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append maps to `name`, creating the layer at the end if it is new.
    pub fn push(&mut self, name: &str, maps: Vec<FeatureMap>) {
        match self.layers.iter_mut().find(|l| l.name == name) {
            Some(layer) => layer.maps.extend(maps),
            None => self.layers.push(Layer {
                name: name.to_string(),
                maps,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[FeatureMap]> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.maps.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn total_maps(&self) -> usize {
        self.layers.iter().map(|l| l.maps.len()).sum()
    }
}
