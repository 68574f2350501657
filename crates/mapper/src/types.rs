use std::collections::{BTreeMap, HashMap};

use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{MapperError, Result};

/// Key/value classification tags attached to graph points and polylines.
pub type Tags = BTreeMap<String, String>;

/// An ordered run of planar points produced by chain assembly.
///
/// A chain is closed when its first and last coordinates are equal.
pub type Chain = Vec<Coord<f64>>;

/// Build a [`Tags`] map from string pairs.
pub fn tags<K, V, I>(pairs: I) -> Tags
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Whether the chain ends where it starts.
pub fn is_closed(chain: &[Coord<f64>]) -> bool {
    chain.len() >= 2 && chain.first() == chain.last()
}

/// Hashable identity of a planar point.
///
/// Two coordinates share a key exactly when their bit patterns match, with
/// `-0.0` folded onto `0.0`. Chain stitching relies on exact coincidence,
/// which the extractor guarantees by interpolating every grid edge once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    x: u64,
    y: u64,
}

impl PointKey {
    pub fn new(coord: Coord<f64>) -> Self {
        Self {
            x: fold_zero(coord.x).to_bits(),
            y: fold_zero(coord.y).to_bits(),
        }
    }
}

impl From<Coord<f64>> for PointKey {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord)
    }
}

fn fold_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Scalar field sampled on a regular grid.
///
/// Values are stored row-major; row `r` sits at world X `xs[r]` and column
/// `c` at world Y `ys[c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSample {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
}

impl GridSample {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if xs.len().checked_mul(ys.len()) != Some(values.len()) {
            return Err(MapperError::GridShape {
                rows: xs.len(),
                cols: ys.len(),
                values: values.len(),
            });
        }
        Ok(Self { xs, ys, values })
    }

    /// Fill a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(xs: Vec<f64>, ys: Vec<f64>, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> Result<f64>,
    {
        let mut values = Vec::with_capacity(xs.len() * ys.len());
        for row in 0..xs.len() {
            for col in 0..ys.len() {
                values.push(f(row, col)?);
            }
        }
        Self::new(xs, ys, values)
    }

    pub fn rows(&self) -> usize {
        self.xs.len()
    }

    pub fn cols(&self) -> usize {
        self.ys.len()
    }

    /// Fewer than two rows or columns: no cell to contour.
    pub fn is_degenerate(&self) -> bool {
        self.rows() < 2 || self.cols() < 2
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols() + col]
    }

    pub fn position(&self, row: usize, col: usize) -> Coord<f64> {
        Coord {
            x: self.xs[row],
            y: self.ys[col],
        }
    }

    /// Smallest and largest finite values, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Contour segments as an adjacency map: start point to the end points
/// reachable from it.
///
/// Iteration follows insertion order so assembly is reproducible.
#[derive(Debug, Clone, Default)]
pub struct SegmentMap {
    order: Vec<PointKey>,
    entries: HashMap<PointKey, (Coord<f64>, Vec<Coord<f64>>)>,
    len: usize,
}

impl SegmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a segment. Returns `false` when the segment is zero-length or
    /// already present in either direction.
    pub fn insert(&mut self, start: Coord<f64>, end: Coord<f64>) -> bool {
        let start_key = PointKey::new(start);
        let end_key = PointKey::new(end);
        if start_key == end_key || self.contains(start, end) {
            return false;
        }

        if !self.entries.contains_key(&start_key) {
            self.order.push(start_key);
        }
        self.entries
            .entry(start_key)
            .or_insert_with(|| (start, Vec::new()))
            .1
            .push(end);
        self.len += 1;
        true
    }

    /// Whether the segment exists in either direction.
    pub fn contains(&self, a: Coord<f64>, b: Coord<f64>) -> bool {
        let has = |from: Coord<f64>, to: Coord<f64>| {
            let to_key = PointKey::new(to);
            self.entries
                .get(&PointKey::new(from))
                .is_some_and(|(_, ends)| ends.iter().any(|&e| PointKey::new(e) == to_key))
        };
        has(a, b) || has(b, a)
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// End points reachable from `start`.
    pub fn ends_of(&self, start: Coord<f64>) -> &[Coord<f64>] {
        self.entries
            .get(&PointKey::new(start))
            .map(|(_, ends)| ends.as_slice())
            .unwrap_or(&[])
    }

    /// All `(start, end)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        self.order.iter().flat_map(move |key| {
            let (start, ends) = &self.entries[key];
            ends.iter().map(move |&end| (*start, end))
        })
    }
}

impl FromIterator<(Coord<f64>, Coord<f64>)> for SegmentMap {
    fn from_iter<I: IntoIterator<Item = (Coord<f64>, Coord<f64>)>>(iter: I) -> Self {
        let mut map = SegmentMap::new();
        for (start, end) in iter {
            map.insert(start, end);
        }
        map
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoCoord {
    pub lon: f64,
    pub lat: f64,
}

/// Geographic rectangle the exported world is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            min_lon: 35.753054,
            min_lat: 34.360353,
            max_lon: 35.949310,
            max_lat: 34.522050,
        }
    }
}

/// Contour chains traced at one iso-level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    pub level: f64,
    pub chains: Vec<Chain>,
}

impl ContourSet {
    pub fn closed_count(&self) -> usize {
        self.chains.iter().filter(|c| is_closed(c)).count()
    }

    pub fn point_count(&self) -> usize {
        self.chains.iter().map(Vec::len).sum()
    }
}
