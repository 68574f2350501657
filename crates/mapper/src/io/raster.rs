use std::{fs, path::Path};

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MapperError, Result},
    traits::TerrainSampler,
};

/// Ground and water heights on a regular raster, stored as JSON.
///
/// Sample `(col, row)` sits at `origin + (col, row) * cell_size`; values
/// are row-major. Lookups between samples interpolate bilinearly and
/// positions outside the raster clamp to the nearest edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightRaster {
    pub origin: Coord<f64>,
    pub cell_size: f64,
    pub width: usize,
    pub height: usize,
    pub ground: Vec<f64>,
    /// Water surface heights; dry everywhere when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<Vec<f64>>,
}

impl HeightRaster {
    /// Load a raster from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raster: HeightRaster = serde_json::from_str(content)?;
        raster.validate()?;
        Ok(raster)
    }

    pub fn validate(&self) -> Result<()> {
        let expected = self.width.checked_mul(self.height).unwrap_or(usize::MAX);
        let shape_error = |values: usize| MapperError::GridShape {
            rows: self.height,
            cols: self.width,
            values,
        };
        if self.width == 0 || self.height == 0 || self.ground.len() != expected {
            return Err(shape_error(self.ground.len()));
        }
        if let Some(water) = self.water.as_ref().filter(|w| w.len() != expected) {
            return Err(shape_error(water.len()));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MapperError::Config(format!(
                "raster cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }

    fn bilinear(&self, values: &[f64], pos: Coord<f64>) -> Result<f64> {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return Err(MapperError::Sampling {
                x: pos.x,
                y: pos.y,
                reason: "non-finite position".into(),
            });
        }
        if values.is_empty() || values.len() != self.width * self.height {
            return Err(MapperError::Sampling {
                x: pos.x,
                y: pos.y,
                reason: format!("raster holds {} values for {}x{}", values.len(), self.width, self.height),
            });
        }
        let gx = ((pos.x - self.origin.x) / self.cell_size).clamp(0.0, (self.width - 1) as f64);
        let gy = ((pos.y - self.origin.y) / self.cell_size).clamp(0.0, (self.height - 1) as f64);
        let (c0, r0) = (gx.floor() as usize, gy.floor() as usize);
        let (c1, r1) = ((c0 + 1).min(self.width - 1), (r0 + 1).min(self.height - 1));
        let (tx, ty) = (gx - c0 as f64, gy - r0 as f64);

        let at = |r: usize, c: usize| values[r * self.width + c];
        let top = at(r0, c0) * (1.0 - tx) + at(r0, c1) * tx;
        let bottom = at(r1, c0) * (1.0 - tx) + at(r1, c1) * tx;
        Ok(top * (1.0 - ty) + bottom * ty)
    }
}

impl TerrainSampler for HeightRaster {
    fn sample_height(&self, pos: Coord<f64>) -> Result<f64> {
        self.bilinear(&self.ground, pos)
    }

    fn sample_water_level(&self, pos: Coord<f64>) -> Result<f64> {
        match &self.water {
            Some(water) => self.bilinear(water, pos),
            None => self.sample_height(pos),
        }
    }
}
