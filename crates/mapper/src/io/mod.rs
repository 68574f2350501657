pub mod geojson;
pub mod raster;

pub use raster::HeightRaster;
