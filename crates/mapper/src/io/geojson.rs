use std::{collections::HashMap, path::Path};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value, feature::Id};

use crate::{
    error::{MapperError, Result},
    graph::{GraphPoint, MapGraph, PointId},
    types::Tags,
};

impl MapGraph {
    /// Export to a GeoJSON feature collection in lon/lat order.
    ///
    /// Tagged points become `Point` features, polylines become `LineString`
    /// features with a `closed` property. Untagged points only appear as
    /// polyline vertices. Feature ids are `node/<id>` and `way/<id>` since
    /// points and polylines number independently.
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let by_id: HashMap<PointId, &GraphPoint> = self.points.iter().map(|p| (p.id, p)).collect();
        let mut features = Vec::with_capacity(self.polylines.len());

        for point in self.points.iter().filter(|p| p.is_tagged()) {
            let geometry = Geometry::new(Value::Point(lon_lat(point)?));
            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(Id::String(format!("node/{}", point.id))),
                properties: Some(properties(&point.tags, None)),
                foreign_members: None,
            });
        }

        for line in &self.polylines {
            let coordinates = line
                .points
                .iter()
                .map(|id| {
                    by_id
                        .get(id)
                        .ok_or(MapperError::DanglingPoint(*id))
                        .and_then(|p| lon_lat(p))
                })
                .collect::<Result<Vec<_>>>()?;

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(coordinates))),
                id: Some(Id::String(format!("way/{}", line.id))),
                properties: Some(properties(&line.tags, Some(line.is_closed()))),
                foreign_members: None,
            });
        }

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("point_count".to_string(), JsonValue::from(self.points.len()));
        foreign_members.insert("polyline_count".to_string(), JsonValue::from(self.polylines.len()));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let geojson_string = self.to_geojson_string()?;
        std::fs::write(path, geojson_string)?;
        Ok(())
    }
}

fn lon_lat(point: &GraphPoint) -> Result<Vec<f64>> {
    point
        .geo
        .map(|g| vec![g.lon, g.lat])
        .ok_or(MapperError::Unprojected(point.id))
}

fn properties(tags: &Tags, closed: Option<bool>) -> JsonObject {
    let mut props: JsonObject = tags
        .iter()
        .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
        .collect();
    if let Some(closed) = closed {
        props.insert("closed".to_string(), JsonValue::Bool(closed));
    }
    props
}
