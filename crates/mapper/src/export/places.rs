use geo_types::Coord;
use tracing::warn;

use crate::{
    error::Result,
    export::entities::{CitySummary, District, TransitStop},
    graph::{GraphBuilder, PointId},
    types::tags,
};

/// One `place=suburb` landmark per district label.
pub fn export_districts(builder: &mut GraphBuilder, districts: &[District]) -> Result<usize> {
    for district in districts {
        builder.add_landmark(
            district.position,
            tags([("name", district.name.as_str()), ("place", "suburb")]),
        )?;
    }
    Ok(districts.len())
}

/// City landmark at `centre`, usually the mean building centre.
///
/// Without a centre there is nowhere sensible to put the city, so it is
/// skipped with a warning.
pub fn export_city(
    builder: &mut GraphBuilder,
    city: &CitySummary,
    centre: Option<Coord<f64>>,
) -> Result<Option<PointId>> {
    let Some(centre) = centre else {
        warn!(city = %city.name, "no buildings exported, skipping city centre");
        return Ok(None);
    };
    let population = city.population.to_string();
    let id = builder.add_landmark(
        centre,
        tags([
            ("name", city.name.as_str()),
            ("place", "city"),
            ("population", population.as_str()),
        ]),
    )?;
    Ok(Some(id))
}

/// One landmark per transit stop carrying the stop's own tags.
///
/// Stops without tags would be dropped by the filter anyway and are not
/// added.
pub fn export_transit_stops(builder: &mut GraphBuilder, stops: &[TransitStop]) -> Result<usize> {
    let mut written = 0;
    for stop in stops.iter().filter(|s| !s.tags.is_empty()) {
        builder.add_landmark(stop.position, stop.tags.clone())?;
        written += 1;
    }
    Ok(written)
}
