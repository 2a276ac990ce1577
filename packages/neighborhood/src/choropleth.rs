//! Renders joined boundaries as a choropleth `FeatureCollection`.

use crime_dash_neighborhood_models::{BoundingBox, EnrichedBoundary};
use geo::BoundingRect as _;
use geojson::{Feature, FeatureCollection};

use crate::NeighborhoodError;

/// Builds a `FeatureCollection` with one feature per joined boundary.
///
/// Each feature keeps its original properties and gains `Bairro_norm`,
/// `total_crimes`, `risco`, and `fill_color`. A boundary without geometry
/// is kept as a feature with a null geometry so its properties still reach
/// the client; it draws nothing and does not count toward the `bbox`.
///
/// # Errors
///
/// Returns [`NeighborhoodError::GeoJson`] if a geometry cannot be converted.
pub fn feature_collection(
    enriched: &[EnrichedBoundary],
) -> Result<FeatureCollection, NeighborhoodError> {
    let mut features = Vec::with_capacity(enriched.len());

    for item in enriched {
        let mut properties = item.boundary.properties.clone();
        properties.insert(
            "Bairro_norm".to_string(),
            serde_json::Value::from(item.bairro_norm.as_str()),
        );
        properties.insert(
            "total_crimes".to_string(),
            serde_json::Value::from(item.total_crimes),
        );
        properties.insert(
            "risco".to_string(),
            serde_json::Value::from(item.risco.to_string()),
        );
        properties.insert(
            "fill_color".to_string(),
            serde_json::Value::from(item.risco.color()),
        );

        features.push(Feature {
            bbox: None,
            geometry: item.boundary.geometry.clone(),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    Ok(FeatureCollection {
        bbox: bounding_box(enriched)?.map(BoundingBox::to_vec),
        features,
        foreign_members: None,
    })
}

/// Extent of every boundary geometry, or `None` when there are none.
///
/// # Errors
///
/// Returns [`NeighborhoodError::GeoJson`] if a geometry cannot be converted.
pub fn bounding_box(
    enriched: &[EnrichedBoundary],
) -> Result<Option<BoundingBox>, NeighborhoodError> {
    let mut extent: Option<BoundingBox> = None;

    for geometry in enriched.iter().filter_map(|e| e.boundary.geometry.clone()) {
        let shape: geo::Geometry<f64> = geometry.try_into()?;
        let Some(rect) = shape.bounding_rect() else {
            continue;
        };

        let (min, max) = (rect.min(), rect.max());
        extent = Some(match extent {
            None => BoundingBox {
                min_lon: min.x,
                min_lat: min.y,
                max_lon: max.x,
                max_lat: max.y,
            },
            Some(b) => BoundingBox {
                min_lon: b.min_lon.min(min.x),
                min_lat: b.min_lat.min(min.y),
                max_lon: b.max_lon.max(max.x),
                max_lat: b.max_lat.max(max.y),
            },
        });
    }

    Ok(extent)
}
