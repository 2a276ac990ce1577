//! Reads boundary records from `GeoJSON`.

use std::path::Path;

use crime_dash_neighborhood_models::BoundaryRecord;
use geojson::GeoJson;

use crate::NeighborhoodError;

/// Loads boundaries from `path`.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the file cannot be read or is not a
/// `GeoJSON` `FeatureCollection` or `Feature`.
pub fn load(path: &Path) -> Result<Option<Vec<BoundaryRecord>>, NeighborhoodError> {
    if !path.is_file() {
        log::info!("No boundaries file at {}", path.display());
        return Ok(None);
    }

    let text = std::fs::read_to_string(path)?;
    let records = parse(&text)?;
    log::info!(
        "Loaded {} boundaries from {}",
        records.len(),
        path.display()
    );

    Ok(Some(records))
}

/// Parses `GeoJSON` text into boundary records, in file order.
///
/// A lone `Feature` yields a single record. Features without properties get
/// an empty attribute set.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the text is not valid `GeoJSON` or is a
/// bare geometry.
pub fn parse(text: &str) -> Result<Vec<BoundaryRecord>, NeighborhoodError> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(NeighborhoodError::Conversion {
                message: "Expected a FeatureCollection, found a bare geometry".to_string(),
            });
        }
    };

    Ok(features
        .into_iter()
        .map(|feature| BoundaryRecord {
            properties: feature.properties.unwrap_or_default(),
            geometry: feature.geometry,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FEATURES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"codigo": 1, "NOME": "Centro"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn parses_feature_collection() {
        let records = parse(TWO_FEATURES).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].properties["NOME"], "Centro");
        assert!(records[0].geometry.is_some());
        assert!(records[1].properties.is_empty());
        assert!(records[1].geometry.is_none());
    }

    #[test]
    fn parses_single_feature() {
        let records = parse(
            r#"{"type":"Feature","properties":{"bairro":"Batel"},"geometry":null}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn rejects_garbage_and_bare_geometry() {
        assert!(parse("not json").is_err());
        assert!(parse(r#"{"type":"Point","coordinates":[0,0]}"#).is_err());
    }

    #[test]
    fn missing_file_disables_boundaries() {
        let path = std::env::temp_dir().join("crime_dash_no_such_boundaries.geojson");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn loads_existing_file() {
        let path = std::env::temp_dir().join(format!(
            "crime_dash_boundaries_{}.geojson",
            std::process::id()
        ));
        std::fs::write(&path, TWO_FEATURES).unwrap();
        let loaded = load(&path).unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }
}
