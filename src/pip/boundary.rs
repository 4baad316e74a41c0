//! Subzone boundary loading from GeoJSON.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::MultiPolygon;
use geojson::{GeoJson, JsonObject};
use tracing::{debug, info, warn};

use crate::models::SubzonePolygon;

const ID_KEYS: &[&str] = &["id", "subzone_id", "SUBZONE_C"];
const NAME_KEYS: &[&str] = &["name", "subzone_name", "SUBZONE_N"];
const PLANNING_AREA_KEYS: &[&str] = &["planning_area_id", "PLN_AREA_C", "PLN_AREA_N"];
const REGION_KEYS: &[&str] = &["region", "REGION_N", "REGION_C"];

/// Load subzone polygons from a GeoJSON FeatureCollection file.
pub fn load_subzones<P: AsRef<Path>>(path: P) -> Result<Vec<SubzonePolygon>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subzone file {}", path.display()))?;
    let subzones = parse_subzones(&content)?;
    info!("Loaded {} subzones from {}", subzones.len(), path.display());
    Ok(subzones)
}

/// Parse subzone polygons from GeoJSON text.
///
/// Features without a name or with non-areal geometry are skipped.
pub fn parse_subzones(content: &str) -> Result<Vec<SubzonePolygon>> {
    let geojson: GeoJson = content.parse().context("Failed to parse subzone GeoJSON")?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => bail!("Subzone GeoJSON must be a FeatureCollection"),
    };

    let mut subzones = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let props = feature.properties.unwrap_or_default();

        let Some(name) = property(&props, NAME_KEYS) else {
            debug!("Skipping unnamed subzone feature");
            continue;
        };
        let id = property(&props, ID_KEYS).unwrap_or_else(|| slugify(&name));

        let Some(geometry) = feature.geometry.and_then(to_multipolygon) else {
            warn!("Skipping subzone {} with unsupported geometry", id);
            continue;
        };

        let planning_area_id = property(&props, PLANNING_AREA_KEYS).unwrap_or_default();
        let region = property(&props, REGION_KEYS).unwrap_or_default();

        match SubzonePolygon::new(id.clone(), name, planning_area_id, region, geometry) {
            Some(subzone) => subzones.push(subzone),
            None => warn!("Skipping subzone {} with empty geometry", id),
        }
    }

    Ok(subzones)
}

fn property(props: &JsonObject, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        props
            .get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    })
}

fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}

/// "ANG MO KIO TOWN CENTRE" -> "ang-mo-kio-town-centre"
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "SUBZONE_N": "ANG MO KIO TOWN CENTRE", "PLN_AREA_C": "AM", "REGION_N": "NORTH-EAST REGION" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[103.84, 1.36], [103.86, 1.36], [103.86, 1.38], [103.84, 1.38], [103.84, 1.36]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "id": "marker" },
                "geometry": { "type": "Point", "coordinates": [103.85, 1.37] }
            },
            {
                "type": "Feature",
                "properties": { "name": "POINT ONLY" },
                "geometry": { "type": "Point", "coordinates": [103.85, 1.37] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_subzones_skips_unsupported() {
        let subzones = parse_subzones(FIXTURE).unwrap();
        assert_eq!(subzones.len(), 1);

        let amk = &subzones[0].summary;
        assert_eq!(amk.id, "ang-mo-kio-town-centre");
        assert_eq!(amk.name, "ANG MO KIO TOWN CENTRE");
        assert_eq!(amk.planning_area_id, "AM");
        assert_eq!(amk.region, "NORTH-EAST REGION");
        assert_eq!(amk.bbox.min_lng, 103.84);
        assert_eq!(amk.bbox.max_lat, 1.38);
    }

    #[test]
    fn test_rejects_non_collection() {
        let point = r#"{ "type": "Point", "coordinates": [103.85, 1.37] }"#;
        assert!(parse_subzones(point).is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("ANG MO KIO TOWN CENTRE"), "ang-mo-kio-town-centre");
        assert_eq!(slugify("  Bishan East / Thomson "), "bishan-east-thomson");
    }
}
