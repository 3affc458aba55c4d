use std::{fs::{self, File}, io::BufWriter, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{cells::Cell, config::FieldNames, pipeline::Classification};

/// Read cells from a GeoJSON FeatureCollection file.
pub fn read_cells(path: &Path, fields: &FieldNames) -> Result<Vec<Cell>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    let cells = parse_cells(&text, fields)
        .with_context(|| format!("[io::geojson] Invalid cell file: {}", path.display()))?;
    info!("[io::geojson] read {} cells from {}", cells.len(), path.display());
    Ok(cells)
}

/// Parse cells from GeoJSON text.
///
/// `fields` names the id, population and area properties; every other scalar
/// property becomes an attribute. A null or missing population is kept as NaN
/// (a no-data cell). Geometry that is not a readable Polygon or MultiPolygon
/// becomes an empty MultiPolygon, which the pipeline reports as invalid.
pub fn parse_cells(geojson: &str, fields: &FieldNames) -> Result<Vec<Cell>> {
    let value: Value = serde_json::from_str(geojson).context("[io::geojson] Failed to parse GeoJSON")?;
    if value["type"].as_str() != Some("FeatureCollection") {
        bail!("[io::geojson] Expected a FeatureCollection");
    }
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] FeatureCollection has no features array"))?;

    features.iter().enumerate()
        .map(|(i, feature)| parse_feature(feature, fields).with_context(|| format!("[io::geojson] feature {i}")))
        .collect()
}

fn parse_feature(feature: &Value, fields: &FieldNames) -> Result<Cell> {
    let empty = Map::new();
    let properties = feature["properties"].as_object().unwrap_or(&empty);

    let id = properties.get(&fields.id)
        .or_else(|| feature.get("id"))
        .and_then(scalar_string)
        .ok_or_else(|| anyhow!("missing id property {:?}", fields.id))?;
    let pop = number(properties.get(&fields.population))
        .with_context(|| format!("cell {id}: bad {:?}", fields.population))?
        .unwrap_or(f64::NAN);
    let area = number(properties.get(&fields.area))
        .with_context(|| format!("cell {id}: bad {:?}", fields.area))?
        .ok_or_else(|| anyhow!("cell {id}: missing area property {:?}", fields.area))?;

    let geometry = parse_geometry(&feature["geometry"]).unwrap_or_else(|| {
        debug!("[io::geojson] cell {id}: unreadable geometry");
        MultiPolygon::new(vec![])
    });

    let mut cell = Cell::new(id, pop, area, geometry);
    for (key, value) in properties {
        if [&fields.id, &fields.population, &fields.area].contains(&key) { continue }
        if let Some(value) = scalar_string(value) { cell.attributes.insert(key.clone(), value); }
    }
    Ok(cell)
}

/// Strings, numbers and booleans as text; null and nested values are skipped.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A numeric property; `None` if null or absent. Numeric strings are accepted.
fn number(value: Option<&Value>) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| anyhow!("{n} is not a float")),
        Some(Value::String(s)) => s.trim().parse().map(Some).with_context(|| format!("{s:?} is not a number")),
        Some(other) => bail!("expected a number, got {other}"),
    }
}

fn parse_geometry(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()?;
    match geometry["type"].as_str()? {
        "Polygon" => Some(MultiPolygon::new(vec![parse_polygon(coords)?])),
        "MultiPolygon" => coords.iter()
            .map(|polygon| parse_polygon(polygon.as_array()?))
            .collect::<Option<Vec<_>>>()
            .map(MultiPolygon::new),
        _ => None,
    }
}

/// Exterior ring followed by interior rings.
fn parse_polygon(rings: &[Value]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    let interiors = interiors.iter().map(parse_ring).collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(parse_ring(exterior)?, interiors))
}

fn parse_ring(ring: &Value) -> Option<LineString<f64>> {
    let mut points = ring.as_array()?.iter()
        .map(|position| {
            let position = position.as_array()?;
            Some(Coord { x: position.first()?.as_f64()?, y: position.get(1)?.as_f64()? })
        })
        .collect::<Option<Vec<_>>>()?;

    // Ensure ring is closed (first point == last point)
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Some(LineString(points))
}

fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| ls.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>();
    let polygons = mp.0.iter()
        .map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()).map(ring).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

/// Export the classification as a labeled FeatureCollection. Geometry is
/// passed through unmodified; attributes follow the computed properties.
pub fn classification_to_geojson(classification: &Classification) -> Value {
    let features = classification.records().iter().map(|record| {
        let mut properties = Map::new();
        for (key, value) in &record.attributes {
            properties.insert(key.clone(), json!(value));
        }
        properties.insert("id".into(), json!(record.id.as_str()));
        properties.insert("pop".into(), json!(record.pop));
        properties.insert("area_km2".into(), json!(record.area_km2));
        properties.insert("pop_local".into(), json!(record.pop_local()));
        properties.insert("area_local".into(), json!(record.area_local()));
        properties.insert("density".into(), json!(record.density()));
        properties.insert("base_category".into(), json!(record.base_category.as_str()));
        properties.insert("category".into(), json!(record.category.as_str()));
        properties.insert("category_label".into(), json!(record.category.label()));
        properties.insert("override_rule".into(), json!(record.override_rule));
        properties.insert("neighbors".into(), json!(record.neighbors));

        json!({
            "type": "Feature",
            "id": record.id.as_str(),
            "geometry": multipolygon_to_geojson(&record.geometry),
            "properties": properties,
        })
    }).collect::<Vec<_>>();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write the labeled FeatureCollection to a file.
pub fn write_classification_geojson(classification: &Classification, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::geojson] Failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &classification_to_geojson(classification))
        .with_context(|| format!("[io::geojson] Failed to write GeoJSON to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cells::CellId, pipeline::Pipeline};

    const CELLS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] },
              "properties": { "id": "a", "pop": 120, "area_km2": 1.0, "region": "0301", "code": 7, "meta": { "x": 1 } } },
            { "type": "Feature",
              "geometry": { "type": "MultiPolygon", "coordinates": [[[[1,0],[2,0],[2,1],[1,1]]]] },
              "properties": { "id": 2, "pop": null, "area_km2": "1.5", "note": null } },
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [0, 0] },
              "properties": { "id": "c", "area_km2": 1 } }
        ]
    }"#;

    #[test]
    fn parses_fields_and_attributes() {
        let cells = parse_cells(CELLS, &FieldNames::default()).unwrap();

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].id, CellId::new("a"));
        assert_eq!(cells[0].pop, 120.0);
        assert_eq!(cells[0].attribute("region"), Some("0301"));
        assert_eq!(cells[0].attribute("code"), Some("7"));
        assert_eq!(cells[0].attribute("meta"), None);
        assert_eq!(cells[0].geometry.0.len(), 1);

        assert_eq!(cells[1].id, CellId::new("2"));
        assert!(cells[1].pop.is_nan());
        assert_eq!(cells[1].area_km2, 1.5);
        assert_eq!(cells[1].attributes.len(), 0);
        assert_eq!(cells[1].geometry.0[0].exterior().0.len(), 5); // ring closed on read

        assert!(cells[2].pop.is_nan());
        assert!(cells[2].geometry.0.is_empty());
    }

    #[test]
    fn custom_field_names() {
        let json = r#"{ "type": "FeatureCollection", "features": [
            { "type": "Feature", "geometry": null,
              "properties": { "cell": "x", "inhabitants": 5, "km2": 2 } } ] }"#;
        let fields = FieldNames { id: "cell".into(), population: "inhabitants".into(), area: "km2".into() };
        let cells = parse_cells(json, &fields).unwrap();

        assert_eq!((cells[0].id.as_str(), cells[0].pop, cells[0].area_km2), ("x", 5.0, 2.0));
        assert!(cells[0].attributes.is_empty());
    }

    #[test]
    fn rejects_missing_area_and_bad_documents() {
        let json = r#"{ "type": "FeatureCollection", "features": [
            { "type": "Feature", "geometry": null, "properties": { "id": "x", "pop": 5 } } ] }"#;
        assert!(parse_cells(json, &FieldNames::default()).is_err());
        assert!(parse_cells(r#"{ "type": "Feature" }"#, &FieldNames::default()).is_err());
        assert!(parse_cells("not json", &FieldNames::default()).is_err());
    }

    #[test]
    fn export_carries_labels_and_geometry() {
        let cells = parse_cells(CELLS, &FieldNames::default()).unwrap();
        let classification = Pipeline::default().run(cells).unwrap();
        let value = classification_to_geojson(&classification);
        let features = value["features"].as_array().unwrap();

        assert_eq!(features.len(), 1);
        let properties = &features[0]["properties"];
        assert_eq!(properties["category"], "small_urban");
        assert_eq!(properties["category_label"], "Small urban community");
        assert_eq!(properties["region"], "0301");
        assert_eq!(properties["override_rule"], Value::Null);

        let reparsed = parse_cells(&value.to_string(), &FieldNames::default()).unwrap();
        assert_eq!(reparsed[0].geometry, classification.records()[0].geometry);
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        let cells = parse_cells(CELLS, &FieldNames::default()).unwrap();
        write_classification_geojson(&Pipeline::default().run(cells).unwrap(), &path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["type"], "FeatureCollection");
    }
}
