//! JSON point file loading and record normalization

use crate::data::Point;
use crate::error::{MapperError, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Keys under which a wrapper object may hold the record list
const LIST_KEYS: &[&str] = &["pontos", "points"];

/// Keys of the node-list/edge-list document shape
const NODES_KEY: &str = "nodes";
const EDGES_KEY: &str = "edges";

const ID_KEYS: &[&str] = &["id"];
const NAME_KEYS: &[&str] = &["name", "nome"];
const LAT_KEYS: &[&str] = &["lat", "latitude", "y"];
const LON_KEYS: &[&str] = &["lon", "longitude", "lng", "x"];
const NEIGHBOR_KEYS: &[&str] = &["neighbors", "conexoes", "conecta", "connections"];

/// Read and parse a point file from disk
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    let path = path.as_ref();
    log::info!("Reading point file: {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| MapperError::FileAccess {
        path: path.to_path_buf(),
        source: e,
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        MapperError::MalformedInput(format!("{} is not valid JSON: {}", path.display(), e))
    })?;

    let points = load(&value)?;
    log::info!("Loaded {} point(s)", points.len());

    Ok(points)
}

/// Normalize a parsed JSON document into canonical points
pub fn load(source: &Value) -> Result<Vec<Point>> {
    if let Some(map) = source.as_object() {
        if let Some(nodes) = map.get(NODES_KEY) {
            if !LIST_KEYS.iter().any(|key| map.contains_key(*key)) {
                return load_node_edge_lists(nodes, map.get(EDGES_KEY));
            }
        }
    }

    let records = record_list(source)?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record))
        .collect()
}

/// Locate the record array: either the document itself or a known key
fn record_list(source: &Value) -> Result<&Vec<Value>> {
    match source {
        Value::Array(records) => Ok(records),
        Value::Object(map) => LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .ok_or_else(|| {
                MapperError::MalformedInput(format!(
                    "expected a list of points or an object with one of the keys {:?}",
                    LIST_KEYS
                ))
            })
            .and_then(|list| match list {
                Value::Array(records) => Ok(records),
                other => Err(MapperError::MalformedInput(format!(
                    "point list must be an array, found {}",
                    type_name(other)
                ))),
            }),
        other => Err(MapperError::MalformedInput(format!(
            "expected a list of points, found {}",
            type_name(other)
        ))),
    }
}

/// `{"nodes": [...], "edges": [[a, b], ...]}`: nodes are ids or point records,
/// each edge becomes a neighbor declaration on its first known endpoint
fn load_node_edge_lists(nodes: &Value, edges: Option<&Value>) -> Result<Vec<Point>> {
    let nodes = nodes.as_array().ok_or_else(|| {
        MapperError::MalformedInput(format!(
            "'{}' must be an array, found {}",
            NODES_KEY,
            type_name(nodes)
        ))
    })?;

    let mut points = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| match node {
            Value::Object(_) => parse_record(index, node),
            other => {
                let id = identifier(index, "id", other)?;
                if id.is_empty() {
                    return Err(MapperError::MalformedInput(format!(
                        "node {} has an empty id",
                        index
                    )));
                }
                Ok(Point::new(id, &[]))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let edges = match edges {
        None | Some(Value::Null) => return Ok(points),
        Some(Value::Array(edges)) => edges,
        Some(other) => {
            return Err(MapperError::MalformedInput(format!(
                "'{}' must be an array, found {}",
                EDGES_KEY,
                type_name(other)
            )))
        }
    };

    // Last record with a given id is the one the builder keeps
    let position: HashMap<String, usize> = points
        .iter()
        .enumerate()
        .map(|(index, point)| (point.id.clone(), index))
        .collect();

    for (index, edge) in edges.iter().enumerate() {
        let (a, b) = match edge.as_array().map(Vec::as_slice) {
            Some([a, b]) => (identifier(index, "edge", a)?, identifier(index, "edge", b)?),
            _ => {
                return Err(MapperError::MalformedInput(format!(
                    "edge {} must be a pair of ids, found {}",
                    index,
                    edge
                )))
            }
        };

        if let Some(&at) = position.get(&a) {
            points[at].neighbors.push(b);
        } else if let Some(&at) = position.get(&b) {
            points[at].neighbors.push(a);
        } else {
            log::warn!("Edge {} ({} -- {}) joins two unknown nodes, skipping", index, a, b);
        }
    }

    Ok(points)
}

fn parse_record(index: usize, record: &Value) -> Result<Point> {
    let map = record.as_object().ok_or_else(|| {
        MapperError::MalformedInput(format!(
            "record {} must be an object, found {}",
            index,
            type_name(record)
        ))
    })?;

    let id = match field(map, ID_KEYS) {
        Some(value) => identifier(index, "id", value)?,
        None => return Err(MapperError::MissingField { index, field: "id" }),
    };
    if id.is_empty() {
        return Err(MapperError::MalformedInput(format!(
            "record {} has an empty id",
            index
        )));
    }

    let name = match field(map, NAME_KEYS) {
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(wrong_type(index, "name", "a string", other));
        }
        None => id.clone(),
    };

    let lat = coordinate(index, "lat", field(map, LAT_KEYS))?;
    let lon = coordinate(index, "lon", field(map, LON_KEYS))?;

    let neighbors = match field(map, NEIGHBOR_KEYS) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| identifier(index, "neighbors", item))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(wrong_type(index, "neighbors", "an array", other));
        }
        None => Vec::new(),
    };

    let extra: BTreeMap<String, Value> = map
        .iter()
        .filter(|(key, _)| !is_known_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Point {
        id,
        name,
        lat,
        lon,
        neighbors,
        extra,
    })
}

/// First non-null value among the aliases of a field
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn is_known_key(key: &str) -> bool {
    [ID_KEYS, NAME_KEYS, LAT_KEYS, LON_KEYS, NEIGHBOR_KEYS]
        .iter()
        .any(|keys| keys.contains(&key))
}

/// Ids may be written as strings or integers
fn identifier(index: usize, field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(wrong_type(index, field, "a string or integer", other)),
    }
}

fn coordinate(index: usize, field: &str, value: Option<&Value>) -> Result<f64> {
    match value {
        None => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| wrong_type(index, field, "a finite number", &Value::Number(n.clone()))),
        Some(other) => Err(wrong_type(index, field, "a number", other)),
    }
}

fn wrong_type(index: usize, field: &str, expected: &str, found: &Value) -> MapperError {
    MapperError::MalformedInput(format!(
        "record {} field '{}' must be {}, found {}",
        index,
        field,
        expected,
        type_name(found)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_load_bare_list() {
        let doc = json!([
            { "id": "A", "name": "Alpha", "lat": 1.5, "lon": -2.0, "neighbors": ["B"] },
            { "id": "B", "name": "Beta" }
        ]);

        let points = load(&doc).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "Alpha");
        assert_eq!(points[0].lat, 1.5);
        assert_eq!(points[0].lon, -2.0);
        assert_eq!(points[0].neighbors, vec!["B".to_string()]);
        assert_eq!(points[1].lat, 0.0);
        assert!(points[1].neighbors.is_empty());
    }

    #[test]
    fn test_load_wrapped_portuguese_fields() {
        let doc = json!({
            "pontos": [
                { "id": "A", "nome": "Alpha", "latitude": -23.5, "longitude": -46.6, "conexoes": ["B"] },
                { "id": "B", "nome": "Beta", "conecta": ["A"] }
            ]
        });

        let points = load(&doc).unwrap();
        assert_eq!(points[0].name, "Alpha");
        assert_eq!(points[0].lat, -23.5);
        assert_eq!(points[0].lon, -46.6);
        assert_eq!(points[0].neighbors, vec!["B".to_string()]);
        assert_eq!(points[1].neighbors, vec!["A".to_string()]);
    }

    #[test]
    fn test_name_defaults_to_id() {
        let points = load(&json!([{ "id": "7" }])).unwrap();
        assert_eq!(points[0].name, "7");
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let points = load(&json!([{ "id": 1, "neighbors": [2, "3"] }])).unwrap();
        assert_eq!(points[0].id, "1");
        assert_eq!(points[0].neighbors, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_unknown_fields_go_to_extra() {
        let doc = json!([{ "id": "A", "provedor": "Starlink", "status": "ativo" }]);
        let points = load(&doc).unwrap();

        assert_eq!(points[0].extra.len(), 2);
        assert_eq!(points[0].extra["provedor"], json!("Starlink"));
    }

    #[test]
    fn test_null_fields_are_absent() {
        let points = load(&json!([{ "id": "A", "lat": null, "neighbors": null }])).unwrap();
        assert_eq!(points[0].lat, 0.0);
        assert!(points[0].neighbors.is_empty());
    }

    #[test]
    fn test_missing_id_reports_index() {
        let doc = json!([{ "id": "A" }, { "name": "nameless" }]);
        match load(&doc) {
            Err(MapperError::MissingField { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "id");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_top_level_is_malformed() {
        assert!(matches!(load(&json!("points")), Err(MapperError::MalformedInput(_))));
        assert!(matches!(load(&json!({ "vertices": [] })), Err(MapperError::MalformedInput(_))));
        assert!(matches!(load(&json!({ "nodes": {} })), Err(MapperError::MalformedInput(_))));
        assert!(matches!(load(&json!({ "pontos": {} })), Err(MapperError::MalformedInput(_))));
    }

    #[test]
    fn test_wrong_field_type_is_malformed() {
        assert!(matches!(
            load(&json!([{ "id": "A", "lat": "north" }])),
            Err(MapperError::MalformedInput(_))
        ));
        assert!(matches!(
            load(&json!([{ "id": "A", "neighbors": "B" }])),
            Err(MapperError::MalformedInput(_))
        ));
        assert!(matches!(
            load(&json!([{ "id": 1.5 }])),
            Err(MapperError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_load_node_edge_lists() {
        let doc = json!({
            "nodes": ["1", "2", 3],
            "edges": [["1", "2"], ["2", 3]]
        });

        let points = load(&doc).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].id, "3");
        assert_eq!(points[2].name, "3");
        assert_eq!(points[0].neighbors, vec!["2".to_string()]);
        assert_eq!(points[1].neighbors, vec!["3".to_string()]);
        assert!(points[2].neighbors.is_empty());
    }

    #[test]
    fn test_node_edge_lists_accept_records_and_unknown_endpoints() {
        let doc = json!({
            "nodes": [{ "id": "A", "nome": "Alpha", "lat": 1.0 }, "B"],
            "edges": [["ghost", "B"], ["x", "y"]]
        });

        let points = load(&doc).unwrap();
        assert_eq!(points[0].name, "Alpha");
        assert!(points[0].neighbors.is_empty());
        assert_eq!(points[1].neighbors, vec!["ghost".to_string()]);
    }

    #[test]
    fn test_node_edge_lists_reject_bad_edges() {
        let doc = json!({ "nodes": ["A", "B"], "edges": [["A"]] });
        assert!(matches!(load(&doc), Err(MapperError::MalformedInput(_))));

        let doc = json!({ "nodes": ["A"], "edges": [["A", 1.5]] });
        assert!(matches!(load(&doc), Err(MapperError::MalformedInput(_))));

        let doc = json!({ "nodes": ["A"], "edges": "A-B" });
        assert!(matches!(load(&doc), Err(MapperError::MalformedInput(_))));
    }

    #[test]
    fn test_empty_list() {
        assert!(load(&json!([])).unwrap().is_empty());
        assert!(load(&json!({ "pontos": [] })).unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"points": [{{"id": "A", "neighbors": ["B"]}}, {{"id": "B"}}]}}"#).unwrap();

        let points = load_from_file(file.path()).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(MapperError::FileAccess { .. })));
    }

    #[test]
    fn test_load_from_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{\"id\": ").unwrap();

        let result = load_from_file(file.path());
        assert!(matches!(result, Err(MapperError::MalformedInput(_))));
    }
}
