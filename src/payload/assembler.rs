//! Builds the outbound JSON payload from request facets.

use crate::http::RequestFacets;
use crate::payload::mapping::{Facet, FieldMapping};
use crate::payload::path::write_path;
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Assemble the invocation payload.
///
/// Assembly never fails: a seed body that does not parse as a JSON object
/// is dropped, a facet with nothing to contribute is omitted, and a
/// serialization problem degrades to the empty object so the invocation
/// can still proceed. The result is always at least `{}`.
pub fn assemble(facets: &RequestFacets, mapping: &FieldMapping) -> Bytes {
    let payload = build_payload(facets, mapping);
    match serde_json::to_vec(&Value::Object(payload)) {
        Ok(bytes) => Bytes::from(bytes),
        Err(err) => {
            warn!("Payload serialization failed, sending empty object: {}", err);
            Bytes::from_static(b"{}")
        }
    }
}

fn build_payload(facets: &RequestFacets, mapping: &FieldMapping) -> Map<String, Value> {
    let mut payload = seed_object(facets);
    for facet in Facet::ALL {
        let Some(path) = mapping.path_for(facet) else {
            continue;
        };
        match facet_value(facet, facets) {
            Some(value) => write_path(&mut payload, path, value),
            None => debug!("Facet '{}' is empty, omitted from payload", facet),
        }
    }
    payload
}

/// The starting object: the staged seed body when it parses as a JSON
/// object, the empty object otherwise.
fn seed_object(facets: &RequestFacets) -> Map<String, Value> {
    let Some(seed) = facets.seed_body.as_deref() else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(seed) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!("Seed body is not a JSON object, starting from an empty payload");
            Map::new()
        }
        Err(err) => {
            debug!("Seed body does not parse, starting from an empty payload: {}", err);
            Map::new()
        }
    }
}

/// The JSON value a facet contributes, or `None` when it has nothing.
fn facet_value(facet: Facet, facets: &RequestFacets) -> Option<Value> {
    match facet {
        Facet::Method => non_empty_string(facets.method.as_deref()),
        Facet::Uri => non_empty_string(facets.uri.as_deref()),
        Facet::Body => body_value(facets),
        Facet::Headers => string_map_value(&facets.headers),
        Facet::PathParams => string_map_value(&facets.path_params),
        Facet::QueryString => query_value(facets),
    }
}

fn non_empty_string(value: Option<&str>) -> Option<Value> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| Value::String(value.to_string()))
}

fn string_map_value(map: &std::collections::HashMap<String, String>) -> Option<Value> {
    if map.is_empty() {
        return None;
    }
    let object: Map<String, Value> = map
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    Some(Value::Object(object))
}

/// The body contribution.
///
/// A body declared as `application/json` is parsed so downstream
/// consumers receive structured JSON rather than a JSON-encoded string;
/// when the declaration lies and the body does not parse, the raw text is
/// kept and the mismatch is reported. Any other content type contributes
/// the body as a string.
fn body_value(facets: &RequestFacets) -> Option<Value> {
    let body = facets.body.as_ref()?;
    if body.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(body).to_string();
    if facets.is_json_body() {
        match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => return Some(parsed),
            Err(err) => {
                warn!(
                    "Body declared application/json but does not parse, keeping it as a string: {}",
                    err
                );
            }
        }
    }
    Some(Value::String(text))
}

/// Query parameters folded into an object; a repeated name becomes a list
/// of its values in arrival order.
fn query_value(facets: &RequestFacets) -> Option<Value> {
    if facets.query.is_empty() {
        return None;
    }
    let mut params: Map<String, Value> = Map::new();
    for (name, value) in &facets.query {
        match params.get_mut(name.as_str()) {
            None => {
                params.insert(name.clone(), Value::String(value.clone()));
            }
            Some(Value::Array(values)) => {
                values.push(Value::String(value.clone()));
            }
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value.clone())]);
            }
        }
    }
    Some(Value::Object(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: &Bytes) -> Value {
        serde_json::from_slice(payload).unwrap()
    }

    #[test]
    fn test_empty_mapping_yields_empty_object() {
        let facets = RequestFacets::new().method("GET").uri("/orders");
        let payload = assemble(&facets, &FieldMapping::new());
        assert_eq!(parse(&payload), json!({}));
    }

    #[test]
    fn test_unmapped_facets_are_excluded() {
        let facets = RequestFacets::new()
            .method("GET")
            .uri("/orders")
            .header("Accept", "application/json");
        let mapping = FieldMapping::new().method("request.method");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({"request": {"method": "GET"}}));
    }

    #[test]
    fn test_json_body_round_trips_structurally() {
        let body = r#"{"order": {"id": 42, "items": ["a", "b"]}}"#;
        let facets = RequestFacets::new().body(body, "application/json");
        let mapping = FieldMapping::new().body("input");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(
            payload,
            json!({"input": {"order": {"id": 42, "items": ["a", "b"]}}})
        );
    }

    #[test]
    fn test_mapped_facets_land_on_their_short_paths() {
        let facets = RequestFacets::new()
            .method("POST")
            .uri("/x")
            .body(r#"{"k": 1}"#, "application/json");
        let mapping = FieldMapping::new().method("m").uri("u").body("b");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({"m": "POST", "u": "/x", "b": {"k": 1}}));
    }

    #[test]
    fn test_json_declared_but_malformed_body_stays_text() {
        let facets = RequestFacets::new().body("{not json", "application/json");
        let mapping = FieldMapping::new().body("input");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({"input": "{not json"}));
    }

    #[test]
    fn test_non_json_body_contributes_text() {
        let facets = RequestFacets::new().body("plain words", "text/plain");
        let mapping = FieldMapping::new().body("input");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({"input": "plain words"}));
    }

    #[test]
    fn test_empty_body_is_omitted() {
        let facets = RequestFacets::new().body("", "application/json");
        let mapping = FieldMapping::new().body("input");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn test_repeated_query_names_become_lists() {
        let facets = RequestFacets::new()
            .query_param("tag", "a")
            .query_param("page", "1")
            .query_param("tag", "b")
            .query_param("tag", "c");
        let mapping = FieldMapping::new().query_string("query");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(
            payload,
            json!({"query": {"tag": ["a", "b", "c"], "page": "1"}})
        );
    }

    #[test]
    fn test_headers_and_path_params_map_verbatim() {
        let facets = RequestFacets::new()
            .header("X-Request-Id", "abc")
            .path_param("id", "42");
        let mapping = FieldMapping::new()
            .headers("request.headers")
            .path_params("request.params");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(
            payload,
            json!({"request": {"headers": {"X-Request-Id": "abc"}, "params": {"id": "42"}}})
        );
    }

    #[test]
    fn test_seed_object_is_the_starting_point() {
        let facets = RequestFacets::new()
            .seed(r#"{"tenant": "acme", "request": {"stage": "prod"}}"#)
            .method("POST");
        let mapping = FieldMapping::new().method("request.method");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(
            payload,
            json!({"tenant": "acme", "request": {"stage": "prod", "method": "POST"}})
        );
    }

    #[test]
    fn test_seed_value_overwritten_at_exact_path() {
        // A facet mapped onto a path the seed already populates wins.
        let facets = RequestFacets::new()
            .seed(r#"{"request": {"method": "SEEDED"}}"#)
            .method("POST");
        let mapping = FieldMapping::new().method("request.method");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({"request": {"method": "POST"}}));
    }

    #[test]
    fn test_unparseable_seed_degrades_to_empty() {
        let facets = RequestFacets::new().seed("{broken").method("GET");
        let mapping = FieldMapping::new().method("m");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({"m": "GET"}));
    }

    #[test]
    fn test_non_object_seed_degrades_to_empty() {
        let facets = RequestFacets::new().seed(r#"["a", "b"]"#);
        let payload = parse(&assemble(&facets, &FieldMapping::new()));
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn test_empty_facets_with_mapped_paths_are_omitted() {
        let facets = RequestFacets::new();
        let mapping = FieldMapping::new()
            .method("request.method")
            .headers("request.headers")
            .body("request.body")
            .query_string("request.query")
            .path_params("request.params");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn test_facets_share_intermediate_objects() {
        let facets = RequestFacets::new()
            .method("GET")
            .uri("/orders/42")
            .header("Accept", "*/*");
        let mapping = FieldMapping::new()
            .method("request.method")
            .uri("request.path")
            .headers("request.headers");

        let payload = parse(&assemble(&facets, &mapping));
        assert_eq!(
            payload,
            json!({
                "request": {
                    "method": "GET",
                    "path": "/orders/42",
                    "headers": {"Accept": "*/*"}
                }
            })
        );
    }
}
