//! Lenient ingestion of host-provided shapes.
//!
//! Hosts pass shapes as loosely-typed objects. Anything whose `type` is not
//! one of the five kinds, or whose fields do not fit that kind, is skipped.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::shape::{Geometry, ShapeId, ShapeKind};

/// A shape as handed in by the host, before the scene assigns its id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeInput {
    /// Requested id. Honoured when it does not collide with a live shape.
    /// An id that is not a non-negative integer is treated as absent.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<ShapeId>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl ShapeInput {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            categories: Vec::new(),
            color: None,
            geometry,
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Parse a single structural object. Returns `None` for unknown or
    /// malformed input.
    pub fn from_value(value: &Value) -> Option<Self> {
        match ShapeInput::deserialize(value) {
            Ok(input) => Some(input),
            Err(e) => {
                log::debug!(
                    "Skipping shape input of type {:?}: {}",
                    value.get("type").and_then(Value::as_str),
                    e
                );
                None
            }
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<ShapeId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let id = value.as_ref().and_then(|v| {
        v.as_u64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
    });
    if id.is_none() && value.as_ref().is_some_and(|v| !v.is_null()) {
        log::debug!("Ignoring unusable shape id {:?}", value);
    }
    Ok(id)
}

/// Parse every recognizable shape, silently dropping the rest.
pub fn parse_shapes(values: &[Value]) -> Vec<ShapeInput> {
    let inputs: Vec<_> = values.iter().filter_map(ShapeInput::from_value).collect();
    if inputs.len() < values.len() {
        log::debug!(
            "Ingested {} of {} shapes ({} unrecognized)",
            inputs.len(),
            values.len(),
            values.len() - inputs.len()
        );
    }
    inputs
}

/// Group inputs by kind, in plot order. Kinds with no inputs are omitted.
pub fn batch_by_kind(inputs: Vec<ShapeInput>) -> Vec<(ShapeKind, Vec<ShapeInput>)> {
    let mut batches: Vec<(ShapeKind, Vec<ShapeInput>)> = ShapeKind::all()
        .iter()
        .map(|kind| (*kind, Vec::new()))
        .collect();
    for input in inputs {
        if let Some((_, batch)) = batches.iter_mut().find(|(kind, _)| *kind == input.kind()) {
            batch.push(input);
        }
    }
    batches.retain(|(_, batch)| !batch.is_empty());
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use serde_json::json;

    #[test]
    fn test_parses_every_kind() {
        let values = vec![
            json!({"type": "rectangle", "points": [[0, 0], [10, 0], [10, 10], [0, 10]], "id": 4}),
            json!({"type": "polygon", "points": [[0, 0], [5, 5], [0, 5]], "categories": ["a"]}),
            json!({"type": "circle", "centre": [3, 4], "radius": 2}),
            json!({"type": "ellipse", "centre": [3, 4], "radiusX": 2, "radiusY": 1}),
            json!({"type": "dot", "position": [1.5, 2.5], "color": "#f00"}),
        ];
        let inputs = parse_shapes(&values);
        assert_eq!(inputs.len(), 5);
        assert_eq!(inputs[0].id, Some(4));
        assert_eq!(inputs[1].categories, vec!["a".to_string()]);
        assert_eq!(
            inputs[3].geometry,
            Geometry::Ellipse {
                centre: Point::new(3.0, 4.0),
                radius_x: 2.0,
                radius_y: 1.0,
                phi: 0.0,
            }
        );
        assert_eq!(inputs[4].color.as_deref(), Some("#f00"));
    }

    #[test]
    fn test_timestamp_ids_are_kept() {
        let values = vec![json!({
            "type": "rectangle",
            "id": 1_700_000_000_000u64,
            "points": [[0, 0], [10, 0], [10, 10], [0, 10]]
        })];
        let inputs = parse_shapes(&values);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].id, Some(1_700_000_000_000));
    }

    #[test]
    fn test_unusable_ids_fall_back_to_fresh_ids() {
        let values = vec![
            json!({"type": "dot", "id": -4, "position": [1, 1]}),
            json!({"type": "dot", "id": 2.5, "position": [1, 1]}),
            json!({"type": "dot", "id": "seven", "position": [1, 1]}),
            json!({"type": "dot", "id": null, "position": [1, 1]}),
            json!({"type": "dot", "id": 8.0, "position": [1, 1]}),
        ];
        let inputs = parse_shapes(&values);
        let ids: Vec<_> = inputs.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![None, None, None, None, Some(8)]);
    }

    #[test]
    fn test_unknown_and_malformed_are_dropped() {
        let values = vec![
            json!({"type": "hexagon", "points": []}),
            json!({"type": "circle", "centre": [1, 1]}),
            json!("not an object"),
            json!({"points": [[0, 0]]}),
            json!({"type": "dot", "position": [1, 1]}),
        ];
        let inputs = parse_shapes(&values);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].kind(), ShapeKind::Dot);
    }

    #[test]
    fn test_batches_follow_plot_order() {
        let inputs = vec![
            ShapeInput::new(Geometry::Dot {
                position: Point::new(0.0, 0.0),
            }),
            ShapeInput::new(Geometry::Circle {
                centre: Point::new(0.0, 0.0),
                radius: 3.0,
            }),
            ShapeInput::new(Geometry::Dot {
                position: Point::new(1.0, 1.0),
            }),
        ];
        let batches = batch_by_kind(inputs);
        let kinds: Vec<_> = batches.iter().map(|(k, b)| (*k, b.len())).collect();
        assert_eq!(kinds, vec![(ShapeKind::Circle, 1), (ShapeKind::Dot, 2)]);
    }
}
