use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Raw output of a model provider for a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub index: usize,
    pub probabilities: Vec<f32>,
}

/// Class name to probability, kept in category order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap(Vec<(String, f64)>);

impl LabelMap {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, probability)| *probability)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, probability)| (name.as_str(), *probability))
    }
}

impl FromIterator<(String, f64)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for LabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, probability) in &self.0 {
            map.serialize_entry(name, probability)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Confidence {
    pub label: String,
    pub confidence: f64,
}

/// Rendered form of a [`LabelMap`], ranked for display.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LabelResponse {
    pub label: Option<String>,
    pub confidences: Vec<Confidence>,
    /// Unranked mapping, in category order.
    pub probabilities: LabelMap,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub id: String,
    #[serde(flatten)]
    pub result: LabelResponse,
}

#[derive(Debug, Serialize, Clone)]
pub struct InputDescription {
    pub kind: &'static str,
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Serialize, Clone)]
pub struct OutputDescription {
    pub kind: &'static str,
    pub num_top_classes: Option<usize>,
}

/// What `GET /config` reports about the running interface.
#[derive(Debug, Serialize, Clone)]
pub struct InterfaceDescription {
    pub title: String,
    pub input: InputDescription,
    pub output: OutputDescription,
    pub examples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_map_serializes_in_category_order() {
        let map: LabelMap = vec![("Dog".to_string(), 0.25), ("Cat".to_string(), 0.75)]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Dog":0.25,"Cat":0.75}"#);
    }

    #[test]
    fn label_map_lookup() {
        let map: LabelMap = vec![("Dog".to_string(), 0.5)].into_iter().collect();
        assert_eq!(map.get("Dog"), Some(0.5));
        assert_eq!(map.get("Cat"), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());
    }

    #[test]
    fn prediction_response_flattens_result() {
        let response = PredictionResponse {
            id: "abc".to_string(),
            result: LabelResponse {
                label: Some("Cat".to_string()),
                confidences: vec![Confidence {
                    label: "Cat".to_string(),
                    confidence: 1.0,
                }],
                probabilities: vec![("Dog".to_string(), 0.0), ("Cat".to_string(), 1.0)]
                    .into_iter()
                    .collect(),
            },
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["label"], "Cat");
        assert_eq!(value["confidences"][0]["confidence"], 1.0);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""probabilities":{"Dog":0.0,"Cat":1.0}"#));
    }
}
