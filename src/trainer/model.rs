use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters returned by the external trainer, kept verbatim.
///
/// The bridge only requires the response to be a JSON object; its fields are
/// meaningful to the predictor, not to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainedModel(Map<String, Value>);

impl TrainedModel {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_fields_verbatim() {
        let text = r#"{"classes":[0.0,1.0],"mean":[0.3,0.3,0.4],"out_activation":"logistic"}"#;
        let model = TrainedModel::from_json(text).unwrap();
        assert_eq!(model.get("out_activation"), Some(&Value::from("logistic")));
        assert_eq!(serde_json::to_string(&model).unwrap(), text);
    }

    #[test]
    fn rejects_non_objects() {
        assert!(TrainedModel::from_json("[1, 2]").is_err());
        assert!(TrainedModel::from_json("nope").is_err());
    }
}
