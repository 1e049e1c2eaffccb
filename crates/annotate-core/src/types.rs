//! Value maps exchanged between the caller, the form and the state machine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::signature::Signature;

/// Concrete values bound to a signature's input fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InputValues(BTreeMap<String, Value>);

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for InputValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Map<String, Value>> for InputValues {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

/// Raw, unvalidated strings from one form submission.
///
/// Need not cover every output field; missing fields fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DraftAnswer(BTreeMap<String, String>);

impl DraftAnswer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.0.insert(name.into(), raw.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DraftAnswer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Per-field error messages from the most recent submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.0.insert(name.into(), message.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parsed, type-correct values, one per output field.
///
/// Only produced when every output field validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ValidatedAnswer(BTreeMap<String, Value>);

impl ValidatedAnswer {
    pub(crate) fn new(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// One single-element completion list per field.
    pub fn into_completions(self) -> BTreeMap<String, Vec<Value>> {
        self.0.into_iter().map(|(k, v)| (k, vec![v])).collect()
    }
}

/// A prediction: one list of completions per output field.
///
/// Model-backed predictors may sample several completions; a human answer
/// yields exactly one. Accessors read the first completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    signature: String,
    completions: BTreeMap<String, Vec<Value>>,
}

impl Prediction {
    /// Group completions under a signature, keeping only its output fields.
    pub fn from_completions(
        completions: BTreeMap<String, Vec<Value>>,
        signature: &Signature,
    ) -> Self {
        let completions = completions
            .into_iter()
            .filter(|(name, _)| signature.output_field(name).is_some())
            .collect();

        Self {
            signature: signature.name.clone(),
            completions,
        }
    }

    /// Name of the signature this prediction answers.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// First completion of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.completions.get(field).and_then(|c| c.first())
    }

    /// First completion of a field, deserialized.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Option<Result<T, serde_json::Error>> {
        self.get(field).map(|v| serde_json::from_value(v.clone()))
    }

    /// Every completion of a field.
    pub fn completions(&self, field: &str) -> Option<&[Value]> {
        self.completions.get(field).map(Vec::as_slice)
    }

    /// Number of completions (the shortest list across fields).
    pub fn len(&self) -> usize {
        self.completions.values().map(Vec::len).min().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First completion of every field as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.completions
                .iter()
                .filter_map(|(k, c)| c.first().map(|v| (k.clone(), v.clone())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{Field, FieldType};
    use serde_json::json;

    fn signature() -> Signature {
        Signature::new("Count")
            .input(Field::new("topic", FieldType::String))
            .output(Field::new("count", FieldType::Integer))
            .output(Field::new("rating", FieldType::one_of(["A", "B"])))
    }

    #[test]
    fn test_answer_into_single_completions() {
        let answer = ValidatedAnswer::new(BTreeMap::from([
            ("count".to_string(), json!(5)),
            ("rating".to_string(), json!("B")),
        ]));

        let completions = answer.into_completions();
        assert_eq!(completions["count"], vec![json!(5)]);
        assert_eq!(completions["rating"], vec![json!("B")]);
    }

    #[test]
    fn test_prediction_accessors() {
        let completions = BTreeMap::from([
            ("count".to_string(), vec![json!(5)]),
            ("rating".to_string(), vec![json!("B")]),
            ("stray".to_string(), vec![json!(true)]),
        ]);
        let prediction = Prediction::from_completions(completions, &signature());

        assert_eq!(prediction.signature(), "Count");
        assert_eq!(prediction.len(), 1);
        assert_eq!(prediction.get("count"), Some(&json!(5)));
        assert_eq!(prediction.get_as::<i64>("count").unwrap().unwrap(), 5);
        assert!(prediction.get("stray").is_none());
        assert_eq!(prediction.to_json(), json!({ "count": 5, "rating": "B" }));
    }

    #[test]
    fn test_typed_access_mismatch() {
        let completions = BTreeMap::from([("rating".to_string(), vec![json!("B")])]);
        let prediction = Prediction::from_completions(completions, &signature());
        assert!(prediction.get_as::<i64>("rating").unwrap().is_err());
    }

    #[test]
    fn test_input_values_from_json_object() {
        let object = json!({ "topic": "cats", "extra": 1 });
        let inputs = InputValues::from(object.as_object().cloned().unwrap());
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.get("topic"), Some(&json!("cats")));
    }
}
