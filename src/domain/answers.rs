//! Answer map: field id -> current answer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value held for one field
///
/// Text-like inputs, selects and radios hold `Text`, a checkbox without
/// options holds `Flag`, a checkbox with options holds the ordered, duplicate
/// free list of selected values in `Choices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
    Choices(Vec<String>),
}

impl AnswerValue {
    /// Empty text, `false` and an empty choice list count as "no answer"
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Flag(b) => !b,
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Choices(c) => c.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AnswerValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Choices(c) => Some(c),
            _ => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Flag(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Choices(value)
    }
}

impl AnswerValue {
    /// Value sent as a query parameter; choice lists are comma separated
    pub fn query_value(&self) -> String {
        match self {
            AnswerValue::Choices(c) => c.join(","),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Flag(b) => write!(f, "{}", b),
            AnswerValue::Text(s) => f.write_str(s),
            AnswerValue::Choices(c) => f.write_str(&c.join(", ")),
        }
    }
}

/// Answers of one form, serialized as a plain JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, AnswerValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.0.get(id)
    }

    /// Text answer for `id`, if the stored value is text
    pub fn text(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(AnswerValue::as_text)
    }

    /// True when `id` has a non-empty answer
    pub fn is_answered(&self, id: &str) -> bool {
        self.0.get(id).is_some_and(|v| !v.is_empty())
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(id.into(), value.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<AnswerValue> {
        self.0.remove(id)
    }

    /// Adds or removes `value` in the multi-select answer for `id`.
    ///
    /// Selection order is kept, a value is never stored twice and removing
    /// the last value leaves an empty list rather than no entry.
    pub fn toggle_choice(&mut self, id: &str, value: &str, checked: bool) {
        let mut choices = self
            .0
            .get(id)
            .and_then(AnswerValue::as_choices)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        if checked {
            if !choices.iter().any(|c| c == value) {
                choices.push(value.to_string());
            }
        } else {
            choices.retain(|c| c != value);
        }

        self.0.insert(id.to_string(), AnswerValue::Choices(choices));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (String, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_choice_round_trip() {
        let mut answers = AnswerMap::new();
        answers.toggle_choice("extras", "a", true);
        assert_eq!(answers.get("extras"), Some(&AnswerValue::Choices(vec!["a".to_string()])));

        answers.toggle_choice("extras", "a", false);
        assert_eq!(answers.get("extras"), Some(&AnswerValue::Choices(vec![])));
    }

    #[test]
    fn test_toggle_choice_keeps_order_without_duplicates() {
        let mut answers = AnswerMap::new();
        answers.toggle_choice("extras", "b", true);
        answers.toggle_choice("extras", "a", true);
        answers.toggle_choice("extras", "b", true);
        assert_eq!(
            answers.get("extras").and_then(AnswerValue::as_choices),
            Some(&["b".to_string(), "a".to_string()][..])
        );
    }

    #[test]
    fn test_json_shape() {
        let mut answers = AnswerMap::new();
        answers.set("name", "Ada");
        answers.set("smoker", false);
        answers.set("extras", vec!["glass".to_string()]);

        let value = serde_json::to_value(&answers).unwrap();
        assert_eq!(value, json!({ "extras": ["glass"], "name": "Ada", "smoker": false }));

        let back: AnswerMap = serde_json::from_value(value).unwrap();
        assert_eq!(back, answers);
    }

    #[test]
    fn test_emptiness() {
        let mut answers = AnswerMap::new();
        answers.set("a", "");
        answers.set("b", false);
        answers.set("c", Vec::<String>::new());
        answers.set("d", "x");
        assert!(!answers.is_answered("a"));
        assert!(!answers.is_answered("b"));
        assert!(!answers.is_answered("c"));
        assert!(answers.is_answered("d"));
        assert!(!answers.is_answered("missing"));
    }
}
