//! Anonymization labels for peer ranking.
//!
//! Stage 1 answers are shown to rankers as `Response A`, `Response B`, …
//! The [`LabelMap`] holding label → model is built once per run and stays
//! with the pipeline; it is never rendered into a ranking prompt.

use crate::core::model::Model;
use crate::council::value_objects::StageOneResult;
use regex::{Captures, Regex};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

const LABEL_PREFIX: &str = "Response ";

static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Response [A-Z]").expect("valid label regex"));

/// Positional label masking a model's identity (e.g. `Response C`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnonymizationLabel(char);

impl AnonymizationLabel {
    /// Number of distinct labels (`A` through `Z`)
    pub const CAPACITY: usize = 26;

    /// Label for the zero-based position `index`, if one exists
    pub fn for_index(index: usize) -> Option<Self> {
        if index < Self::CAPACITY {
            Some(Self((b'A' + index as u8) as char))
        } else {
            None
        }
    }

    /// Parse the exact form `Response X` with an uppercase ASCII letter
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix(LABEL_PREFIX)?;
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if letter.is_ascii_uppercase() => Some(Self(letter)),
            _ => None,
        }
    }

    /// The label letter
    pub fn letter(&self) -> char {
        self.0
    }
}

impl fmt::Display for AnonymizationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", LABEL_PREFIX, self.0)
    }
}

impl Serialize for AnonymizationLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnonymizationLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AnonymizationLabel::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid label: {s}")))
    }
}

/// Label → model mapping for one ranking round
///
/// Entries are kept in label order. Serializes as a JSON object
/// `{"Response A": "model", ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: Vec<(AnonymizationLabel, Model)>,
}

impl LabelMap {
    /// Assign labels to Stage 1 results by position
    ///
    /// The first result becomes `Response A`. Results beyond
    /// [`AnonymizationLabel::CAPACITY`] receive no label.
    pub fn assign(results: &[StageOneResult]) -> Self {
        let entries = results
            .iter()
            .enumerate()
            .map_while(|(i, r)| AnonymizationLabel::for_index(i).map(|l| (l, r.model.clone())))
            .collect();
        Self { entries }
    }

    /// Model behind a label, if the label was assigned this round
    pub fn model_for(&self, label: &AnonymizationLabel) -> Option<&Model> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, m)| m)
    }

    /// Label assigned to a model, if any
    pub fn label_for(&self, model: &Model) -> Option<AnonymizationLabel> {
        self.entries
            .iter()
            .find(|(_, m)| m == model)
            .map(|(l, _)| *l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnonymizationLabel, &Model)> {
        self.entries.iter().map(|(l, m)| (l, m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every assigned label in `text` with the bold short model name
    ///
    /// Labels that were not assigned this round are left as written.
    pub fn deanonymize(&self, text: &str) -> String {
        LABEL_PATTERN
            .replace_all(text, |caps: &Captures<'_>| {
                let matched = &caps[0];
                match AnonymizationLabel::parse(matched).and_then(|l| self.model_for(&l)) {
                    Some(model) => format!("**{}**", model.short_name()),
                    None => matched.to_string(),
                }
            })
            .into_owned()
    }
}

impl Serialize for LabelMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, model) in &self.entries {
            map.serialize_entry(&label.to_string(), model)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LabelMapVisitor;

        impl<'de> Visitor<'de> for LabelMapVisitor {
            type Value = LabelMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of anonymization labels to model identifiers")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(AnonymizationLabel, Model)> = Vec::new();
                while let Some((label, model)) = access.next_entry()? {
                    entries.push((label, model));
                }
                entries.sort_by_key(|(l, _)| *l);
                Ok(LabelMap { entries })
            }
        }

        deserializer.deserialize_map(LabelMapVisitor)
    }
}
