// Label Set - metadata used to group log lines into remote streams

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label carrying the hook id on every shipped line
pub const HOOK_ID_LABEL: &str = "hook_id";

/// Ordered label name → value mapping
///
/// Ordering is by label name so that the signature is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from configuration, rejecting names that Loki would refuse
    pub fn from_map<I, K, V>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in labels {
            let name = name.into();
            if !is_valid_label_name(&name) {
                return Err(DomainError::InvalidLabelName(name));
            }
            set.0.insert(name, value.into());
        }
        Ok(set)
    }

    /// Copy of this set with one label added or replaced
    pub fn with(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut labels = self.0.clone();
        labels.insert(name.into(), value.into());
        Self(labels)
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

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Deterministic rendering used as the batch grouping key,
    /// e.g. `{hook_id="deploy", job="hooktail"}`
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}=\"", name)?;
            for c in value.chars() {
                match c {
                    '\\' => f.write_str("\\\\")?,
                    '"' => f.write_str("\\\"")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    c => write!(f, "{}", c)?,
                }
            }
            f.write_str("\"")?;
        }
        f.write_str("}")
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_sorted_by_name() {
        let labels = LabelSet::from_map([("job", "hooktail"), ("env", "prod")])
            .unwrap()
            .with(HOOK_ID_LABEL, "deploy");

        assert_eq!(
            labels.signature(),
            r#"{env="prod", hook_id="deploy", job="hooktail"}"#
        );
    }

    #[test]
    fn test_signature_escapes_values() {
        let labels = LabelSet::new().with("msg", "say \"hi\"\n\\");
        assert_eq!(labels.signature(), r#"{msg="say \"hi\"\n\\"}"#);
    }

    #[test]
    fn test_empty_signature() {
        assert_eq!(LabelSet::new().signature(), "{}");
    }

    #[test]
    fn test_with_does_not_mutate_base() {
        let base = LabelSet::from_map([("job", "hooktail")]).unwrap();
        let a = base.with(HOOK_ID_LABEL, "a");
        let b = base.with(HOOK_ID_LABEL, "b");

        assert_eq!(base.len(), 1);
        assert_ne!(a.signature(), b.signature());
        assert_eq!(a.get(HOOK_ID_LABEL), Some("a"));
    }

    #[test]
    fn test_rejects_invalid_label_names() {
        assert!(LabelSet::from_map([("1job", "x")]).is_err());
        assert!(LabelSet::from_map([("job-name", "x")]).is_err());
        assert!(LabelSet::from_map([("", "x")]).is_err());
        assert!(LabelSet::from_map([("_job2", "x")]).is_ok());
    }
}
