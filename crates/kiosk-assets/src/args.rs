//! Argument-set descriptors and their resolution into selectable options.
//!
//! A program's catalog entry declares its selectable arguments in one of two
//! shapes, decided once at parse time by inspecting the first entry:
//!
//! - *Labeled*: `[["Alice", "alice", true], ["Bob", "bob"]]` — explicit
//!   display label, value, and an optional default flag.
//! - *Unlabeled*: `[1, 2, [3], 4]` — bare scalar values, with the default
//!   wrapped in a single-element list.
//!
//! Shapes are never mixed within one descriptor; a descriptor that does so
//! fails parsing rather than being reinterpreted per entry.

use serde_json::Value;

use crate::error::AssetError;

/// Label shown when a program takes no arguments. Its value is an empty
/// argument list.
pub const NO_ARGUMENTS_LABEL: &str = "(no arguments)";

/// One selectable argument option, as presented to the user.
///
/// `value` is the canonical textual form handed back at run time: sequences
/// are serialized as JSON, scalars stringified plainly (`3` → `"3"`,
/// `"alice"` → `"alice"`). The resolver never interprets value semantics
/// beyond this round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgOption {
    pub label: String,
    pub value: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledEntry {
    pub label: String,
    pub value: Value,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnlabeledEntry {
    pub value: Value,
    pub is_default: bool,
}

/// A program's argument descriptor, validated into its tagged shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentSet {
    Empty,
    Labeled(Vec<LabeledEntry>),
    Unlabeled(Vec<UnlabeledEntry>),
}

impl ArgumentSet {
    /// Parse a raw descriptor value from the catalog.
    ///
    /// `None`, a non-array, or an empty array all mean "no arguments". The
    /// shape is picked by the first entry: a sub-array whose first element
    /// is a string means Labeled, anything else means Unlabeled.
    pub fn parse(program: &str, descriptor: Option<&Value>) -> Result<Self, AssetError> {
        let entries = match descriptor {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            _ => return Ok(ArgumentSet::Empty),
        };

        let labeled = matches!(
            entries[0].as_array().and_then(|a| a.first()),
            Some(Value::String(_))
        );

        if labeled {
            let parsed = entries
                .iter()
                .map(|entry| parse_labeled_entry(program, entry))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ArgumentSet::Labeled(parsed))
        } else {
            let parsed = entries
                .iter()
                .map(|entry| parse_unlabeled_entry(program, entry))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ArgumentSet::Unlabeled(parsed))
        }
    }

    /// Resolve the descriptor into an ordered option list.
    ///
    /// An empty set yields the single synthetic no-arguments option, which
    /// is implicitly the default. When more than one entry is flagged as
    /// default, the first flagged entry wins; this is a deliberate
    /// deterministic rule, not an accident of iteration order. An Unlabeled
    /// set with no wrapped entry yields no default at all — picking a
    /// fallback is the presentation layer's policy.
    pub fn resolve(&self) -> Vec<ArgOption> {
        match self {
            ArgumentSet::Empty => vec![ArgOption {
                label: NO_ARGUMENTS_LABEL.to_string(),
                value: "[]".to_string(),
                is_default: true,
            }],
            ArgumentSet::Labeled(entries) => {
                let mut defaulted = false;
                entries
                    .iter()
                    .map(|entry| {
                        let is_default = entry.is_default && !defaulted;
                        defaulted |= is_default;
                        ArgOption {
                            label: entry.label.clone(),
                            value: canonical_text(&entry.value),
                            is_default,
                        }
                    })
                    .collect()
            }
            ArgumentSet::Unlabeled(entries) => {
                let mut defaulted = false;
                entries
                    .iter()
                    .map(|entry| {
                        let is_default = entry.is_default && !defaulted;
                        defaulted |= is_default;
                        let text = canonical_text(&entry.value);
                        ArgOption {
                            label: text.clone(),
                            value: text,
                            is_default,
                        }
                    })
                    .collect()
            }
        }
    }

}

fn parse_labeled_entry(program: &str, entry: &Value) -> Result<LabeledEntry, AssetError> {
    let parts = entry.as_array().ok_or_else(|| AssetError::BadDescriptor {
        program: program.to_string(),
        reason: format!("labeled entry is not a list: {entry}"),
    })?;

    let label = match parts.first() {
        Some(Value::String(label)) => label.clone(),
        _ => {
            return Err(AssetError::BadDescriptor {
                program: program.to_string(),
                reason: format!("labeled entry must start with a string label: {entry}"),
            });
        }
    };

    let value = parts.get(1).cloned().ok_or_else(|| AssetError::BadDescriptor {
        program: program.to_string(),
        reason: format!("labeled entry '{label}' has no value"),
    })?;

    let is_default = match parts.get(2) {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(AssetError::BadDescriptor {
                program: program.to_string(),
                reason: format!("labeled entry '{label}' has non-boolean default flag: {other}"),
            });
        }
    };

    Ok(LabeledEntry {
        label,
        value,
        is_default,
    })
}

fn parse_unlabeled_entry(program: &str, entry: &Value) -> Result<UnlabeledEntry, AssetError> {
    match entry {
        // A single-element wrapper marks the default.
        Value::Array(inner) if inner.len() == 1 => Ok(UnlabeledEntry {
            value: inner[0].clone(),
            is_default: true,
        }),
        Value::Array(_) => Err(AssetError::BadDescriptor {
            program: program.to_string(),
            reason: format!("unlabeled default wrapper must hold exactly one value: {entry}"),
        }),
        scalar => Ok(UnlabeledEntry {
            value: scalar.clone(),
            is_default: false,
        }),
    }
}

/// Canonical textual form of an option value: JSON for sequences, plain
/// string form for scalars.
fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(_) => value.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(descriptor: Value) -> ArgumentSet {
        ArgumentSet::parse("test", Some(&descriptor)).unwrap()
    }

    #[test]
    fn missing_descriptor_is_empty() {
        let set = ArgumentSet::parse("test", None).unwrap();
        assert_eq!(set, ArgumentSet::Empty);
        let options = set.resolve();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, NO_ARGUMENTS_LABEL);
        assert_eq!(options[0].value, "[]");
        assert!(options[0].is_default);
    }

    #[test]
    fn empty_list_is_empty() {
        assert_eq!(parse(json!([])), ArgumentSet::Empty);
    }

    #[test]
    fn unlabeled_wrapped_entry_is_default() {
        let options = parse(json!([1, 2, [3], 4])).resolve();
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3", "4"]);
        let defaults: Vec<_> = options.iter().map(|o| o.is_default).collect();
        assert_eq!(defaults, [false, false, true, false]);
        assert_eq!(options[2].value, "3");
    }

    #[test]
    fn unlabeled_without_wrapper_has_no_default() {
        let options = parse(json!(["a", "b", "c"])).resolve();
        assert!(options.iter().all(|o| !o.is_default));
    }

    #[test]
    fn unlabeled_string_values_pass_through() {
        let options = parse(json!(["fast", ["slow"]])).resolve();
        assert_eq!(options[0].value, "fast");
        assert_eq!(options[1].value, "slow");
        assert!(options[1].is_default);
    }

    #[test]
    fn labeled_preserves_order_and_flags() {
        let options = parse(json!([
            ["Alice", "alice", true],
            ["Bob", "bob", false],
            ["Carol", "carol"]
        ]))
        .resolve();

        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Alice", "Bob", "Carol"]);
        let defaults: Vec<_> = options.iter().map(|o| o.is_default).collect();
        assert_eq!(defaults, [true, false, false]);
        assert_eq!(options[0].value, "alice");
    }

    #[test]
    fn labeled_first_marked_default_wins() {
        let options = parse(json!([
            ["One", 1, true],
            ["Two", 2, true]
        ]))
        .resolve();
        assert!(options[0].is_default);
        assert!(!options[1].is_default);
    }

    #[test]
    fn labeled_sequence_value_serializes_as_json() {
        let options = parse(json!([["Pair", [1, 2], true]])).resolve();
        assert_eq!(options[0].value, "[1,2]");
    }

    #[test]
    fn labeled_numeric_value_stringifies() {
        let options = parse(json!([["Ten", 10]])).resolve();
        assert_eq!(options[0].value, "10");
        assert!(!options[0].is_default);
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        // First entry looks Labeled, second is a bare scalar.
        let err = ArgumentSet::parse("test", Some(&json!([["Alice", "alice"], 3]))).unwrap_err();
        assert!(matches!(err, AssetError::BadDescriptor { .. }));
    }

    #[test]
    fn oversized_unlabeled_wrapper_is_rejected() {
        let err = ArgumentSet::parse("test", Some(&json!([1, [2, 3]]))).unwrap_err();
        assert!(matches!(err, AssetError::BadDescriptor { .. }));
    }

}
