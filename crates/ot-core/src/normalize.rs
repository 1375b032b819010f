//! # Normalizer: Key Rewrite and Date Coercion
//!
//! A single depth-first walk over a [`Document`] applying two independent
//! rules, each gated by its own [`TidyConfig`] flag:
//!
//! 1. **Keys.** A mapping with at least one underscored key has every key
//!    converted to camelCase, in place, keeping order. Mappings with no
//!    underscored key are left as they are.
//! 2. **Dates.** A leaf whose key matches a configured date key is replaced
//!    by the result of [`parse_date`]. Sequence elements are keyed by their
//!    decimal index; the root has no key.
//!
//! A mapping's keys are rewritten before its children are visited, so the
//! date rule always tests the final key: `updated_at` is matched as
//! `updatedAt`.
//!
//! ## Invariants
//!
//! - Same nesting, same sequence lengths, same key order.
//! - Only keys and leaf values change; containers are never coerced.

use crate::casing::{camel_case, needs_rewrite};
use crate::config::TidyConfig;
use crate::document::{Document, Mapping};
use crate::temporal::parse_date;

/// Normalize a document.
pub fn normalize(doc: Document, config: &TidyConfig) -> Document {
    visit(doc, None, config)
}

fn visit(node: Document, key: Option<&str>, config: &TidyConfig) -> Document {
    match node {
        Document::Mapping(mapping) => Document::Mapping(visit_mapping(mapping, config)),
        Document::Sequence(items) => Document::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| visit(item, Some(&i.to_string()), config))
                .collect(),
        ),
        leaf => match key {
            Some(k) if config.dates && config.is_date_key(k) => Document::Date(parse_date(&leaf)),
            _ => leaf,
        },
    }
}

fn visit_mapping(mapping: Mapping, config: &TidyConfig) -> Mapping {
    let rename = config.keys && needs_rewrite(mapping.keys());
    mapping
        .into_iter()
        .map(|(k, v)| {
            let k = if rename { camel_case(&k) } else { k };
            let v = visit(v, Some(&k), config);
            (k, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DateKey, TidyOverride};
    use crate::document::DateValue;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn config(over: TidyOverride) -> TidyConfig {
        TidyConfig::default().merge(&over)
    }

    #[test]
    fn renames_and_coerces_study_record() {
        let cfg = config(TidyOverride {
            keys: Some(true),
            dates: Some(true),
            date_keys: Some(vec![DateKey::parse("/Date$/").unwrap()]),
            ..Default::default()
        });
        let doc = Document::from(json!({
            "study_title": "X",
            "registrationDate": "2020-01-01T00:00:00Z"
        }));

        let out = normalize(doc, &cfg);

        let m = out.as_mapping().unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["studyTitle", "registrationDate"]);
        assert_eq!(m.get("studyTitle").and_then(Document::as_str), Some("X"));
        assert_eq!(
            m.get("registrationDate").and_then(Document::as_date),
            Some(&DateValue::Valid(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn key_rule_disabled_leaves_keys() {
        let cfg = config(TidyOverride {
            keys: Some(false),
            ..Default::default()
        });
        let out = normalize(Document::from(json!({"a_b": 1})), &cfg);
        assert_eq!(out, Document::from(json!({"a_b": 1})));
    }

    #[test]
    fn date_rule_disabled_leaves_strings() {
        let cfg = config(TidyOverride {
            dates: Some(false),
            ..Default::default()
        });
        let out = normalize(Document::from(json!({"registration_date": "2020-01-01"})), &cfg);
        assert_eq!(out, Document::from(json!({"registrationDate": "2020-01-01"})));
    }

    #[test]
    fn date_rule_sees_renamed_key() {
        let cfg = TidyConfig::default();
        let out = normalize(
            Document::from(json!({"records": [{"updated_at": "2016-10-05T12:00:00Z", "source_id": "nct"}]})),
            &cfg,
        );
        let record = &out.get("records").and_then(Document::as_sequence).unwrap()[0];
        assert!(record.get("updatedAt").and_then(Document::as_date).unwrap().is_valid());
        assert_eq!(record.get("sourceId").and_then(Document::as_str), Some("nct"));
    }

    #[test]
    fn non_matching_key_never_coerced() {
        let cfg = TidyConfig::default();
        let doc = Document::from(json!({"publicTitle": "2020-01-01T00:00:00Z"}));
        assert_eq!(normalize(doc.clone(), &cfg), doc);
    }

    #[test]
    fn mapping_without_underscores_untouched() {
        let cfg = TidyConfig::default();
        let doc = Document::from(json!({"ID": 1, "Name": "x"}));
        assert_eq!(normalize(doc.clone(), &cfg), doc);
    }

    #[test]
    fn underscore_sibling_renames_whole_mapping() {
        let cfg = TidyConfig::default();
        let out = normalize(Document::from(json!({"ID": 1, "public_title": "x"})), &cfg);
        let keys: Vec<_> = out.as_mapping().unwrap().keys().map(String::from).collect();
        assert_eq!(keys, vec!["id", "publicTitle"]);
    }

    #[test]
    fn sequence_elements_keyed_by_index() {
        let cfg = config(TidyOverride {
            date_keys: Some(vec![DateKey::parse("1").unwrap()]),
            ..Default::default()
        });
        let out = normalize(Document::from(json!({"stamps": ["a", "2020-01-01", "b"]})), &cfg);
        let stamps = out.get("stamps").and_then(Document::as_sequence).unwrap();
        assert_eq!(stamps[0].as_str(), Some("a"));
        assert!(stamps[1].as_date().unwrap().is_valid());
        assert_eq!(stamps[2].as_str(), Some("b"));
    }

    #[test]
    fn containers_under_date_keys_are_walked_not_coerced() {
        let cfg = TidyConfig::default();
        let doc = Document::from(json!({"registrationDate": {}, "createdAt": []}));
        assert_eq!(normalize(doc.clone(), &cfg), doc);
    }

    #[test]
    fn root_scalar_is_never_coerced() {
        let cfg = TidyConfig::default();
        let doc = Document::String("2020-01-01".into());
        assert_eq!(normalize(doc.clone(), &cfg), doc);
    }

    // Known-lenient: a malformed timestamp is kept as an invalid date.
    #[test]
    fn unparseable_date_becomes_invalid_marker() {
        let cfg = TidyConfig::default();
        let out = normalize(Document::from(json!({"registrationDate": "unknown"})), &cfg);
        assert_eq!(
            out.get("registrationDate"),
            Some(&Document::Date(DateValue::Invalid("unknown".into())))
        );
    }

    #[test]
    fn empty_containers_pass_through() {
        let cfg = TidyConfig::default();
        assert_eq!(
            normalize(Document::from(json!({})), &cfg),
            Document::from(json!({}))
        );
        assert_eq!(
            normalize(Document::from(json!([])), &cfg),
            Document::from(json!([]))
        );
    }
}
