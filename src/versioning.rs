//! Version-diff resolution for entity extension maps.
//!
//! Versioned entity records carry a `changeDescription` listing added,
//! updated, and deleted fields. In version views the extension map shown to
//! the user must reflect those changes: keys added in the viewed version get
//! highlighted, and updated sub-fields show their new values. This module is
//! the pure part of that pipeline; presentation stays with the callers.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::api::models::{ChangeDescription, EntityDetails, ExtensionMap, FieldChange};

/// Field path under which custom property values live on an entity
pub const EXTENSION_FIELD: &str = "extension";

/// Resolved extension view for rendering.
///
/// `added_keys`, when present, is a subset of `extension`'s keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionDiff {
    pub extension: Option<ExtensionMap>,
    pub added_keys: Option<BTreeSet<String>>,
}

/// Change records of a changeDescription that target the extension field
pub struct ExtensionFieldDiff<'a> {
    pub added: Option<&'a FieldChange>,
    pub updated: Vec<&'a FieldChange>,
}

/// Resolve the extension map to display for an entity.
///
/// Outside version views this is an identity pass-through. In version views
/// the changeDescription is folded in: an addition record yields the set of
/// keys to highlight; update records merge their new sub-field values into
/// the map. Never mutates its inputs; same inputs give the same output.
pub fn resolve_extension(entity: &EntityDetails, version_view: bool) -> ExtensionDiff {
    if version_view {
        if let Some(change) = &entity.change_description {
            let diff = extension_field_diff(change);

            // An addition record decides the outcome by itself: either its
            // payload is usable and we highlight, or we fall back to the
            // plain map. Update records are not consulted in that case.
            if let Some(added) = diff.added {
                if let Some(head) = parse_added_payload(added) {
                    if !head.is_empty() {
                        let extension = entity.extension.clone();
                        let added_keys = head
                            .keys()
                            .filter(|key| {
                                extension
                                    .as_ref()
                                    .is_some_and(|ext| ext.contains_key(key.as_str()))
                            })
                            .cloned()
                            .collect();
                        return ExtensionDiff {
                            extension,
                            added_keys: Some(added_keys),
                        };
                    }
                }
                return pass_through(entity);
            }

            if !diff.updated.is_empty() {
                let merged = merge_updated_fields(entity.extension.as_ref(), &diff.updated);
                return ExtensionDiff {
                    extension: Some(merged),
                    added_keys: None,
                };
            }
        }
    }

    pass_through(entity)
}

/// Collect the change records that target the extension field: the first
/// addition record and every update record.
pub fn extension_field_diff(change: &ChangeDescription) -> ExtensionFieldDiff<'_> {
    ExtensionFieldDiff {
        added: change
            .fields_added
            .iter()
            .find(|record| targets_extension(&record.name)),
        updated: change
            .fields_updated
            .iter()
            .filter(|record| targets_extension(&record.name))
            .collect(),
    }
}

/// Merge updated sub-field values into a copy of the extension map.
///
/// Each record's path segment after `extension.` names the property; its new
/// value is JSON-parsed when parseable and kept as the raw string otherwise.
/// Records without a sub-field segment contribute nothing.
pub fn merge_updated_fields(
    extension: Option<&ExtensionMap>,
    updated: &[&FieldChange],
) -> ExtensionMap {
    let mut merged = extension.cloned().unwrap_or_default();

    for record in updated {
        let sub_field = record
            .name
            .strip_prefix(EXTENSION_FIELD)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|rest| rest.split('.').next())
            .filter(|segment| !segment.is_empty());

        let Some(sub_field) = sub_field else {
            continue;
        };

        let value = record
            .new_value
            .as_ref()
            .map(parse_or_raw)
            .unwrap_or(Value::Null);
        merged.insert(sub_field.to_string(), value);
    }

    merged
}

/// Memo for [`resolve_extension`], keyed on the (entity, version_view) pair.
///
/// The default key (empty entity, plain view) maps to the default diff, so
/// the cache starts out consistent without an Option.
#[derive(Default)]
pub struct DiffCache {
    key: (EntityDetails, bool),
    value: ExtensionDiff,
}

impl DiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve through the cache; recomputes only when either input changed
    pub fn resolve(&mut self, entity: &EntityDetails, version_view: bool) -> &ExtensionDiff {
        if self.key.0 != *entity || self.key.1 != version_view {
            self.value = resolve_extension(entity, version_view);
            self.key = (entity.clone(), version_view);
        }
        &self.value
    }
}

fn pass_through(entity: &EntityDetails) -> ExtensionDiff {
    ExtensionDiff {
        extension: entity.extension.clone(),
        added_keys: None,
    }
}

fn targets_extension(name: &str) -> bool {
    match name.strip_prefix(EXTENSION_FIELD) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Parse an addition record's payload: a serialized single-element sequence
/// of maps. Returns the head map, or None when there is nothing usable.
fn parse_added_payload(record: &FieldChange) -> Option<ExtensionMap> {
    let raw = match record.new_value.as_ref().and_then(Value::as_str) {
        Some(raw) => raw,
        None => {
            log::warn!("Added-diff record for 'extension' carries no serialized payload");
            return None;
        }
    };

    match serde_json::from_str::<Vec<ExtensionMap>>(raw) {
        Ok(payload) => payload.into_iter().next(),
        Err(e) => {
            log::warn!("Malformed added-diff payload for 'extension': {}", e);
            None
        }
    }
}

fn parse_or_raw(value: &Value) -> Value {
    match value {
        Value::String(raw) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_with(
        extension: Option<serde_json::Value>,
        change: Option<serde_json::Value>,
    ) -> EntityDetails {
        let mut entity = serde_json::json!({ "name": "orders" });
        if let Some(extension) = extension {
            entity["extension"] = extension;
        }
        if let Some(change) = change {
            entity["changeDescription"] = change;
        }
        serde_json::from_value(entity).unwrap()
    }

    #[test]
    fn test_added_keys_intersect_extension() {
        let entity = entity_with(
            Some(serde_json::json!({ "tier": "gold" })),
            Some(serde_json::json!({
                "fieldsAdded": [
                    { "name": "extension", "newValue": r#"[{"tier":"gold","ghost":1}]"# }
                ]
            })),
        );

        let diff = resolve_extension(&entity, true);
        let added = diff.added_keys.unwrap();
        assert!(added.contains("tier"));
        assert!(!added.contains("ghost"));
    }

    #[test]
    fn test_added_record_blocks_update_branch() {
        // Unusable added payload falls back to pass-through even though an
        // update record is present.
        let entity = entity_with(
            Some(serde_json::json!({ "tier": "gold" })),
            Some(serde_json::json!({
                "fieldsAdded": [
                    { "name": "extension", "newValue": "not json" }
                ],
                "fieldsUpdated": [
                    { "name": "extension.tier", "newValue": "\"silver\"" }
                ]
            })),
        );

        let diff = resolve_extension(&entity, true);
        assert_eq!(diff.added_keys, None);
        assert_eq!(
            diff.extension.unwrap().get("tier"),
            Some(&Value::String("gold".into()))
        );
    }

    #[test]
    fn test_merge_parses_serialized_values_and_keeps_raw() {
        let extension: ExtensionMap =
            serde_json::from_value(serde_json::json!({ "tier": "gold", "rating": 2 })).unwrap();
        let parsed = FieldChange {
            name: "extension.rating".into(),
            old_value: None,
            new_value: Some(Value::String("5".into())),
        };
        let raw = FieldChange {
            name: "extension.tier".into(),
            old_value: None,
            new_value: Some(Value::String("silver".into())),
        };

        let merged = merge_updated_fields(Some(&extension), &[&parsed, &raw]);
        assert_eq!(merged.get("rating"), Some(&serde_json::json!(5)));
        assert_eq!(merged.get("tier"), Some(&Value::String("silver".into())));
    }

    #[test]
    fn test_merge_skips_records_without_sub_field() {
        let extension: ExtensionMap =
            serde_json::from_value(serde_json::json!({ "tier": "gold" })).unwrap();
        let bare = FieldChange {
            name: "extension".into(),
            old_value: None,
            new_value: Some(Value::String("ignored".into())),
        };

        let merged = merge_updated_fields(Some(&extension), &[&bare]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("tier"), Some(&Value::String("gold".into())));
    }

    #[test]
    fn test_deleted_records_do_not_affect_resolution() {
        let entity = entity_with(
            Some(serde_json::json!({ "tier": "gold" })),
            Some(serde_json::json!({
                "fieldsDeleted": [
                    { "name": "extension.owner", "oldValue": "\"alice\"" }
                ]
            })),
        );

        let diff = resolve_extension(&entity, true);
        assert_eq!(diff, resolve_extension(&entity, false));
    }

    #[test]
    fn test_cache_recomputes_only_on_input_change() {
        let first = entity_with(Some(serde_json::json!({ "tier": "gold" })), None);
        let second = entity_with(Some(serde_json::json!({ "tier": "silver" })), None);

        let mut cache = DiffCache::new();
        let a = cache.resolve(&first, false).clone();
        let b = cache.resolve(&first, false).clone();
        assert_eq!(a, b);

        let c = cache.resolve(&second, false).clone();
        assert_eq!(
            c.extension.unwrap().get("tier"),
            Some(&Value::String("silver".into()))
        );

        // Flipping the view flag is also a key change
        let d = cache.resolve(&second, true).clone();
        assert_eq!(d.added_keys, None);
    }
}
