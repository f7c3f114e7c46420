//! Extension diff resolution against wire-shaped entity records

mod common;

use common::entity_from_json;
use serde_json::{json, Value};

use metahub_cli::versioning::resolve_extension;

fn orders_entity(change_description: Value) -> Value {
    json!({
        "id": "8f8e9d3a-1c2b-4d5e-9f60-7a8b9c0d1e2f",
        "name": "orders",
        "displayName": "Orders Fact Table",
        "fullyQualifiedName": "sales.orders",
        "version": 1.3,
        "updatedAt": 1717171717000i64,
        "extension": { "tier": "Gold", "owner": "data-eng", "rowCount": 120000 },
        "changeDescription": change_description
    })
}

#[test]
fn test_plain_view_passes_extension_through() {
    let entity = entity_from_json(orders_entity(json!({
        "previousVersion": 1.2,
        "fieldsAdded": [{ "name": "extension", "newValue": "[{\"tier\": \"Gold\"}]" }],
        "fieldsUpdated": [],
        "fieldsDeleted": []
    })));

    let resolved = resolve_extension(&entity, false);

    assert_eq!(resolved.extension, entity.extension);
    assert!(resolved.added_keys.is_none());
}

#[test]
fn test_added_keys_limited_to_present_columns() {
    let entity = entity_from_json(orders_entity(json!({
        "previousVersion": 1.2,
        "fieldsAdded": [{
            "name": "extension",
            "newValue": "[{\"tier\": \"Gold\", \"retired\": true}]"
        }],
        "fieldsUpdated": [],
        "fieldsDeleted": []
    })));

    let resolved = resolve_extension(&entity, true);

    // "retired" never made it into the stored extension, so it cannot be shown
    let added: Vec<&str> = resolved
        .added_keys
        .as_ref()
        .map(|keys| keys.iter().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(added, vec!["tier"]);
    assert_eq!(resolved.extension, entity.extension);
}

#[test]
fn test_empty_added_payloads_fall_back_to_current() {
    for payload in ["[]", "[{}]"] {
        let entity = entity_from_json(orders_entity(json!({
            "fieldsAdded": [{ "name": "extension", "newValue": payload }],
            "fieldsUpdated": [],
            "fieldsDeleted": []
        })));

        let resolved = resolve_extension(&entity, true);

        assert_eq!(resolved.extension, entity.extension, "payload {:?}", payload);
        assert!(resolved.added_keys.is_none(), "payload {:?}", payload);
    }
}

#[test]
fn test_malformed_added_payload_is_ignored() {
    // A non-string payload and an unparseable string both degrade to the
    // current extension with no highlighting
    for payload in [json!(42), json!("not json at all")] {
        let entity = entity_from_json(orders_entity(json!({
            "fieldsAdded": [{ "name": "extension", "newValue": payload }],
            "fieldsUpdated": [],
            "fieldsDeleted": []
        })));

        let resolved = resolve_extension(&entity, true);

        assert_eq!(resolved.extension, entity.extension);
        assert!(resolved.added_keys.is_none());
    }
}

#[test]
fn test_updated_fields_merge_into_current_rendition() {
    let entity = entity_from_json(orders_entity(json!({
        "previousVersion": 1.2,
        "fieldsAdded": [],
        "fieldsUpdated": [
            { "name": "extension.tier", "oldValue": "\"Gold\"", "newValue": "\"Silver\"" },
            { "name": "extension.rowCount", "newValue": "98000" },
            { "name": "extension.note", "newValue": "plain text, not JSON" },
            { "name": "extension.owner" }
        ],
        "fieldsDeleted": []
    })));

    let resolved = resolve_extension(&entity, true);
    let merged = resolved.extension.as_ref().unwrap();

    // JSON-encoded values are decoded, free text is kept raw, a record
    // without a new value clears the slot
    assert_eq!(merged.get("tier"), Some(&json!("Silver")));
    assert_eq!(merged.get("rowCount"), Some(&json!(98000)));
    assert_eq!(merged.get("note"), Some(&json!("plain text, not JSON")));
    assert_eq!(merged.get("owner"), Some(&Value::Null));
    assert!(resolved.added_keys.is_none());
}

#[test]
fn test_update_records_outside_extension_are_ignored() {
    let entity = entity_from_json(orders_entity(json!({
        "fieldsAdded": [],
        "fieldsUpdated": [
            { "name": "description", "newValue": "\"changed\"" },
            { "name": "extensionish.tier", "newValue": "\"Silver\"" }
        ],
        "fieldsDeleted": []
    })));

    let resolved = resolve_extension(&entity, true);

    assert_eq!(resolved.extension, entity.extension);
}

#[test]
fn test_added_record_takes_priority_over_updates() {
    let entity = entity_from_json(orders_entity(json!({
        "fieldsAdded": [{ "name": "extension", "newValue": "[{\"tier\": \"Gold\"}]" }],
        "fieldsUpdated": [
            { "name": "extension.owner", "newValue": "\"someone-else\"" }
        ],
        "fieldsDeleted": []
    })));

    let resolved = resolve_extension(&entity, true);

    // The add wins; the update record must not rewrite the extension
    assert_eq!(resolved.extension, entity.extension);
    let added: Vec<&str> = resolved
        .added_keys
        .as_ref()
        .map(|keys| keys.iter().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(added, vec!["tier"]);
}

#[test]
fn test_version_view_without_change_description() {
    let entity = entity_from_json(orders_entity(json!(null)));
    assert!(entity.change_description.is_none());

    let resolved = resolve_extension(&entity, true);

    assert_eq!(resolved.extension, entity.extension);
    assert!(resolved.added_keys.is_none());
}

#[test]
fn test_unknown_entity_fields_survive_round_trip() {
    let raw = orders_entity(json!({
        "fieldsAdded": [],
        "fieldsUpdated": [],
        "fieldsDeleted": [{ "name": "extension.legacy", "oldValue": "true" }]
    }));
    let entity = entity_from_json(raw.clone());

    // Deleted records play no part in resolution
    let resolved = resolve_extension(&entity, true);
    assert_eq!(resolved.extension, entity.extension);

    let back = serde_json::to_value(&entity).unwrap();
    assert_eq!(back.get("displayName"), raw.get("displayName"));
    assert_eq!(back.get("extension"), raw.get("extension"));
}
