//! Document keys and the load-time cleanup pass.

use serde_json::Value;
use tracing::warn;

use dokon_ledger::AppState;

/// Key of the global fallback copy, written alongside every per-user save.
pub const FALLBACK_KEY: &str = "state:fallback";

/// Per-user document key (usernames are case-insensitive keys).
pub fn user_key(username: &str) -> String {
    format!("state:{}", username.trim().to_ascii_lowercase())
}

/// One-off field-cleanup pass applied on load.
///
/// Early documents carried a redundant `unitPriceUzs` on inventory rows,
/// written by a conversion bug that copied the native price verbatim. When
/// the copy still equals the native price it is dropped; a differing value is
/// left alone (it then carries real information and deserialization ignores
/// it anyway). There is no schema version field and no other migration.
pub fn clean_document(mut document: Value) -> Value {
    for pool in ["warehouse", "store"] {
        let Some(items) = document.get_mut(pool).and_then(Value::as_array_mut) else {
            continue;
        };
        for item in items {
            let Some(object) = item.as_object_mut() else {
                continue;
            };
            let redundant = match (object.get("unitPriceUzs"), object.get("unitPrice")) {
                (Some(copy), Some(native)) => copy == native,
                _ => false,
            };
            if redundant {
                object.remove("unitPriceUzs");
            }
        }
    }
    document
}

/// Decode a loaded document into application state.
///
/// A malformed document is logged and treated as "no data": the application
/// continues with defaults rather than refusing to start.
pub fn decode_state(document: Value) -> AppState {
    match serde_json::from_value(clean_document(document)) {
        Ok(state) => state,
        Err(err) => {
            warn!(error = %err, "stored state document is malformed; starting empty");
            AppState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_keys_are_case_insensitive() {
        assert_eq!(user_key("Aziza"), "state:aziza");
        assert_eq!(user_key(" AZIZA "), "state:aziza");
    }

    #[test]
    fn cleanup_drops_redundant_price_copy() {
        let document = json!({
            "warehouse": [
                {"unitPrice": 11000.0, "unitPriceUzs": 11000.0, "name": "Guruch"},
                {"unitPrice": 2.5, "unitPriceUzs": 31250.0, "name": "Un"},
            ],
            "store": [],
        });

        let cleaned = clean_document(document);

        assert!(cleaned["warehouse"][0].get("unitPriceUzs").is_none());
        // A differing copy is not touched.
        assert_eq!(cleaned["warehouse"][1]["unitPriceUzs"], 31250.0);
    }

    #[test]
    fn decode_malformed_document_falls_back_to_defaults() {
        let state = decode_state(json!({"warehouse": "not-an-array"}));
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn decode_round_trips_an_encoded_state() {
        let state = AppState::default();
        let document = serde_json::to_value(&state).unwrap();
        assert_eq!(decode_state(document), state);
    }
}
