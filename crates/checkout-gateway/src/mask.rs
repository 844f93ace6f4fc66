//! Payload masking for debug logs

use serde::Serialize;
use serde_json::Value;

/// Keep only the last four characters
fn mask_tail(value: &str) -> String {
    let len = value.chars().count();
    if len > 4 {
        let tail: String = value.chars().skip(len - 4).collect();
        "*".repeat(len - 4) + &tail
    } else {
        "*".repeat(len)
    }
}

/// Keys whose values keep their last four characters
fn is_partial_key(key: &str) -> bool {
    matches!(
        key,
        "account_number" | "routing_number" | "payment_method_nonce" | "mobile_phone" | "phone"
    )
}

/// Keys whose values are hidden entirely
fn is_secret_key(key: &str) -> bool {
    matches!(key, "tax_id" | "ssn" | "date_of_birth" | "client_token")
}

pub fn secure_serializable(v: impl Serialize) -> Value {
    match serde_json::to_value(v) {
        Ok(value) => secure_value(&value),
        Err(_) => Value::String("<unserializable>".into()),
    }
}

pub fn secure_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let new_val = match val {
                    Value::String(s) if is_partial_key(k) => Value::String(mask_tail(s)),
                    Value::String(_) | Value::Number(_) if is_secret_key(k) => {
                        Value::String("***".into())
                    }
                    _ => secure_value(val),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        other => other.clone(),
    }
}
