//! JSON schemas for flow payloads. The record schemas mirror the persisted
//! shapes in `wm_model::records`.

use serde_json::{Value, json};

const MAX_ITEMS: u64 = 1000;
const MAX_TEXT: u64 = 4000;

fn language() -> Value {
    json!({ "type": "string", "enum": ["en", "es"] })
}

fn money() -> Value {
    json!({ "type": "number", "minimum": 0 })
}

pub fn goal() -> Value {
    json!({
        "type": "object",
        "required": ["id", "name", "targetAmount", "currentAmount", "targetDate", "importance"],
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string", "minLength": 1 },
            "targetAmount": money(),
            "currentAmount": money(),
            "targetDate": { "type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}" },
            "importance": { "type": "string", "enum": ["low", "medium", "high"] }
        }
    })
}

pub fn transaction() -> Value {
    json!({
        "type": "object",
        "required": ["id", "description", "amount", "type", "date"],
        "properties": {
            "id": { "type": "string" },
            "description": { "type": "string" },
            "amount": money(),
            "type": { "type": "string", "enum": ["income", "expense"] },
            "date": { "type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}" }
        }
    })
}

pub fn wheel_entry() -> Value {
    json!({
        "type": "object",
        "required": ["id", "label", "value"],
        "properties": {
            "id": { "type": "string" },
            "label": { "type": "string" },
            "value": { "type": "number", "minimum": 0, "maximum": 10 },
            "description": { "type": "string" }
        }
    })
}

pub fn reflection() -> Value {
    json!({
        "type": "object",
        "required": ["id", "prompt", "content"],
        "properties": {
            "id": { "type": "string" },
            "prompt": { "type": "string" },
            "content": { "type": "string", "maxLength": MAX_TEXT }
        }
    })
}

pub fn investment() -> Value {
    json!({
        "type": "object",
        "required": ["id", "name", "kind", "amount", "expectedReturn"],
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "kind": {
                "type": "string",
                "enum": ["stocks", "bonds", "funds", "realEstate", "crypto", "cash", "other"]
            },
            "amount": money(),
            "expectedReturn": { "type": "number" }
        }
    })
}

fn list_of(item: Value) -> Value {
    json!({ "type": "array", "items": item, "maxItems": MAX_ITEMS })
}

/// Full client snapshot, as sent to the coaching flow.
pub fn snapshot() -> Value {
    json!({
        "type": "object",
        "required": ["userName"],
        "properties": {
            "userName": { "type": "string", "minLength": 1, "maxLength": 200 },
            "language": language(),
            "mood": { "type": "string", "enum": ["great", "good", "neutral", "low", "stressed"] },
            "goals": list_of(goal()),
            "transactions": list_of(transaction()),
            "wealthWheel": list_of(wheel_entry()),
            "reflections": list_of(reflection()),
            "investments": list_of(investment())
        }
    })
}

pub fn chat() -> Value {
    json!({
        "type": "object",
        "required": ["message"],
        "properties": {
            "message": { "type": "string", "minLength": 1, "maxLength": MAX_TEXT },
            "history": {
                "type": "array",
                "maxItems": 50,
                "items": {
                    "type": "object",
                    "required": ["role", "content"],
                    "properties": {
                        "role": { "type": "string", "enum": ["user", "model"] },
                        "content": { "type": "string", "maxLength": MAX_TEXT }
                    }
                }
            },
            "language": language(),
            "context": snapshot()
        }
    })
}

pub fn insights() -> Value {
    json!({
        "type": "object",
        "required": ["goals", "transactions"],
        "properties": {
            "goals": list_of(goal()),
            "transactions": list_of(transaction()),
            "investments": list_of(investment()),
            "language": language(),
            "asOf": { "type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}$" }
        }
    })
}
