use serde::{Deserialize, Serialize};

/// One entry in the host's key-value settings store. The access payload
/// builder folds the full list into a single JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
}
