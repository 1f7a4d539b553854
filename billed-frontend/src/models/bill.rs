//! Expense bill model.

use serde::{Deserialize, Deserializer, Serialize};

/// Review state of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
    #[serde(other)]
    Unknown,
}

/// An employee expense-report record.
///
/// Optional fields serialize as `null` so the submitted payload always
/// carries every key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub expense_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub vat: String,
    #[serde(default)]
    pub pct: i64,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
}

/// Listed records sometimes carry `vat` as a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null => String::new(),
    })
}

/// Payload returned by the store once a receipt has been uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub file_url: String,
    pub key: String,
}
