use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A persisted user.
///
/// The identifier is stored under the `email` key so documents written by
/// earlier deployments load unchanged, even when the identifier is a phone
/// number.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "email")]
    pub identifier: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Record created by a local signup.
    #[must_use]
    pub fn with_password(identifier: String, phone: Option<String>, password_digest: String) -> Self {
        Self {
            identifier,
            phone,
            password: Some(password_digest),
            created_at: now(),
        }
    }

    /// Record created on first login through an external identity provider.
    #[must_use]
    pub fn passwordless(identifier: String) -> Self {
        Self {
            identifier,
            phone: None,
            password: None,
            created_at: now(),
        }
    }

    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

// Stored precision; keeps in-memory records equal to what a reload returns.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// Older documents stored `phone` and `password` exactly as the client sent
// them, so numbers and booleans show up. Keep their text instead of rejecting
// the whole collection.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value),
        Some(other) => Some(other.to_string()),
    })
}

// Timestamps are written as `2024-05-01T10:00:00.000Z`; any RFC 3339 offset is accepted on read.
mod rfc3339_millis {
    use super::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use chrono::TimeZone;

    #[test]
    fn serializes_with_legacy_field_names() -> Result<()> {
        let created_at = Utc
            .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
            .single()
            .context("valid timestamp")?;
        let record = UserRecord {
            identifier: "alice@example.com".to_string(),
            phone: None,
            password: None,
            created_at,
        };
        let value = serde_json::to_value(&record)?;
        assert_eq!(
            value,
            serde_json::json!({
                "email": "alice@example.com",
                "phone": null,
                "password": null,
                "createdAt": "2024-05-01T10:00:00.000Z",
            })
        );
        Ok(())
    }

    #[test]
    fn reads_records_without_phone_field() -> Result<()> {
        // Provider-created entries from older documents omit `phone`.
        let raw = r#"{"email":"mockuser@facebook.com","password":null,"createdAt":"2025-01-02T03:04:05.678Z"}"#;
        let record: UserRecord = serde_json::from_str(raw)?;
        assert_eq!(record.identifier, "mockuser@facebook.com");
        assert_eq!(record.phone, None);
        assert!(!record.has_password());
        assert_eq!(
            record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "2025-01-02T03:04:05.678Z"
        );
        Ok(())
    }

    #[test]
    fn reads_non_string_phone_and_password() -> Result<()> {
        let raw = r#"[
            {"email":"a@b.com","phone":null,"password":"p1","createdAt":"2024-01-01T00:00:00.000Z"},
            {"email":"c@d.com","phone":5550100,"password":1234,"createdAt":"2024-01-02T00:00:00.000Z"},
            {"email":"e@f.com","phone":false,"password":true,"createdAt":"2024-01-03T00:00:00.000Z"}
        ]"#;
        let records: Vec<UserRecord> = serde_json::from_str(raw)?;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].password.as_deref(), Some("p1"));
        assert_eq!(records[1].phone.as_deref(), Some("5550100"));
        assert_eq!(records[1].password.as_deref(), Some("1234"));
        assert_eq!(records[2].phone.as_deref(), Some("false"));
        assert_eq!(records[2].password.as_deref(), Some("true"));
        Ok(())
    }

    #[test]
    fn rejects_invalid_timestamp() {
        let raw = r#"{"email":"a@b.com","createdAt":"yesterday"}"#;
        assert!(serde_json::from_str::<UserRecord>(raw).is_err());
    }
}
