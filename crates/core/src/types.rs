/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Free-form JSON object attached to certificates (`metadata` JSONB column).
pub type Metadata = serde_json::Map<String, serde_json::Value>;
