/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Session identifiers are opaque strings, unique per run.
pub type SessionId = String;
