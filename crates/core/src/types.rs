/// Store-assigned primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Chat-platform identifiers (users, servers) are 64-bit snowflakes,
/// stored as BIGINT.
pub type Snowflake = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
