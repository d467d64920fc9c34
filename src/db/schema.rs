/// Schema for the durable stores.
pub const SCHEMA: &str = r#"
-- Response cache: one serialized payload per fully-qualified request
CREATE TABLE IF NOT EXISTS response_cache (
    request_hash TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    request TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (request_hash, entity_type)
);

-- Small keyed values (search history is a JSON list under a fixed key)
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
