// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// Account and license identifiers are generated app-side so that the
// in-memory and PostgreSQL stores hand out the same shape of id, and so
// that license listings sort by issue time without an extra index.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a textual record id. Returns `None` for anything that is not a UUID.
pub fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}
