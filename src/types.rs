//! Common type definitions.
//!
//! Entity identifiers are UUIDs behind type aliases, except transactions,
//! which are numbered sequentially by the ledger (BIGSERIAL).

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ModelId = Uuid;
pub type AssetId = Uuid;
pub type TransactionId = i64;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&uuid), "550e8400");
    }
}
