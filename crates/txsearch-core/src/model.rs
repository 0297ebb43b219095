//! Transaction record model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Merchant embedded in a transaction
///
/// Has no identity of its own; its lifetime is bound to the owning record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Merchant {
    /// Merchant name
    pub name: Option<String>,
    /// Merchant category
    pub category: Option<String>,
}

/// Financial transaction record
///
/// Every field is independently optional so the same type serves as a full
/// record and as an update payload, where `None` means "leave unchanged",
/// never "clear the field".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Store-wide unique identifier; immutable once assigned
    pub id: Option<String>,
    /// Timestamp, no offset beyond what the store records
    pub date: Option<NaiveDateTime>,
    /// Monetary amount
    pub amount: Option<Decimal>,
    /// Free-text description
    pub description: Option<String>,
    /// Embedded merchant
    pub merchant: Option<Merchant>,
}

impl Transaction {
    /// Apply an update patch against a stored record.
    ///
    /// A non-null patch field wins, otherwise the stored value is kept. The
    /// merchant is replaced as a whole, never merged field by field. The
    /// resulting id is always `id`; whatever id the patch carries is ignored.
    pub fn merge(existing: &Transaction, patch: &Transaction, id: &str) -> Transaction {
        Transaction {
            id: Some(id.to_string()),
            date: patch.date.or(existing.date),
            amount: patch.amount.or(existing.amount),
            description: patch
                .description
                .clone()
                .or_else(|| existing.description.clone()),
            merchant: patch.merchant.clone().or_else(|| existing.merchant.clone()),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample() -> Transaction {
        Transaction {
            id: Some("tx-1".to_string()),
            date: "2024-01-15T10:00:00".parse().ok(),
            amount: Decimal::from_str("42.50").ok(),
            description: Some("groceries".to_string()),
            merchant: Some(Merchant {
                name: Some("Corner Market".to_string()),
                category: Some("food".to_string()),
            }),
        }
    }

    #[test]
    fn test_merge_patch_fields_win() {
        let existing = sample();
        let patch = Transaction {
            amount: Decimal::from_str("99.99").ok(),
            description: Some("weekly groceries".to_string()),
            ..Transaction::default()
        };

        let merged = Transaction::merge(&existing, &patch, "tx-1");
        assert_eq!(merged.amount, Decimal::from_str("99.99").ok());
        assert_eq!(merged.description, Some("weekly groceries".to_string()));
        // Untouched fields keep their stored values
        assert_eq!(merged.date, existing.date);
        assert_eq!(merged.merchant, existing.merchant);
    }

    #[test]
    fn test_merge_null_fields_keep_existing() {
        let existing = sample();
        let merged = Transaction::merge(&existing, &Transaction::default(), "tx-1");
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_merge_with_own_values_is_idempotent() {
        let existing = sample();
        let merged = Transaction::merge(&existing, &existing.clone(), "tx-1");
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_merge_replaces_merchant_wholesale() {
        let existing = sample();
        let patch = Transaction {
            merchant: Some(Merchant {
                name: Some("Other Shop".to_string()),
                category: None,
            }),
            ..Transaction::default()
        };

        let merged = Transaction::merge(&existing, &patch, "tx-1");
        // The stored category is NOT carried into the new merchant
        assert_eq!(
            merged.merchant,
            Some(Merchant {
                name: Some("Other Shop".to_string()),
                category: None,
            })
        );
    }

    #[test]
    fn test_merge_ignores_patch_id() {
        let existing = sample();
        let patch = Transaction {
            id: Some("someone-elses-id".to_string()),
            ..Transaction::default()
        };

        let merged = Transaction::merge(&existing, &patch, "tx-1");
        assert_eq!(merged.id, Some("tx-1".to_string()));
    }
}
