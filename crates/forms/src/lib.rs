//! # Insert Form Engine
//!
//! Declarative input schemas for the entities that can be created from the
//! dashboard, plus the three steps of an insert:
//!
//! 1. [`validate`] raw text input into a typed [`ValidatedRecord`],
//! 2. [`build_transaction`] turns the record into ordered inserts,
//! 3. [`submit`] runs them as one database transaction.
//!
//! Validation never talks to the database.

pub mod error;
pub mod record;
pub mod schema;
pub mod transaction;
pub mod validate;

pub use error::{FormError, Violation, ViolationKind};
pub use record::{EmployeeRole, ValidatedRecord};
pub use schema::{EntityKind, EntitySchema, FieldSpec, Role, schema, schemas};
pub use transaction::{InsertTransaction, build_transaction, submit};
pub use validate::{FieldValues, validate};

use database::Gateway;

/// Validates, builds and submits one form in a single call.
pub async fn insert<G: Gateway + ?Sized>(
    gateway: &mut G,
    kind: EntityKind,
    values: &FieldValues,
) -> Result<u64, FormError> {
    let record = validate(kind, values)?;
    let transaction = build_transaction(kind, &record)?;
    submit(gateway, &transaction).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::MemoryGateway;

    #[tokio::test]
    async fn invalid_input_never_reaches_the_gateway() {
        let mut gateway = MemoryGateway::new();
        let values = FieldValues::from([("city".to_string(), "Surat".to_string())]);

        let err = insert(&mut gateway, EntityKind::Branch, &values).await.unwrap_err();
        assert!(matches!(err, FormError::Validation { .. }));
        assert!(gateway.committed().is_empty());
    }

    #[tokio::test]
    async fn valid_vehicle_is_inserted() {
        let mut gateway = MemoryGateway::new();
        let values = FieldValues::from([
            ("vehicle_id".to_string(), "GJ05XY9876".to_string()),
            ("distance".to_string(), "0".to_string()),
            ("capacity".to_string(), "25".to_string()),
        ]);

        assert_eq!(insert(&mut gateway, EntityKind::Vehicle, &values).await.unwrap(), 1);
        assert_eq!(gateway.committed()[0].params[0], core_types::Value::from("GJ05XY9876"));
    }
}
