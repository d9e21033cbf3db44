use crate::error::FormError;
use crate::record::{EmployeeRole, ValidatedRecord};
use crate::schema::EntityKind;
use core_types::{InsertStatement, Statement, TableName};
use database::Gateway;
use serde::Serialize;

/// Inserts that commit together or not at all, parent row first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertTransaction {
    inserts: Vec<InsertStatement>,
}

impl InsertTransaction {
    pub fn inserts(&self) -> &[InsertStatement] {
        &self.inserts
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.inserts.iter().map(InsertStatement::to_statement).collect()
    }

    pub fn len(&self) -> usize {
        self.inserts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
    }
}

/// Turns a validated record into its insert statements.
///
/// An employee yields the `employee` row followed by the row of its role
/// table, keyed by the same employee id.
pub fn build_transaction(
    kind: EntityKind,
    record: &ValidatedRecord,
) -> Result<InsertTransaction, FormError> {
    if record.kind() != kind {
        return Err(FormError::KindMismatch {
            expected: kind,
            actual: record.kind(),
        });
    }

    let inserts = match record {
        ValidatedRecord::Branch(branch) => vec![
            InsertStatement::new(TableName::Branch)
                .value("branch_id", branch.branch_id)
                .value("city", branch.city.as_str())
                .value("pincode", branch.pincode),
        ],
        ValidatedRecord::Vehicle(vehicle) => vec![
            InsertStatement::new(TableName::Vehicle)
                .value("vehicle_id", vehicle.vehicle_id.as_str())
                .value("distance", vehicle.distance)
                .value("capacity", vehicle.capacity),
        ],
        ValidatedRecord::Employee(employee) => {
            let parent = InsertStatement::new(TableName::Employee)
                .value("employee_id", employee.employee_id)
                .value("name", employee.name.as_str())
                .value("contact_number", employee.contact_number)
                .value("date_of_joining", employee.date_of_joining)
                .value("role", employee.role.role().as_str())
                .value("branch_id", employee.branch_id);

            let child = InsertStatement::new(employee.role.role().table())
                .value("id", employee.employee_id);
            let child = match &employee.role {
                EmployeeRole::Driver { rating, vehicle_id } => child
                    .value("rating", *rating)
                    .value("vehicle_id", vehicle_id.as_str()),
                EmployeeRole::Clerk { accuracy } => child.value("accuracy", *accuracy),
                EmployeeRole::ItSupport { complaints_per_hour } => {
                    child.value("complaints_per_hour", *complaints_per_hour)
                }
            };
            vec![parent, child]
        }
        ValidatedRecord::Feedback(feedback) => vec![
            InsertStatement::new(TableName::Feedback)
                .value("date", feedback.date)
                .value("comment", feedback.comment.clone())
                .value("rating", feedback.rating)
                .value("customer_id", feedback.customer_id),
        ],
    };

    Ok(InsertTransaction { inserts })
}

/// Executes the transaction atomically. Returns the number of rows written.
pub async fn submit<G: Gateway + ?Sized>(
    gateway: &mut G,
    transaction: &InsertTransaction,
) -> Result<u64, FormError> {
    let tables: Vec<&str> = transaction.inserts.iter().map(|i| i.table.as_str()).collect();
    tracing::info!(?tables, "Submitting insert transaction.");

    let rows = gateway.execute_transaction(&transaction.statements()).await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BranchRecord, EmployeeRecord, FeedbackRecord};
    use chrono::NaiveDate;
    use core_types::Value;
    use database::{DbError, MemoryGateway};
    use rust_decimal_macros::dec;

    fn employee(role: EmployeeRole) -> ValidatedRecord {
        ValidatedRecord::Employee(EmployeeRecord {
            employee_id: 12,
            name: "Ravi Patel".into(),
            contact_number: 9876543210,
            date_of_joining: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            branch_id: 7,
            role,
        })
    }

    fn driver() -> ValidatedRecord {
        employee(EmployeeRole::Driver {
            rating: dec!(4.5),
            vehicle_id: "GJ15AB1234".into(),
        })
    }

    #[test]
    fn driver_yields_parent_then_child_with_the_same_id() {
        let tx = build_transaction(EntityKind::Employee, &driver()).unwrap();
        assert_eq!(tx.len(), 2);

        let [parent, child] = tx.inserts() else {
            panic!("expected two inserts");
        };
        assert_eq!(parent.table, TableName::Employee);
        assert_eq!(child.table, TableName::Driver);
        assert_eq!(parent.values[0], Value::Integer(12));
        assert_eq!(child.columns[0], "id");
        assert_eq!(child.values[0], parent.values[0]);
        assert_eq!(parent.values[4], Value::from("Driver"));
    }

    #[test]
    fn every_role_targets_its_own_table() {
        let clerk = build_transaction(EntityKind::Employee, &employee(EmployeeRole::Clerk { accuracy: dec!(97.5) })).unwrap();
        assert_eq!(clerk.inserts()[1].table, TableName::Clerk);
        assert_eq!(clerk.inserts()[1].columns, vec!["id", "accuracy"]);

        let support = build_transaction(
            EntityKind::Employee,
            &employee(EmployeeRole::ItSupport { complaints_per_hour: 6 }),
        )
        .unwrap();
        assert_eq!(support.inserts()[1].table, TableName::ItSupport);
        assert_eq!(support.inserts()[0].values[4], Value::from("IT_Support"));
    }

    #[test]
    fn single_table_entities_yield_one_insert() {
        let branch = ValidatedRecord::Branch(BranchRecord {
            branch_id: 7,
            city: "Valsad".into(),
            pincode: 396001,
        });
        let tx = build_transaction(EntityKind::Branch, &branch).unwrap();
        assert_eq!(tx.len(), 1);
        assert_eq!(
            tx.statements()[0].sql,
            r#"INSERT INTO "branch" ("branch_id", "city", "pincode") VALUES ($1, $2, $3)"#
        );
    }

    #[test]
    fn missing_comment_is_bound_as_null() {
        let feedback = ValidatedRecord::Feedback(FeedbackRecord {
            date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            comment: None,
            rating: dec!(3.5),
            customer_id: 23110100002,
        });
        let tx = build_transaction(EntityKind::Feedback, &feedback).unwrap();
        assert_eq!(tx.inserts()[0].values[1], Value::Null);
    }

    #[test]
    fn feedback_customer_id_is_bound_as_an_integer() {
        let feedback = ValidatedRecord::Feedback(FeedbackRecord {
            date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            comment: Some("On time".into()),
            rating: dec!(4.0),
            customer_id: 23110100002,
        });
        let tx = build_transaction(EntityKind::Feedback, &feedback).unwrap();
        let insert = &tx.inserts()[0];
        assert_eq!(insert.columns[3], "customer_id");
        assert_eq!(insert.values[3], Value::Integer(23110100002));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let err = build_transaction(EntityKind::Vehicle, &driver()).unwrap_err();
        assert!(matches!(
            err,
            FormError::KindMismatch { expected: EntityKind::Vehicle, actual: EntityKind::Employee }
        ));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn submit_commits_every_statement() {
        let tx = build_transaction(EntityKind::Employee, &driver()).unwrap();
        let mut gateway = MemoryGateway::new();

        let rows = submit(&mut gateway, &tx).await.unwrap();
        assert_eq!(rows, 2);
        assert_eq!(gateway.committed(), tx.statements().as_slice());
    }

    #[tokio::test]
    async fn failing_child_insert_leaves_nothing_behind() {
        let tx = build_transaction(EntityKind::Employee, &driver()).unwrap();
        let mut gateway = MemoryGateway::new().fail_transaction_at(1, "foreign key violation on vehicle_id");

        let err = submit(&mut gateway, &tx).await.unwrap_err();
        assert!(matches!(err, FormError::Database(DbError::QueryError(_))));
        assert!(!err.is_validation());
        assert!(gateway.committed().is_empty());
    }
}
