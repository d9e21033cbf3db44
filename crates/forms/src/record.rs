use crate::schema::{EntityKind, Role};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchRecord {
    pub branch_id: i64,
    pub city: String,
    pub pincode: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub vehicle_id: String,
    pub distance: i64,
    pub capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role")]
pub enum EmployeeRole {
    Driver { rating: Decimal, vehicle_id: String },
    Clerk { accuracy: Decimal },
    #[serde(rename = "IT_Support")]
    ItSupport { complaints_per_hour: i64 },
}

impl EmployeeRole {
    pub fn role(&self) -> Role {
        match self {
            EmployeeRole::Driver { .. } => Role::Driver,
            EmployeeRole::Clerk { .. } => Role::Clerk,
            EmployeeRole::ItSupport { .. } => Role::ItSupport,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub employee_id: i64,
    pub name: String,
    pub contact_number: i64,
    pub date_of_joining: NaiveDate,
    pub branch_id: i64,
    #[serde(flatten)]
    pub role: EmployeeRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub date: NaiveDate,
    pub comment: Option<String>,
    pub rating: Decimal,
    pub customer_id: i64,
}

/// A fully typed, range-checked record, ready to become an insert transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum ValidatedRecord {
    Branch(BranchRecord),
    Vehicle(VehicleRecord),
    Employee(EmployeeRecord),
    Feedback(FeedbackRecord),
}

impl ValidatedRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            ValidatedRecord::Branch(_) => EntityKind::Branch,
            ValidatedRecord::Vehicle(_) => EntityKind::Vehicle,
            ValidatedRecord::Employee(_) => EntityKind::Employee,
            ValidatedRecord::Feedback(_) => EntityKind::Feedback,
        }
    }
}
