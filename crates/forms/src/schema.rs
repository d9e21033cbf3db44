use crate::error::FormError;
use core_types::{FieldType, TableName};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Entities that can be inserted through a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Branch,
    Vehicle,
    Employee,
    Feedback,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Branch,
        EntityKind::Employee,
        EntityKind::Vehicle,
        EntityKind::Feedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Branch => "branch",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Employee => "employee",
            EntityKind::Feedback => "feedback",
        }
    }
}

impl FromStr for EntityKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormError::UnknownEntity(s.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The employee discriminator. Each role adds its own child-table fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Clerk,
    Driver,
    #[serde(rename = "IT_Support")]
    ItSupport,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Clerk, Role::Driver, Role::ItSupport];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Clerk => "Clerk",
            Role::Driver => "Driver",
            Role::ItSupport => "IT_Support",
        }
    }

    pub fn table(&self) -> TableName {
        match self {
            Role::Clerk => TableName::Clerk,
            Role::Driver => TableName::Driver,
            Role::ItSupport => TableName::ItSupport,
        }
    }

    fn from_choice(choice: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == choice)
    }
}

pub(crate) const ROLE_FIELD: &str = "role";
const ROLE_CHOICES: &[&str] = &["Clerk", "Driver", "IT_Support"];

/// One input field of a form.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    /// Inclusive bounds for numeric fields.
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl FieldSpec {
    fn required(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            required: true,
            min: None,
            max: None,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn between(mut self, min: Decimal, max: Decimal) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    fn at_least(mut self, min: Decimal) -> Self {
        self.min = Some(min);
        self
    }
}

/// Fields that only apply to one employee role.
#[derive(Debug, Clone, Serialize)]
pub struct RoleFields {
    pub role: Role,
    pub table: TableName,
    pub fields: Vec<FieldSpec>,
}

/// The full input schema of one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub table: TableName,
    pub fields: Vec<FieldSpec>,
    /// Role-specific field subsets, selected by the `role` field. Empty for
    /// entities without a discriminator.
    pub roles: Vec<RoleFields>,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn role_fields(&self, role: Role) -> &[FieldSpec] {
        self.roles
            .iter()
            .find(|r| r.role == role)
            .map_or(&[], |r| r.fields.as_slice())
    }

    /// The role selected by a parsed `role` value, if it names one.
    pub(crate) fn role_for(&self, choice: &str) -> Option<Role> {
        Role::from_choice(choice).filter(|role| self.roles.iter().any(|r| r.role == *role))
    }

    fn is_role_field(&self, name: &str) -> bool {
        self.roles
            .iter()
            .any(|r| r.fields.iter().any(|f| f.name == name))
    }

    pub(crate) fn knows_field(&self, name: &str) -> bool {
        self.field(name).is_some() || self.is_role_field(name)
    }
}

static SCHEMAS: OnceLock<Vec<EntitySchema>> = OnceLock::new();

/// Every entity schema, in the order forms are offered.
pub fn schemas() -> &'static [EntitySchema] {
    SCHEMAS.get_or_init(build_schemas)
}

pub fn schema(kind: EntityKind) -> &'static EntitySchema {
    let all = schemas();
    // `build_schemas` defines one schema per `EntityKind` variant.
    all.iter().find(|s| s.kind == kind).unwrap_or(&all[0])
}

fn build_schemas() -> Vec<EntitySchema> {
    let rating = || {
        FieldSpec::required("rating", "Rating (out of 5)", FieldType::Decimal).between(dec!(0.0), dec!(5.0))
    };

    vec![
        EntitySchema {
            kind: EntityKind::Branch,
            table: TableName::Branch,
            fields: vec![
                FieldSpec::required("branch_id", "Branch ID", FieldType::Integer),
                FieldSpec::required("city", "City", FieldType::Text),
                FieldSpec::required("pincode", "Pincode", FieldType::Integer)
                    .between(dec!(100000), dec!(999999)),
            ],
            roles: vec![],
        },
        EntitySchema {
            kind: EntityKind::Employee,
            table: TableName::Employee,
            fields: vec![
                FieldSpec::required("employee_id", "Employee ID", FieldType::Integer),
                FieldSpec::required("name", "Employee Name", FieldType::Text),
                FieldSpec::required("contact_number", "Phone Number", FieldType::Integer),
                FieldSpec::required("date_of_joining", "Hire Date", FieldType::Date),
                FieldSpec::required(ROLE_FIELD, "Post", FieldType::Choice(ROLE_CHOICES)),
                FieldSpec::required("branch_id", "Branch ID", FieldType::Integer),
            ],
            roles: vec![
                RoleFields {
                    role: Role::Clerk,
                    table: Role::Clerk.table(),
                    fields: vec![
                        FieldSpec::required("accuracy", "Performance Score", FieldType::Decimal)
                            .between(dec!(0.0), dec!(100.0)),
                    ],
                },
                RoleFields {
                    role: Role::Driver,
                    table: Role::Driver.table(),
                    fields: vec![
                        rating(),
                        FieldSpec::required("vehicle_id", "Vehicle Assigned", FieldType::Text),
                    ],
                },
                RoleFields {
                    role: Role::ItSupport,
                    table: Role::ItSupport.table(),
                    fields: vec![
                        FieldSpec::required("complaints_per_hour", "Issues Resolved", FieldType::Integer)
                            .at_least(dec!(0)),
                    ],
                },
            ],
        },
        EntitySchema {
            kind: EntityKind::Vehicle,
            table: TableName::Vehicle,
            fields: vec![
                FieldSpec::required("vehicle_id", "Vehicle ID", FieldType::Text),
                FieldSpec::required("distance", "Distance", FieldType::Integer).at_least(dec!(0)),
                FieldSpec::required("capacity", "Capacity", FieldType::Integer).at_least(dec!(0)),
            ],
            roles: vec![],
        },
        EntitySchema {
            kind: EntityKind::Feedback,
            table: TableName::Feedback,
            fields: vec![
                FieldSpec::required("date", "Feedback Date", FieldType::Date),
                FieldSpec::required("comment", "Comment", FieldType::Text).optional(),
                rating(),
                FieldSpec::required("customer_id", "Customer ID", FieldType::Integer),
            ],
            roles: vec![],
        },
    ]
}
