use crate::error::{FormError, Violation, ViolationKind};
use crate::record::{
    BranchRecord, EmployeeRecord, EmployeeRole, FeedbackRecord, ValidatedRecord, VehicleRecord,
};
use crate::schema::{self, EntityKind, FieldSpec, ROLE_FIELD, Role};
use chrono::NaiveDate;
use core_types::Value;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Raw form input: field name to the text the user entered.
pub type FieldValues = BTreeMap<String, String>;

/// Checks raw input against the entity's schema and builds a typed record.
///
/// Every violation is collected before returning, so one call reports all
/// problems of a submission. Blank optional fields become NULL; nothing else
/// is ever defaulted.
pub fn validate(kind: EntityKind, values: &FieldValues) -> Result<ValidatedRecord, FormError> {
    let schema = schema::schema(kind);
    let mut parsed = Parsed::default();
    let mut violations = Vec::new();

    for spec in &schema.fields {
        check_field(spec, values, &mut parsed, &mut violations);
    }

    let role = match parsed.get(ROLE_FIELD) {
        Some(Value::Text(choice)) => schema.role_for(choice),
        _ => None,
    };
    let role_fields = role.map_or(&[][..], |role| schema.role_fields(role));
    for spec in role_fields {
        check_field(spec, values, &mut parsed, &mut violations);
    }

    for name in values.keys() {
        let accepted = schema.field(name).is_some() || role_fields.iter().any(|f| f.name == name);
        if accepted {
            continue;
        }
        match role {
            Some(role) => violations.push(Violation::new(
                name,
                ViolationKind::Unknown,
                format!("is not used by {} employees", role.as_str()),
            )),
            // Without a usable role, role fields can be neither accepted nor rejected yet.
            None if schema.knows_field(name) => {}
            None => violations.push(Violation::new(
                name,
                ViolationKind::Unknown,
                format!("is not a {kind} field"),
            )),
        }
    }

    if !violations.is_empty() {
        tracing::debug!(entity = %kind, violations = violations.len(), "Rejected form input.");
        return Err(FormError::Validation {
            entity: kind,
            violations,
        });
    }

    build_record(kind, role, &parsed).map_err(|violation| FormError::Validation {
        entity: kind,
        violations: vec![violation],
    })
}

fn check_field(
    spec: &FieldSpec,
    values: &FieldValues,
    parsed: &mut Parsed,
    violations: &mut Vec<Violation>,
) {
    let raw = values
        .get(spec.name)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty());

    let Some(raw) = raw else {
        if spec.required {
            violations.push(Violation::new(spec.name, ViolationKind::Missing, "is required"));
        } else {
            parsed.0.insert(spec.name, Value::Null);
        }
        return;
    };

    match spec.field_type.parse(raw) {
        Ok(value) => match range_problem(spec, &value) {
            Some(message) => {
                violations.push(Violation::new(spec.name, ViolationKind::OutOfRange, message))
            }
            None => {
                parsed.0.insert(spec.name, value);
            }
        },
        Err(err) => violations.push(Violation::new(spec.name, ViolationKind::Invalid, err.to_string())),
    }
}

fn range_problem(spec: &FieldSpec, value: &Value) -> Option<String> {
    let number = match value {
        Value::Integer(i) => Decimal::from(*i),
        Value::Decimal(d) => *d,
        _ => return None,
    };
    match (spec.min, spec.max) {
        (Some(min), Some(max)) if number < min || number > max => {
            Some(format!("must be between {min} and {max}"))
        }
        (Some(min), None) if number < min => Some(format!("must be at least {min}")),
        (None, Some(max)) if number > max => Some(format!("must be at most {max}")),
        _ => None,
    }
}

/// Parsed values of the fields that passed their checks.
#[derive(Debug, Default)]
struct Parsed(BTreeMap<&'static str, Value>);

impl Parsed {
    fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn integer(&self, name: &str) -> Result<i64, Violation> {
        match self.get(name) {
            Some(Value::Integer(i)) => Ok(*i),
            _ => Err(unexpected(name)),
        }
    }

    fn decimal(&self, name: &str) -> Result<Decimal, Violation> {
        match self.get(name) {
            Some(Value::Decimal(d)) => Ok(*d),
            _ => Err(unexpected(name)),
        }
    }

    fn date(&self, name: &str) -> Result<NaiveDate, Violation> {
        match self.get(name) {
            Some(Value::Date(d)) => Ok(*d),
            _ => Err(unexpected(name)),
        }
    }

    fn text(&self, name: &str) -> Result<String, Violation> {
        match self.get(name) {
            Some(Value::Text(s)) => Ok(s.clone()),
            _ => Err(unexpected(name)),
        }
    }

    fn optional_text(&self, name: &str) -> Result<Option<String>, Violation> {
        match self.get(name) {
            Some(Value::Null) => Ok(None),
            _ => self.text(name).map(Some),
        }
    }
}

fn unexpected(name: &str) -> Violation {
    Violation::new(name, ViolationKind::Invalid, "has no usable value")
}

fn build_record(
    kind: EntityKind,
    role: Option<Role>,
    p: &Parsed,
) -> Result<ValidatedRecord, Violation> {
    let record = match kind {
        EntityKind::Branch => ValidatedRecord::Branch(BranchRecord {
            branch_id: p.integer("branch_id")?,
            city: p.text("city")?,
            pincode: p.integer("pincode")?,
        }),
        EntityKind::Vehicle => ValidatedRecord::Vehicle(VehicleRecord {
            vehicle_id: p.text("vehicle_id")?,
            distance: p.integer("distance")?,
            capacity: p.integer("capacity")?,
        }),
        EntityKind::Employee => {
            let role = match role {
                Some(Role::Driver) => EmployeeRole::Driver {
                    rating: p.decimal("rating")?,
                    vehicle_id: p.text("vehicle_id")?,
                },
                Some(Role::Clerk) => EmployeeRole::Clerk {
                    accuracy: p.decimal("accuracy")?,
                },
                Some(Role::ItSupport) => EmployeeRole::ItSupport {
                    complaints_per_hour: p.integer("complaints_per_hour")?,
                },
                None => return Err(unexpected(ROLE_FIELD)),
            };
            ValidatedRecord::Employee(EmployeeRecord {
                employee_id: p.integer("employee_id")?,
                name: p.text("name")?,
                contact_number: p.integer("contact_number")?,
                date_of_joining: p.date("date_of_joining")?,
                branch_id: p.integer("branch_id")?,
                role,
            })
        }
        EntityKind::Feedback => ValidatedRecord::Feedback(FeedbackRecord {
            date: p.date("date")?,
            comment: p.optional_text("comment")?,
            rating: p.decimal("rating")?,
            customer_id: p.integer("customer_id")?,
        }),
    };
    Ok(record)
}
