use crate::error::CoreError;
use crate::value::Value;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The closed set of tables that may be browsed or inserted into.
///
/// A table name only ever reaches SQL text through [`TableName::quoted`], so
/// caller-supplied names must first survive [`TableName::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    Branch,
    Vehicle,
    Employee,
    Driver,
    Clerk,
    ItSupport,
    Customer,
    Courier,
    DeliveryPartner,
    Feedback,
    Insurance,
    Payment,
    Promotion,
    CourierMapping,
    VehicleCityMapping,
    VehiclePromotionMapping,
    WorksOn,
}

impl TableName {
    /// Every browsable table, in the order they are offered to the user.
    pub const ALL: [TableName; 17] = [
        TableName::Branch,
        TableName::Vehicle,
        TableName::Employee,
        TableName::Driver,
        TableName::Clerk,
        TableName::ItSupport,
        TableName::Customer,
        TableName::Courier,
        TableName::DeliveryPartner,
        TableName::Feedback,
        TableName::Insurance,
        TableName::Payment,
        TableName::Promotion,
        TableName::CourierMapping,
        TableName::VehicleCityMapping,
        TableName::VehiclePromotionMapping,
        TableName::WorksOn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Branch => "branch",
            TableName::Vehicle => "vehicle",
            TableName::Employee => "employee",
            TableName::Driver => "driver",
            TableName::Clerk => "clerk",
            TableName::ItSupport => "it_support",
            TableName::Customer => "customer",
            TableName::Courier => "courier",
            TableName::DeliveryPartner => "delivery_partner",
            TableName::Feedback => "feedback",
            TableName::Insurance => "insurance",
            TableName::Payment => "payment",
            TableName::Promotion => "promotion",
            TableName::CourierMapping => "couriermapping",
            TableName::VehicleCityMapping => "vehiclecitymapping",
            TableName::VehiclePromotionMapping => "vehiclepromotionmapping",
            TableName::WorksOn => "works_on",
        }
    }

    /// The table as a quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.as_str())
    }
}

impl FromStr for TableName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TableName::ALL
            .into_iter()
            .find(|table| table.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownTable(s.to_string()))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TableName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The semantic type of a form field or report parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Text,
    Decimal,
    Date,
    Choice(&'static [&'static str]),
}

impl FieldType {
    /// Parses raw user input into a typed value.
    ///
    /// Input is trimmed first. Empty input is not handled here: whether an
    /// empty field is acceptable is the caller's decision.
    pub fn parse(&self, input: &str) -> Result<Value, CoreError> {
        let input = input.trim();
        let invalid = |expected: &'static str| CoreError::InvalidValue {
            expected,
            input: input.to_string(),
        };
        match self {
            FieldType::Integer => input
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid("integer")),
            FieldType::Decimal => Decimal::from_str(input)
                .map(Value::Decimal)
                .map_err(|_| invalid("decimal")),
            FieldType::Date => NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid("date (YYYY-MM-DD)")),
            FieldType::Text => Ok(Value::Text(input.to_string())),
            FieldType::Choice(options) => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(input))
                .map(|option| Value::Text(option.to_string()))
                .ok_or_else(|| CoreError::InvalidChoice {
                    input: input.to_string(),
                    options: options.join(", "),
                }),
        }
    }
}
