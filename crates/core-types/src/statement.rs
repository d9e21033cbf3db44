use crate::enums::TableName;
use crate::value::Value;
use serde::Serialize;

/// SQL text plus the values bound to its `$n` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// One row to insert: target table, column list and the matching values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStatement {
    pub table: TableName,
    pub columns: Vec<&'static str>,
    pub values: Vec<Value>,
}

impl InsertStatement {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.columns.push(column);
        self.values.push(value.into());
        self
    }

    /// Renders the insert with quoted identifiers and one placeholder per value.
    pub fn to_statement(&self) -> Statement {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.values.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        Statement {
            sql: format!(
                "INSERT INTO {} ({columns}) VALUES ({placeholders})",
                self.table.quoted()
            ),
            params: self.values.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_renders_placeholders_not_values() {
        let insert = InsertStatement::new(TableName::Branch)
            .value("branch_id", 12_i64)
            .value("city", "Valsad'); DROP TABLE branch; --")
            .value("pincode", 396001_i64);
        let statement = insert.to_statement();
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "branch" ("branch_id", "city", "pincode") VALUES ($1, $2, $3)"#
        );
        assert_eq!(statement.params.len(), 3);
        assert!(!statement.sql.contains("DROP"));
    }
}
