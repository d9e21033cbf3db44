use crate::value::Value;
use serde::Serialize;

/// A generic tabular result whose shape is discovered from the statement
/// that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Builds a result, folding every column name to lowercase.
    ///
    /// Report aliases such as `Total_Revenue` are therefore always addressed
    /// as `total_revenue`, whatever casing the statement used.
    pub fn new<C, S>(columns: C, rows: Vec<Vec<Value>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
            rows,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_are_normalized() {
        let result = QueryResult::new(["City", "Branch_ID", "Total_Revenue"], vec![]);
        assert_eq!(result.columns, vec!["city", "branch_id", "total_revenue"]);
        assert_eq!(result.column_index("TOTAL_REVENUE"), Some(2));
        assert!(result.is_empty());
    }

    #[test]
    fn column_extracts_values_in_row_order() {
        let result = QueryResult::new(
            ["method", "cnt"],
            vec![
                vec![Value::from("UPI"), Value::Integer(9)],
                vec![Value::from("Cash"), Value::Integer(4)],
            ],
        );
        let counts = result.column("cnt").unwrap();
        assert_eq!(counts, vec![&Value::Integer(9), &Value::Integer(4)]);
        assert!(result.column("missing").is_none());
    }
}
