//! Relational division: "which entities relate to *all* values of a set".
//!
//! Every candidate is paired with every divisor value (a cross join); the
//! pairs that actually exist are subtracted (`EXCEPT`). Whatever remains is a
//! pair the candidate is missing, so a candidate qualifies exactly when
//! nothing remains for it.

use core_types::TableName;
use std::collections::BTreeSet;

/// The four ingredients of a division report.
///
/// Each query is a plain `SELECT` whose columns are positional:
/// `candidates` yields one column (the entity), `divisor` one column (the
/// value every entity must cover), and `pairs` two columns (entity, value).
#[derive(Debug, Clone, Copy)]
pub struct Division {
    /// Table whose full rows are returned for qualifying entities.
    pub result_table: TableName,
    /// Column of `result_table` holding the entity key.
    pub result_key: &'static str,
    pub candidates: &'static str,
    pub divisor: &'static str,
    pub pairs: &'static str,
}

impl Division {
    /// Renders the division as a single statement.
    pub fn to_sql(&self) -> String {
        // NOT EXISTS rather than NOT IN: a NULL entity in the remainder must not
        // disqualify every other candidate.
        format!(
            "SELECT *
FROM {table}
WHERE \"{key}\" IN (
    SELECT c.entity
    FROM ({candidates}) AS c(entity)
    WHERE NOT EXISTS (
        SELECT 1
        FROM (
            SELECT every.entity, d.value
            FROM ({candidates}) AS every(entity)
            CROSS JOIN ({divisor}) AS d(value)
            EXCEPT
            SELECT p.entity, p.value
            FROM ({pairs}) AS p(entity, value)
        ) AS missing
        WHERE missing.entity = c.entity
    )
)",
            table = self.result_table.quoted(),
            key = self.result_key,
            candidates = self.candidates,
            divisor = self.divisor,
            pairs = self.pairs,
        )
    }
}

/// Evaluates the same set algebra in memory.
///
/// Returns the candidates (deduplicated, in ascending order) for which
/// `candidates × divisor − pairs` has no row.
pub fn evaluate<K, V>(candidates: &[K], divisor: &[V], pairs: &[(K, V)]) -> Vec<K>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    let candidates: BTreeSet<&K> = candidates.iter().collect();
    let divisor: BTreeSet<&V> = divisor.iter().collect();
    let actual: BTreeSet<(&K, &V)> = pairs.iter().map(|(k, v)| (k, v)).collect();

    let missing: BTreeSet<&K> = candidates
        .iter()
        .flat_map(|k| divisor.iter().map(move |v| (*k, *v)))
        .filter(|pair| !actual.contains(pair))
        .map(|(k, _)| k)
        .collect();

    candidates
        .into_iter()
        .filter(|k| !missing.contains(k))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_driver_covering_every_type_qualifies() {
        let drivers = ["A", "B"];
        let types = ["Document", "Parcel", "Fragile"];
        let pairs = [
            ("A", "Document"),
            ("A", "Parcel"),
            ("A", "Fragile"),
            ("B", "Document"),
            ("B", "Parcel"),
        ];
        assert_eq!(evaluate(&drivers, &types, &pairs), vec!["A"]);
    }

    #[test]
    fn duplicate_pairs_do_not_change_the_answer() {
        let pairs = [(1, 'x'), (1, 'x'), (1, 'y'), (2, 'y'), (2, 'y')];
        assert_eq!(evaluate(&[1, 2], &['x', 'y'], &pairs), vec![1]);
    }

    #[test]
    fn pairs_outside_the_divisor_are_irrelevant() {
        let pairs = [(1, 'x'), (1, 'z'), (2, 'z')];
        assert_eq!(evaluate(&[1, 2], &['x'], &pairs), vec![1]);
    }

    #[test]
    fn empty_divisor_is_covered_by_everyone() {
        let none: [char; 0] = [];
        assert_eq!(evaluate(&[2, 1], &none, &[]), vec![1, 2]);
    }

    #[test]
    fn sql_subtracts_actual_pairs_from_the_cross_join() {
        let division = Division {
            result_table: TableName::Employee,
            result_key: "employee_id",
            candidates: "SELECT id FROM driver",
            divisor: "SELECT DISTINCT type FROM courier",
            pairs: "SELECT d.id, c.type FROM driver d JOIN courier c ON d.vehicle_id = c.vehicle_id",
        };
        let sql = division.to_sql();
        assert!(sql.starts_with("SELECT *\nFROM \"employee\"\nWHERE \"employee_id\" IN ("));
        let cross = sql.find("CROSS JOIN (SELECT DISTINCT type FROM courier)").unwrap();
        let except = sql.find("EXCEPT").unwrap();
        assert!(cross < except);
        assert!(sql.contains("FROM (SELECT d.id, c.type FROM driver d JOIN courier c"));
    }
}
