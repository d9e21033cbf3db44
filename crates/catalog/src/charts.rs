//! Chart definitions over catalog reports.
//!
//! Rendering is left to the presentation layer; this module only turns a
//! report's result into labelled numeric points.

use crate::ReportCatalog;
use crate::error::CatalogError;
use core_types::QueryResult;
use database::Gateway;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Bar {
        x: &'static str,
        y: &'static str,
        x_label: &'static str,
        y_label: &'static str,
    },
    Pie {
        names: &'static str,
        values: &'static str,
    },
    /// Nested categories, outermost first.
    Sunburst {
        path: &'static [&'static str],
        values: &'static str,
    },
}

impl ChartKind {
    fn label_columns(&self) -> Vec<&'static str> {
        match self {
            ChartKind::Bar { x, .. } => vec![*x],
            ChartKind::Pie { names, .. } => vec![*names],
            ChartKind::Sunburst { path, .. } => path.to_vec(),
        }
    }

    fn value_column(&self) -> &'static str {
        match self {
            ChartKind::Bar { y, .. } => *y,
            ChartKind::Pie { values, .. } | ChartKind::Sunburst { values, .. } => *values,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    /// Id of the catalog report that feeds the chart.
    pub report_id: &'static str,
    pub kind: ChartKind,
}

/// One data point: its category labels (one per label column) and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub labels: Vec<String>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    /// Extracts points from a report result. NULL values count as zero.
    pub fn extract(&self, result: &QueryResult) -> Result<Vec<ChartPoint>, CatalogError> {
        let column_index = |column: &str| {
            result
                .column_index(column)
                .ok_or_else(|| CatalogError::MissingColumn {
                    chart: self.id.to_string(),
                    column: column.to_string(),
                })
        };

        let label_indices = self
            .kind
            .label_columns()
            .into_iter()
            .map(|column| column_index(column))
            .collect::<Result<Vec<_>, _>>()?;
        let value_column = self.kind.value_column();
        let value_index = column_index(value_column)?;

        result
            .rows
            .iter()
            .map(|row| {
                let labels = label_indices.iter().map(|&i| row[i].label()).collect();
                let cell = &row[value_index];
                let value = if cell.is_null() {
                    0.0
                } else {
                    cell.as_f64().ok_or_else(|| CatalogError::NonNumeric {
                        chart: self.id.to_string(),
                        column: value_column.to_string(),
                        value: cell.to_string(),
                    })?
                };
                Ok(ChartPoint { labels, value })
            })
            .collect()
    }
}

pub(crate) fn builtin_charts() -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            id: "top-rated-drivers",
            title: "Top 5 Rated Drivers",
            report_id: "q04",
            kind: ChartKind::Bar { x: "name", y: "rating", x_label: "Driver Name", y_label: "Rating" },
        },
        ChartSpec {
            id: "branch-revenue",
            title: "Branch Revenue Analysis",
            report_id: "q12",
            kind: ChartKind::Bar { x: "city", y: "total_revenue", x_label: "City", y_label: "Total Revenue" },
        },
        ChartSpec {
            id: "courier-distribution",
            title: "Courier Distribution by Type and Status",
            report_id: "q15",
            kind: ChartKind::Sunburst { path: &["type", "status"], values: "courier_count" },
        },
        ChartSpec {
            id: "payment-methods",
            title: "Payment Methods Distribution",
            report_id: "q16",
            kind: ChartKind::Pie { names: "method", values: "cnt" },
        },
        ChartSpec {
            id: "profit-by-type",
            title: "Profit by Courier Type",
            report_id: "q18",
            kind: ChartKind::Bar { x: "type", y: "total_profit", x_label: "Courier Type", y_label: "Total Profit" },
        },
        ChartSpec {
            id: "delivery-time",
            title: "Average Delivery Time by Courier Type",
            report_id: "q19",
            kind: ChartKind::Bar { x: "type", y: "average_delivery_time", x_label: "Courier Type", y_label: "Days" },
        },
    ]
}

impl ReportCatalog {
    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    pub fn chart(&self, id: &str) -> Result<&ChartSpec, CatalogError> {
        self.charts
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CatalogError::ChartNotFound(id.to_string()))
    }

    /// Runs the chart's report with default parameters and extracts its points.
    pub async fn chart_data<G: Gateway + ?Sized>(
        &self,
        gateway: &mut G,
        id: &str,
    ) -> Result<ChartData, CatalogError> {
        let chart = self.chart(id)?;
        let report = self.report_by_id(chart.report_id)?;
        let statement = report.bind(&BTreeMap::new())?;
        tracing::info!(chart = chart.id, report = report.id, "Building chart data.");

        let result = gateway.execute_query(&statement).await?;
        Ok(ChartData {
            id: chart.id,
            title: chart.title,
            kind: chart.kind.clone(),
            points: chart.extract(&result)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Value;
    use database::MemoryGateway;
    use rust_decimal::Decimal;

    #[test]
    fn every_chart_points_at_an_existing_report() {
        let catalog = ReportCatalog::builtin();
        assert_eq!(catalog.charts().len(), 6);
        for chart in catalog.charts() {
            assert!(catalog.report_by_id(chart.report_id).is_ok(), "{}", chart.id);
        }
    }

    #[test]
    fn mixed_case_aliases_still_resolve() {
        let catalog = ReportCatalog::builtin();
        let chart = catalog.chart("branch-revenue").unwrap();
        let result = QueryResult::new(
            ["City", "Branch_ID", "Total_Revenue"],
            vec![
                vec![Value::from("Valsad"), Value::Integer(1), Value::Decimal(Decimal::from(7200))],
                vec![Value::from("Surat"), Value::Integer(2), Value::Null],
            ],
        );

        let points = chart.extract(&result).unwrap();
        assert_eq!(
            points,
            vec![
                ChartPoint { labels: vec!["Valsad".into()], value: 7200.0 },
                ChartPoint { labels: vec!["Surat".into()], value: 0.0 },
            ]
        );
    }

    #[test]
    fn sunburst_points_carry_the_full_path() {
        let catalog = ReportCatalog::builtin();
        let chart = catalog.chart("courier-distribution").unwrap();
        let result = QueryResult::new(
            ["type", "status", "courier_count"],
            vec![vec![Value::from("Parcel"), Value::from("Lost"), Value::Integer(3)]],
        );

        let points = chart.extract(&result).unwrap();
        assert_eq!(points[0].labels, vec!["Parcel", "Lost"]);
        assert_eq!(points[0].value, 3.0);
    }

    #[test]
    fn missing_and_non_numeric_columns_are_reported() {
        let catalog = ReportCatalog::builtin();
        let chart = catalog.chart("payment-methods").unwrap();

        let missing = QueryResult::new(["method"], vec![vec![Value::from("UPI")]]);
        assert!(matches!(
            chart.extract(&missing),
            Err(CatalogError::MissingColumn { column, .. }) if column == "cnt"
        ));

        let text = QueryResult::new(["method", "cnt"], vec![vec![Value::from("UPI"), Value::from("many")]]);
        assert!(matches!(chart.extract(&text), Err(CatalogError::NonNumeric { .. })));
    }

    #[tokio::test]
    async fn chart_data_runs_the_source_report() {
        let catalog = ReportCatalog::builtin();
        let report = catalog.report_by_id("q16").unwrap();
        let result = QueryResult::new(
            ["method", "cnt"],
            vec![
                vec![Value::from("UPI"), Value::Integer(9)],
                vec![Value::from("Cash"), Value::Integer(4)],
            ],
        );
        let mut gateway = MemoryGateway::new().with_result(report.statement.clone(), result);

        let data = catalog.chart_data(&mut gateway, "payment-methods").await.unwrap();
        assert_eq!(data.points.len(), 2);
        assert_eq!(data.points[1].labels, vec!["Cash"]);
        assert_eq!(gateway.queries().len(), 1);
    }

    #[tokio::test]
    async fn unknown_chart_is_not_found() {
        let mut gateway = MemoryGateway::new();
        let err = ReportCatalog::builtin()
            .chart_data(&mut gateway, "heatmap")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(gateway.queries().is_empty());
    }
}
