//! Terminal and JSON output for the CLI.

use catalog::{ChartData, ChartKind, ChartSpec, ReportDefinition};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::{FieldType, QueryResult, Statement};
use forms::{EntitySchema, FieldSpec};
use serde::Serialize;

fn table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn result(result: &QueryResult) {
    if result.columns.is_empty() {
        println!("(statement returned no columns)");
        return;
    }
    let mut out = table(result.columns.clone());
    for row in &result.rows {
        out.add_row(row.iter().map(ToString::to_string).collect::<Vec<_>>());
    }
    println!("{out}");
    println!("{} row(s)", result.len());
}

pub fn list<S: AsRef<str>>(items: &[S]) {
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, item.as_ref());
    }
}

pub fn statement(statement: &Statement) {
    println!("{}", statement.sql);
    for (i, param) in statement.params.iter().enumerate() {
        println!("  ${} = {}", i + 1, param);
    }
    println!();
}

pub fn report_header(report: &ReportDefinition) {
    println!("[{}] {}", report.id, report.title);
}

fn type_name(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Integer => "integer".to_string(),
        FieldType::Text => "text".to_string(),
        FieldType::Decimal => "decimal".to_string(),
        FieldType::Date => "date (YYYY-MM-DD)".to_string(),
        FieldType::Choice(options) => format!("one of {}", options.join(", ")),
    }
}

fn range(field: &FieldSpec) -> String {
    match (field.min, field.max) {
        (Some(min), Some(max)) => format!("{min} to {max}"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => String::new(),
    }
}

fn field_rows(out: &mut Table, scope: &str, fields: &[FieldSpec]) {
    for field in fields {
        out.add_row(vec![
            field.name.to_string(),
            field.label.to_string(),
            type_name(&field.field_type),
            if field.required { "yes" } else { "no" }.to_string(),
            range(field),
            scope.to_string(),
        ]);
    }
}

pub fn schemas(schemas: &[EntitySchema]) {
    for schema in schemas {
        println!("{} (table {})", schema.kind, schema.table);
        let mut out = table(
            ["field", "label", "type", "required", "range", "applies to"]
                .map(String::from)
                .to_vec(),
        );
        field_rows(&mut out, "all", &schema.fields);
        for role in &schema.roles {
            field_rows(&mut out, role.role.as_str(), &role.fields);
        }
        println!("{out}");
    }
}

fn kind_name(kind: &ChartKind) -> &'static str {
    match kind {
        ChartKind::Bar { .. } => "bar",
        ChartKind::Pie { .. } => "pie",
        ChartKind::Sunburst { .. } => "sunburst",
    }
}

pub fn charts(charts: &[ChartSpec]) {
    let mut out = table(["id", "title", "kind", "report"].map(String::from).to_vec());
    for chart in charts {
        out.add_row(vec![
            chart.id.to_string(),
            chart.title.to_string(),
            kind_name(&chart.kind).to_string(),
            chart.report_id.to_string(),
        ]);
    }
    println!("{out}");
}

pub fn chart(data: &ChartData) {
    println!("{} ({})", data.title, kind_name(&data.kind));
    let mut out = table(vec!["category".to_string(), "value".to_string()]);
    for point in &data.points {
        out.add_row(vec![point.labels.join(" / "), point.value.to_string()]);
    }
    println!("{out}");
}
