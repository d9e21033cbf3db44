//! # Report Catalog
//!
//! An ordered, read-only registry of the predefined analytical reports,
//! grouped into sections, plus the chart definitions built on top of them.
//!
//! The catalog is built once per process ([`ReportCatalog::global`]) and never
//! mutated. Lookups fail with a not-found error *before* any statement reaches
//! the database gateway.

use crate::error::CatalogError;
use core_types::{FieldType, QueryResult, Statement, Value};
use database::Gateway;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub mod charts;
pub mod division;
pub mod error;
pub mod reports;

pub use charts::{ChartData, ChartKind, ChartPoint, ChartSpec};
pub use division::Division;

/// A named, typed placeholder of a report statement.
#[derive(Debug, Clone, Serialize)]
pub struct ReportParam {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub default: Value,
}

/// One predefined report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDefinition {
    pub id: &'static str,
    pub section: &'static str,
    pub title: &'static str,
    /// SQL text. Parameter `n` of `params` binds to placeholder `$n+1`.
    pub statement: String,
    pub params: Vec<ReportParam>,
}

impl ReportDefinition {
    pub fn new(
        id: &'static str,
        section: &'static str,
        title: &'static str,
        statement: impl Into<String>,
    ) -> Self {
        Self {
            id,
            section,
            title,
            statement: statement.into(),
            params: Vec::new(),
        }
    }

    pub fn param(
        mut self,
        name: &'static str,
        label: &'static str,
        field_type: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        self.params.push(ReportParam {
            name,
            label,
            field_type,
            default: default.into(),
        });
        self
    }

    /// The statement bound with every parameter at its default, for showing
    /// a report's SQL without running it.
    pub fn describe(&self) -> Statement {
        self.params
            .iter()
            .fold(Statement::new(self.statement.clone()), |statement, param| {
                statement.bind(param.default.clone())
            })
    }

    /// Builds the bound statement, using defaults for every parameter not
    /// overridden. Override values are parsed by the parameter's type.
    pub fn bind(&self, overrides: &BTreeMap<String, String>) -> Result<Statement, CatalogError> {
        if let Some(unknown) = overrides
            .keys()
            .find(|name| !self.params.iter().any(|p| p.name == name.as_str()))
        {
            return Err(CatalogError::UnknownParameter {
                report: self.id.to_string(),
                name: unknown.clone(),
            });
        }

        let mut statement = Statement::new(self.statement.clone());
        for param in &self.params {
            let value = match overrides.get(param.name) {
                Some(raw) => param.field_type.parse(raw).map_err(|source| {
                    CatalogError::InvalidParameter {
                        name: param.name.to_string(),
                        source,
                    }
                })?,
                None => param.default.clone(),
            };
            statement = statement.bind(value);
        }
        Ok(statement)
    }
}

/// A named group of reports, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub name: &'static str,
    pub reports: Vec<ReportDefinition>,
}

impl ReportSection {
    pub fn new(name: &'static str, reports: Vec<ReportDefinition>) -> Self {
        Self { name, reports }
    }
}

/// The full, ordered report catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ReportCatalog {
    sections: Vec<ReportSection>,
    charts: Vec<ChartSpec>,
}

static CATALOG: OnceLock<ReportCatalog> = OnceLock::new();

impl ReportCatalog {
    /// Builds the built-in catalog.
    pub fn builtin() -> Self {
        Self {
            sections: reports::builtin_sections(),
            charts: charts::builtin_charts(),
        }
    }

    /// The process-wide catalog, built on first use.
    pub fn global() -> &'static ReportCatalog {
        CATALOG.get_or_init(Self::builtin)
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    /// Section names, in catalog order.
    pub fn list_sections(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name).collect()
    }

    pub fn section(&self, name: &str) -> Result<&ReportSection, CatalogError> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CatalogError::SectionNotFound(name.to_string()))
    }

    /// Report titles of one section, in catalog order.
    pub fn list_reports(&self, section: &str) -> Result<Vec<&'static str>, CatalogError> {
        Ok(self.section(section)?.reports.iter().map(|r| r.title).collect())
    }

    pub fn report(&self, section: &str, title: &str) -> Result<&ReportDefinition, CatalogError> {
        self.section(section)?
            .reports
            .iter()
            .find(|r| r.title == title)
            .ok_or_else(|| CatalogError::ReportNotFound {
                section: section.to_string(),
                title: title.to_string(),
            })
    }

    pub fn report_by_id(&self, id: &str) -> Result<&ReportDefinition, CatalogError> {
        self.sections
            .iter()
            .flat_map(|s| s.reports.iter())
            .find(|r| r.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CatalogError::ReportIdNotFound(id.to_string()))
    }

    /// Runs a report with its default parameters.
    pub async fn run_report<G: Gateway + ?Sized>(
        &self,
        gateway: &mut G,
        section: &str,
        title: &str,
    ) -> Result<QueryResult, CatalogError> {
        self.run_report_with(gateway, section, title, &BTreeMap::new()).await
    }

    /// Runs a report, overriding some of its parameters with raw user input.
    pub async fn run_report_with<G: Gateway + ?Sized>(
        &self,
        gateway: &mut G,
        section: &str,
        title: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<QueryResult, CatalogError> {
        let report = self.report(section, title)?;
        let statement = report.bind(overrides)?;
        tracing::info!(report = report.id, params = statement.params.len(), "Running report.");
        Ok(gateway.execute_query(&statement).await?)
    }
}
