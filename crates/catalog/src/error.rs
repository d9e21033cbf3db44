use core_types::CoreError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown report section '{0}'")]
    SectionNotFound(String),

    #[error("No report titled '{title}' in section '{section}'")]
    ReportNotFound { section: String, title: String },

    #[error("No report with id '{0}'")]
    ReportIdNotFound(String),

    #[error("Unknown chart '{0}'")]
    ChartNotFound(String),

    #[error("Report '{report}' has no parameter '{name}'")]
    UnknownParameter { report: String, name: String },

    #[error("Invalid value for parameter '{name}': {source}")]
    InvalidParameter {
        name: String,
        #[source]
        source: CoreError,
    },

    #[error("Chart '{chart}' needs column '{column}', which the report did not return")]
    MissingColumn { chart: String, column: String },

    #[error("Chart '{chart}' found non-numeric value '{value}' in column '{column}'")]
    NonNumeric {
        chart: String,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::SectionNotFound(_)
                | CatalogError::ReportNotFound { .. }
                | CatalogError::ReportIdNotFound(_)
                | CatalogError::ChartNotFound(_)
        )
    }
}
