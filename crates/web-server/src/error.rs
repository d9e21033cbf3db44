use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use browser::BrowseError;
use catalog::error::CatalogError;
use database::DbError;
use forms::FormError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Browse(#[from] BrowseError),
    #[error(transparent)]
    Form(#[from] FormError),
}

fn database_status(err: &DbError) -> StatusCode {
    match err {
        DbError::ConnectionConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DbError::ConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
        DbError::QueryError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DbError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(err)
            | AppError::Catalog(CatalogError::Database(err))
            | AppError::Browse(BrowseError::Database(err))
            | AppError::Form(FormError::Database(err)) => database_status(err),
            AppError::Catalog(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Catalog(CatalogError::MissingColumn { .. } | CatalogError::NonNumeric { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Catalog(_) => StatusCode::BAD_REQUEST,
            AppError::Browse(_) => StatusCode::BAD_REQUEST,
            AppError::Form(FormError::UnknownEntity(_)) => StatusCode::NOT_FOUND,
            AppError::Form(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed.");
        } else {
            tracing::warn!(error = %self, "Request rejected.");
        }

        let body = match &self {
            AppError::Form(err @ FormError::Validation { .. }) => {
                json!({ "error": err.to_string(), "violations": err.violations() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CoreError;

    #[test]
    fn database_failures_map_by_kind() {
        let cases = [
            (DbError::ConnectionError("refused".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DbError::QueryError("syntax".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (DbError::TimeoutError("slow".into()), StatusCode::GATEWAY_TIMEOUT),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err.clone()).status(), status);
            assert_eq!(AppError::from(CatalogError::Database(err)).status(), status);
        }
    }

    #[test]
    fn lookups_and_input_problems_are_client_errors() {
        assert_eq!(
            AppError::from(CatalogError::SectionNotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CatalogError::UnknownParameter { report: "q01".into(), name: "x".into() }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(BrowseError::UnknownTable(CoreError::UnknownTable("pg_user".into()))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(FormError::UnknownEntity("courier".into())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
