use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("'{0}' is not a browsable table")]
    UnknownTable(String),

    #[error("Invalid {expected} value '{input}'")]
    InvalidValue { expected: &'static str, input: String },

    #[error("'{input}' is not one of: {options}")]
    InvalidChoice { input: String, options: String },
}
