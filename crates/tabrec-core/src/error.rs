use thiserror::Error as ThisError;

///
/// Error
///
/// Umbrella error for the record core. All failures are synchronous and
/// deterministic; callers fix the schema or the usage rather than retry.
///

#[derive(Debug, ThisError, Eq, PartialEq)]
#[remain::sorted]
pub enum Error {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

///
/// SchemaError
/// Raised at schema build time.
///

#[derive(Debug, ThisError, Eq, PartialEq)]
pub enum SchemaError {
    #[error("duplicate field declaration on schema '{schema}': '{name}'")]
    DuplicateFieldDeclaration {
        schema: &'static str,
        name: &'static str,
    },
}

///
/// ContainerError
/// Raised by instance field access.
///

#[derive(Debug, ThisError, Eq, PartialEq)]
pub enum ContainerError {
    #[error("unknown field '{name}' on container '{container}'")]
    UnknownField {
        container: &'static str,
        name: String,
    },
}

///
/// ConvertError
/// Raised by dict conversion; `to_dict` never returns a partial mapping.
///

#[derive(Debug, ThisError, Eq, PartialEq)]
#[remain::sorted]
pub enum ConvertError {
    #[error("duplicate column name after flattening: '{column}'")]
    DuplicateColumn { column: String },

    #[error("column '{column}' holds an unsupported value shape: {kind}")]
    UnsupportedValue {
        column: String,
        kind: &'static str,
    },
}
