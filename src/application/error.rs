//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::application::document::DocumentError;
use crate::domain::{CatalogError, EditError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Edit(#[from] EditError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("document already exists: {0}")]
    DocumentExists(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
