use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
