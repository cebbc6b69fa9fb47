use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnprotoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Descriptor decode error: {0}")]
    DecodeError(String),

    #[error("Structural error: {0}")]
    StructuralError(String),
}
