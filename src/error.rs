use thiserror::Error;

pub type DorlingResult<T> = Result<T, DorlingError>;

#[derive(Debug, Error)]
pub enum DorlingError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("malformed statistics response: {0}")]
    DataFormat(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
