//! Shared error types for the manuscript tracking system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Invalid source id: {input}")]
    InvalidSourceId { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
