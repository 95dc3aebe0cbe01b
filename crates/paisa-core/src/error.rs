//! Error types for Paisa

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Insufficient history: {found} month(s) supplied, at least {required} required")]
    InsufficientHistory { found: usize, required: usize },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
