//! Sink connector for writing records to an AWS Kinesis data stream.
//!
//! This crate adapts a push-based, backpressure-aware write interface onto
//! the Kinesis ingestion API, with a focus on:
//! - One-at-a-time and batched record submission (`PutRecord`/`PutRecords`)
//! - Error propagation and handling for AWS SDK errors
//! - A fixed stream name and partition key per sink instance

pub mod client;
pub mod sink;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the Kinesis sink library.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed with Kinesis error - {0}")]
    Kinesis(Box<aws_sdk_kinesis::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Batch partially failed. {failed} of {total} records were rejected")]
    PartialBatchFailure { failed: usize, total: usize },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

// boxed: the SDK error enum is large
impl From<aws_sdk_kinesis::Error> for Error {
    fn from(value: aws_sdk_kinesis::Error) -> Self {
        Error::Kinesis(Box::new(value))
    }
}
