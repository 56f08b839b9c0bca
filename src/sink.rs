//! Kinesis sink: converts written chunks into stream records and submits
//! them via `PutRecord` (single write) or `PutRecords` (batched write).
//!
//! Every record emitted by one sink instance carries the same stream name
//! and partition key, fixed at build time. The host that drives the sink is
//! expected to serialize calls; each write resolves fully before the next
//! one is dispatched, which is what makes the backpressure contract hold.

use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use bytes::Bytes;

use crate::client::{KinesisClientConfig, create_kinesis_client};
use crate::{Error, Result};

/// Configuration for the Kinesis sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinesisSinkConfig {
    /// Name of the target Kinesis data stream
    pub stream_name: String,
    /// Partition key applied to every record written through this sink.
    /// Required, but may be the empty string.
    pub partition_key: String,
    /// Emit the full service response as a trace after each successful call
    pub debug: bool,
    /// Fail a batched write when the service accepts the call but rejects
    /// individual records. Off by default: a successful `PutRecords` call
    /// completes the write even if the response embeds per-record failures.
    pub fail_on_partial_batch: bool,
}

/// How a chunk's bytes are coerced into record text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// Strict UTF-8; a chunk with invalid bytes fails the write before any
    /// network call is made.
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD.
    #[default]
    Utf8Lossy,
}

/// A unit of data written to the sink, with its per-chunk encoding hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub data: Bytes,
    pub encoding: TextEncoding,
}

impl Chunk {
    fn into_text(self) -> Result<String> {
        match self.encoding {
            TextEncoding::Utf8 => String::from_utf8(self.data.to_vec())
                .map_err(|e| Error::InvalidPayload(format!("chunk is not valid UTF-8: {e}"))),
            TextEncoding::Utf8Lossy => Ok(String::from_utf8_lossy(&self.data).into_owned()),
        }
    }
}

impl From<&str> for Chunk {
    fn from(data: &str) -> Self {
        Chunk {
            data: Bytes::copy_from_slice(data.as_bytes()),
            encoding: TextEncoding::default(),
        }
    }
}

impl From<String> for Chunk {
    fn from(data: String) -> Self {
        Chunk {
            data: Bytes::from(data),
            encoding: TextEncoding::default(),
        }
    }
}

impl From<Bytes> for Chunk {
    fn from(data: Bytes) -> Self {
        Chunk {
            data,
            encoding: TextEncoding::default(),
        }
    }
}

/// Write interface invoked by a host runtime. `&mut self` keeps at most one
/// submission in flight per sink; the completion of each call is the signal
/// that the next write may be dispatched.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Write a single chunk as one record.
    async fn write_one(&mut self, chunk: Chunk) -> Result<()>;

    /// Write a coalesced, ordered set of chunks as one batch call.
    async fn write_batch(&mut self, chunks: Vec<Chunk>) -> Result<()>;
}

/// Main Kinesis sink that handles submitting records to a data stream.
#[derive(Clone, Debug)]
pub struct KinesisSink {
    client: Client,
    stream_name: String,
    partition_key: String,
    debug: bool,
    fail_on_partial_batch: bool,
}

/// Builder for creating and configuring a Kinesis sink.
#[derive(Clone, Default)]
pub struct KinesisSinkBuilder {
    config: KinesisSinkConfig,
    client_config: KinesisClientConfig,
    client: Option<Client>,
}

impl KinesisSinkBuilder {
    pub fn new(config: KinesisSinkConfig) -> Self {
        KinesisSinkBuilder {
            config,
            client_config: KinesisClientConfig::default(),
            client: None,
        }
    }

    pub fn config(mut self, config: KinesisSinkConfig) -> Self {
        self.config = config;
        self
    }

    /// Client construction settings, used only when no client is injected.
    pub fn client_config(mut self, client_config: KinesisClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    /// Injects a pre-built client. The handle is cheap to clone; the caller
    /// may keep its own copy.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validates the configuration, then verifies the target stream exists
    /// before returning a usable sink.
    pub async fn build(self) -> Result<KinesisSink> {
        if self.config.stream_name.is_empty() {
            return Err(Error::InvalidConfig(
                "stream name must not be empty".to_string(),
            ));
        }

        let client = match self.client {
            Some(client) => client,
            None => create_kinesis_client(self.client_config).await?,
        };

        client
            .describe_stream_summary()
            .stream_name(&self.config.stream_name)
            .send()
            .await
            .map_err(|err| Error::Kinesis(Box::new(err.into())))?;

        tracing::info!(
            stream_name = self.config.stream_name.clone(),
            "Kinesis stream found"
        );

        Ok(KinesisSink {
            client,
            stream_name: self.config.stream_name,
            partition_key: self.config.partition_key,
            debug: self.config.debug,
            fail_on_partial_batch: self.config.fail_on_partial_batch,
        })
    }
}

impl KinesisSink {
    /// Submits one record carrying the chunk's text, the sink's partition
    /// key, and the sink's stream name.
    ///
    /// The service error, if any, is passed through unmodified; there is no
    /// retry at this layer.
    pub async fn write_one(&mut self, chunk: Chunk) -> Result<()> {
        let data = chunk.into_text()?;

        let output = self
            .client
            .put_record()
            .stream_name(&self.stream_name)
            .partition_key(&self.partition_key)
            .data(Blob::new(data.into_bytes()))
            .send()
            .await
            .map_err(|err| Error::Kinesis(Box::new(err.into())))?;

        if self.debug {
            tracing::debug!(response = ?output, "put_record response");
        }

        Ok(())
    }

    /// Submits all chunks as a single `PutRecords` call, preserving input
    /// order. The stream name is set once on the request; every entry gets
    /// the sink's partition key.
    ///
    /// A successful call completes the write even when the response reports
    /// per-record failures, unless `fail_on_partial_batch` is set.
    pub async fn write_batch(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let total = chunks.len();
        let mut entries = Vec::with_capacity(total);
        for chunk in chunks {
            let data = chunk.into_text()?;
            let entry = PutRecordsRequestEntry::builder()
                .data(Blob::new(data.into_bytes()))
                .partition_key(self.partition_key.clone())
                .build()
                .map_err(|e| Error::Other(format!("Failed to build record entry: {e}")))?;
            entries.push(entry);
        }

        // on error, the caller is expected to halt the stream; no replay of
        // the failed batch happens here.
        let output = self
            .client
            .put_records()
            .stream_name(&self.stream_name)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|err| Error::Kinesis(Box::new(err.into())))?;

        if self.debug {
            tracing::debug!(response = ?output, "put_records response");
        }

        let failed = output.failed_record_count().unwrap_or_default().max(0) as usize;
        if failed > 0 {
            tracing::warn!(failed, total, "put_records reported per-record failures");
            if self.fail_on_partial_batch {
                return Err(Error::PartialBatchFailure { failed, total });
            }
        }

        Ok(())
    }
}

impl RecordSink for KinesisSink {
    async fn write_one(&mut self, chunk: Chunk) -> Result<()> {
        KinesisSink::write_one(self, chunk).await
    }

    async fn write_batch(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        KinesisSink::write_batch(self, chunks).await
    }
}
