//! Encoding of option values into stored blobs

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct CodecError(#[from] serde_json::Error);

/// Converts option values to and from their stored representation.
///
/// `decode(encode(v))` must be value-equal to `v` for every [`Value`].
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError>;
}

/// Stores values as compact JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        Ok(serde_json::from_slice(raw)?)
    }
}

/// Wraps a codec and counts successful encode and decode calls.
#[derive(Debug, Default)]
pub struct CountingCodec<C = JsonCodec> {
    inner: C,
    encodes: AtomicUsize,
    decodes: AtomicUsize,
}

impl<C: Codec> CountingCodec<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            encodes: AtomicUsize::new(0),
            decodes: AtomicUsize::new(0),
        }
    }

    pub fn encodes(&self) -> usize {
        self.encodes.load(Ordering::Relaxed)
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.encodes.store(0, Ordering::Relaxed);
        self.decodes.store(0, Ordering::Relaxed);
    }
}

impl<C: Codec> Codec for CountingCodec<C> {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let raw = self.inner.encode(value)?;
        self.encodes.fetch_add(1, Ordering::Relaxed);
        Ok(raw)
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        let value = self.inner.decode(raw)?;
        self.decodes.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }
}
