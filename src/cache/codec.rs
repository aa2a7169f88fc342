use std::marker::PhantomData;

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use super::provider::CacheError;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode cache entry: {0}")]
    Encode(String),
    #[error("failed to decode cache entry: {0}")]
    Decode(String),
}

impl From<CodecError> for CacheError {
    fn from(err: CodecError) -> Self {
        CacheError::Codec(err.to_string())
    }
}

/// Converts entities to and from the opaque bytes stored in the cache.
pub trait EntityCodec<E>: Send + Sync {
    fn encode(&self, entity: &E) -> Result<Bytes, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<E, CodecError>;
}

pub struct JsonCodec<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E> JsonCodec<E> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E> Default for JsonCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EntityCodec<E> for JsonCodec<E>
where
    E: Serialize + DeserializeOwned,
{
    fn encode(&self, entity: &E) -> Result<Bytes, CodecError> {
        serde_json::to_vec(entity)
            .map(Bytes::from)
            .map_err(|err| CodecError::Encode(err.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<E, CodecError> {
        serde_json::from_slice(bytes).map_err(|err| CodecError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::domain::entities::PostRecord;

    #[test]
    fn json_codec_restores_post() {
        let post = PostRecord::new(
            Uuid::new_v4(),
            "Cached title".to_string(),
            "cached-title".to_string(),
            "body".to_string(),
            None,
            OffsetDateTime::now_utc(),
        );
        let codec = JsonCodec::<PostRecord>::new();

        let bytes = codec.encode(&post).expect("encode");
        assert_eq!(codec.decode(&bytes).expect("decode"), post);
    }

    #[test]
    fn corrupted_bytes_fail_to_decode() {
        let codec = JsonCodec::<PostRecord>::new();
        let err = codec.decode(b"{not json").expect_err("corrupted");
        assert!(matches!(err, CodecError::Decode(_)));
        assert!(matches!(CacheError::from(err), CacheError::Codec(_)));
    }
}
