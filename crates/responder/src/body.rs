use crate::error::BoxError;
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use serde::Serialize;
use std::fmt;

/// A structured value waiting to be marshaled.
pub type StructuredValue = dyn erased_serde::Serialize + Send + Sync;

/// The value produced by upstream handlers, before finalization.
#[derive(Default)]
pub enum Body {
    #[default]
    Absent,
    Text(String),
    Bytes(Bytes),
    Stream(UnsyncBoxBody<Bytes, BoxError>),
    Structured(Box<StructuredValue>),
}

impl Body {
    /// Wraps any serializable value, it will be marshaled by the responder.
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::Structured(Box::new(value))
    }

    pub fn stream<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self::Stream(UnsyncBoxBody::new(body.map_err(Into::into)))
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[inline]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Structured(_) => f.write_str("Structured(..)"),
        }
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<&'static [u8]> for Body {
    fn from(value: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(value))
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Self::Absent
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(option: Option<T>) -> Self {
        option.map_or(Self::Absent, Into::into)
    }
}

/// The body handed to the transport once the response is finalized.
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;
