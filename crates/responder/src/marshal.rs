//! Strategies turning structured bodies into bytes.
//!
//! [`StandardJson`] is the default. [`FastestJson`] writes straight into a buffer sized from
//! the previous output, and produces the same JSON text.

use crate::body::StructuredValue;
use crate::error::BoxError;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serializes a structured value into the response body.
pub trait Marshal: Send + Sync {
    fn marshal(&self, value: &StructuredValue) -> Result<Bytes, BoxError>;
}

/// JSON through [`serde_json::to_vec`].
#[derive(Debug, Default, Copy, Clone)]
pub struct StandardJson;

impl Marshal for StandardJson {
    fn marshal(&self, value: &StructuredValue) -> Result<Bytes, BoxError> {
        let json = serde_json::to_vec(value)?;
        Ok(Bytes::from(json))
    }
}

const MIN_CAPACITY: usize = 128;
const MAX_CAPACITY: usize = 64 * 1024;

/// JSON written into a [`BytesMut`] pre-sized with the length of the last output.
///
/// The size hint is capped at 64 KiB, and an output much shorter than its buffer is copied out
/// so a large response never pins memory for the small ones after it.
#[derive(Debug, Default)]
pub struct FastestJson {
    size_hint: AtomicUsize,
}

impl FastestJson {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Marshal for FastestJson {
    fn marshal(&self, value: &StructuredValue) -> Result<Bytes, BoxError> {
        // relaxed: the hint only sizes the buffer, any stale value is fine
        let capacity = self.size_hint.load(Ordering::Relaxed).clamp(MIN_CAPACITY, MAX_CAPACITY);
        let mut writer = BytesMut::with_capacity(capacity).writer();
        serde_json::to_writer(&mut writer, value)?;

        let buf = writer.into_inner();
        self.size_hint.store(buf.len().min(MAX_CAPACITY), Ordering::Relaxed);
        Ok(shrink(buf))
    }
}

fn shrink(buf: BytesMut) -> Bytes {
    if buf.capacity() > MIN_CAPACITY && buf.capacity() / 2 > buf.len() {
        Bytes::copy_from_slice(&buf)
    } else {
        buf.freeze()
    }
}

/// A [`Marshal`] backed by a closure.
pub struct MarshalFn<F> {
    f: F,
}

impl<F> fmt::Debug for MarshalFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshalFn").finish_non_exhaustive()
    }
}

pub fn marshal_fn<F>(f: F) -> MarshalFn<F>
where
    F: Fn(&StructuredValue) -> Result<Bytes, BoxError> + Send + Sync,
{
    MarshalFn { f }
}

impl<F> Marshal for MarshalFn<F>
where
    F: Fn(&StructuredValue) -> Result<Bytes, BoxError> + Send + Sync,
{
    fn marshal(&self, value: &StructuredValue) -> Result<Bytes, BoxError> {
        (self.f)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{FastestJson, MAX_CAPACITY, Marshal, StandardJson, marshal_fn};
    use crate::body::StructuredValue;
    use bytes::Bytes;
    use serde::Serialize;
    use std::collections::BTreeMap;
    use std::sync::atomic::Ordering;

    #[derive(Serialize)]
    struct HelloWorld {
        content: String,
        size: u32,
        price: f32,
        vip: bool,
    }

    fn hello_world() -> HelloWorld {
        HelloWorld { content: "花褪残红青杏小。燕子飞时，绿水人家绕。".repeat(20), size: 100, price: 10.12, vip: true }
    }

    #[test]
    fn test_fastest_matches_standard() {
        let value = hello_world();
        let standard = StandardJson.marshal(&value).unwrap();

        let fastest = FastestJson::new();
        // the second call runs with a warmed size hint
        assert_eq!(fastest.marshal(&value).unwrap(), standard);
        assert_eq!(fastest.marshal(&value).unwrap(), standard);
    }

    #[test]
    fn test_fastest_small_after_large() {
        let fastest = FastestJson::new();
        let large = "a".repeat(8 * 1024 * 1024);
        assert_eq!(fastest.marshal(&large).unwrap().len(), large.len() + 2);
        assert_eq!(fastest.size_hint.load(Ordering::Relaxed), MAX_CAPACITY);

        let small = fastest.marshal(&"ok").unwrap();
        assert_eq!(small, r#""ok""#);
        assert_eq!(fastest.size_hint.load(Ordering::Relaxed), 4);

        // the oversized buffer is copied out, not frozen
        let small = small.try_into_mut().unwrap();
        assert!(small.capacity() < 1024);
    }

    #[test]
    fn test_marshal_error() {
        let mut map = BTreeMap::new();
        map.insert(vec![1_u8], "value");

        let e = StandardJson.marshal(&map).unwrap_err();
        assert_eq!(e.to_string(), "key must be a string");
        let e = FastestJson::new().marshal(&map).unwrap_err();
        assert_eq!(e.to_string(), "key must be a string");
    }

    #[test]
    fn test_marshal_fn() {
        let upper = marshal_fn(|value: &StructuredValue| {
            let json = serde_json::to_string(value)?;
            Ok(Bytes::from(json.to_uppercase()))
        });
        assert_eq!(upper.marshal(&"abc").unwrap(), r#""ABC""#);
    }
}
