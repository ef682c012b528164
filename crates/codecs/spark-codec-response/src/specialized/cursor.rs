//! 游标分页集合。
//!
//! `CacheKeyIteratorResult` 与 `EntriesWithCursor` 共享“游标 + 本批元素”的布局。
//! 游标是服务端给出的不透明续读位置，本层只负责原样往返，不解释其含义。

use bytes::Bytes;

use crate::catalog;
use crate::decoder;
use crate::encoder;
use crate::error::CodecError;
use crate::schema::MessageDescriptor;
use crate::specialized::Fields;
use crate::types::Value;
use crate::version::ProtocolVersion;

/// 一批分页结果。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CursorPage<T> {
    /// 续读游标，下一次请求原样带回。
    pub cursor: i32,
    /// 本批元素，保持线上顺序。
    pub items: Vec<T>,
}

/// 缓存键迭代批次。
pub type KeyPage = CursorPage<Bytes>;
/// 条目迭代批次。
pub type EntryPage = CursorPage<(Bytes, Bytes)>;

fn encode_with(
    descriptor: &MessageDescriptor,
    values: Vec<Value>,
    negotiated: ProtocolVersion,
) -> Result<Bytes, CodecError> {
    encoder::encode(descriptor, &values, negotiated)
}

impl CursorPage<Bytes> {
    /// 转为 `CacheKeyIteratorResult` 的值元组。
    pub fn to_values(&self) -> Vec<Value> {
        vec![Value::Int32(self.cursor), self.items.clone().into()]
    }

    /// 由 `CacheKeyIteratorResult` 的值元组构造。
    pub fn from_values(values: Vec<Value>) -> Result<Self, CodecError> {
        let mut fields = Fields::new(&catalog::CACHE_KEY_ITERATOR_RESULT, values)?;
        Ok(Self {
            cursor: fields.take()?,
            items: fields.take()?,
        })
    }

    /// 编码为 `CacheKeyIteratorResult`。
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<Bytes, CodecError> {
        encode_with(&catalog::CACHE_KEY_ITERATOR_RESULT, self.to_values(), negotiated)
    }

    /// 解码 `CacheKeyIteratorResult`。
    pub fn decode(bytes: Bytes, negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Self::from_values(decoder::decode(
            &catalog::CACHE_KEY_ITERATOR_RESULT,
            bytes,
            negotiated,
        )?)
    }
}

impl CursorPage<(Bytes, Bytes)> {
    /// 转为 `EntriesWithCursor` 的值元组。
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int32(self.cursor),
            Value::pair_list(self.items.iter().cloned()),
        ]
    }

    /// 由 `EntriesWithCursor` 的值元组构造。
    pub fn from_values(values: Vec<Value>) -> Result<Self, CodecError> {
        let mut fields = Fields::new(&catalog::ENTRIES_WITH_CURSOR, values)?;
        Ok(Self {
            cursor: fields.take()?,
            items: fields.take_pairs()?,
        })
    }

    /// 编码为 `EntriesWithCursor`。
    ///
    /// ```
    /// use bytes::Bytes;
    /// use spark_codec_response::{CursorPage, ProtocolVersion};
    ///
    /// let page = CursorPage {
    ///     cursor: 42,
    ///     items: vec![(Bytes::from_static(b"k"), Bytes::from_static(b"v"))],
    /// };
    /// let bytes = page.encode(ProtocolVersion::LATEST).unwrap();
    /// assert_eq!(&bytes[..4], &42_i32.to_le_bytes());
    /// ```
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<Bytes, CodecError> {
        encode_with(&catalog::ENTRIES_WITH_CURSOR, self.to_values(), negotiated)
    }

    /// 解码 `EntriesWithCursor`。
    pub fn decode(bytes: Bytes, negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Self::from_values(decoder::decode(
            &catalog::ENTRIES_WITH_CURSOR,
            bytes,
            negotiated,
        )?)
    }
}

/// Ringbuffer 读取结果。
///
/// 布局与游标分页相同，但 `read_count` 是本次实际读取的条数而非续读位置。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadResultSet {
    /// 服务端实际读取的条数（含被过滤掉的）。
    pub read_count: i32,
    /// 通过过滤的元素。
    pub items: Vec<Bytes>,
}

impl ReadResultSet {
    /// 转为值元组。
    pub fn to_values(&self) -> Vec<Value> {
        vec![Value::Int32(self.read_count), self.items.clone().into()]
    }

    /// 由值元组构造。
    pub fn from_values(values: Vec<Value>) -> Result<Self, CodecError> {
        let mut fields = Fields::new(&catalog::READ_RESULT_SET, values)?;
        Ok(Self {
            read_count: fields.take()?,
            items: fields.take()?,
        })
    }

    /// 在协商版本下编码。
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<Bytes, CodecError> {
        encode_with(&catalog::READ_RESULT_SET, self.to_values(), negotiated)
    }

    /// 在协商版本下解码。
    pub fn decode(bytes: Bytes, negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Self::from_values(decoder::decode(&catalog::READ_RESULT_SET, bytes, negotiated)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_page_round_trips() {
        let page = KeyPage {
            cursor: 7,
            items: vec![Bytes::from_static(b"a"), Bytes::from_static(b"bc")],
        };
        let bytes = page.encode(ProtocolVersion::V1_0).expect("encode");
        assert_eq!(KeyPage::decode(bytes, ProtocolVersion::V1_0).expect("decode"), page);
    }

    #[test]
    fn empty_page_keeps_cursor() {
        let page = EntryPage {
            cursor: -3,
            items: Vec::new(),
        };
        let bytes = page.encode(ProtocolVersion::V1_0).expect("encode");
        assert_eq!(bytes.len(), 8);
        assert_eq!(EntryPage::decode(bytes, ProtocolVersion::V1_0).expect("decode"), page);
    }
}
