//! 通用解码引擎：按描述符把线上字节还原为值元组。
//!
//! # 教案定位（Why）
//! - 输入来自网络，任何长度前缀都可能是伪造的；解码器在每次取数前检查剩余长度，
//!   并在分配前用元素最小线上长度与配置上限过滤计数前缀；
//! - 滚动升级期间对端可能比本端新，最后一个已知参数之后的字节默认容忍而不是报错。
//!
//! # 契约说明（What）
//! - 返回的值元组长度恒等于描述符参数总数，被门控排除的位置为 [`Value::Absent`]；
//! - [`Decoder::decode_frame`] 只看 `declared_len` 之内的字节，绝不越界；
//! - `Blob` 与输入共享底层缓冲，不做拷贝。

use bytes::Bytes;
use tracing::debug;

use crate::config::{CodecConfig, TrailingBytesPolicy};
use crate::error::CodecError;
use crate::schema::MessageDescriptor;
use crate::types::{StructValue, TypeRef, Value};
use crate::version::ProtocolVersion;
use crate::wire::WireReader;

const FRAME_FIELD: &str = "<frame>";

/// 以默认配置解码整块缓冲。
///
/// ```
/// use bytes::Bytes;
/// use spark_codec_response::{ProtocolVersion, Value, catalog, decode};
///
/// let values = decode(&catalog::DATA_RESPONSE, Bytes::from_static(&[1]), ProtocolVersion::LATEST).unwrap();
/// assert_eq!(values, vec![Value::Null]);
/// ```
pub fn decode(
    descriptor: &MessageDescriptor,
    bytes: Bytes,
    negotiated: ProtocolVersion,
) -> Result<Vec<Value>, CodecError> {
    Decoder::new(negotiated).decode(descriptor, bytes)
}

/// 以默认配置解码缓冲的前 `declared_len` 字节。
pub fn decode_frame(
    descriptor: &MessageDescriptor,
    bytes: Bytes,
    declared_len: usize,
    negotiated: ProtocolVersion,
) -> Result<Decoded, CodecError> {
    Decoder::new(negotiated).decode_frame(descriptor, bytes, declared_len)
}

/// 一帧的解码结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// 与描述符参数一一对应的值。
    pub values: Vec<Value>,
    /// 实际读取的字节数。
    pub consumed: usize,
    /// 最后一个在线参数之后残留的字节数。
    pub trailing: usize,
}

/// 绑定协商版本与资源上限的解码器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    negotiated: ProtocolVersion,
    config: CodecConfig,
}

impl Decoder {
    /// 以默认配置创建解码器。
    pub fn new(negotiated: ProtocolVersion) -> Self {
        Self::with_config(negotiated, &CodecConfig::default())
    }

    /// 以指定配置创建解码器。
    pub fn with_config(negotiated: ProtocolVersion, config: &CodecConfig) -> Self {
        Self {
            negotiated,
            config: *config,
        }
    }

    /// 协商版本。
    pub fn negotiated(&self) -> ProtocolVersion {
        self.negotiated
    }

    /// 生效配置。
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// 解码整块缓冲，只返回值元组。
    pub fn decode(
        &self,
        descriptor: &MessageDescriptor,
        bytes: Bytes,
    ) -> Result<Vec<Value>, CodecError> {
        let len = bytes.len();
        self.decode_frame(descriptor, bytes, len)
            .map(|decoded| decoded.values)
    }

    /// 解码缓冲中由帧头声明长度限定的一帧。
    ///
    /// 缓冲短于 `declared_len` 时返回 [`CodecError::TruncatedMessage`]；
    /// 缓冲中超出 `declared_len` 的部分属于后续帧，不会被读取。
    pub fn decode_frame(
        &self,
        descriptor: &MessageDescriptor,
        bytes: Bytes,
        declared_len: usize,
    ) -> Result<Decoded, CodecError> {
        descriptor.ensure_supported(self.negotiated)?;

        if declared_len > self.config.max_frame_len {
            return Err(CodecError::FrameTooLarge {
                len: declared_len,
                limit: self.config.max_frame_len,
            });
        }
        if declared_len > bytes.len() {
            return Err(CodecError::TruncatedMessage {
                message: descriptor.name,
                field: FRAME_FIELD,
                needed: declared_len,
                remaining: bytes.len(),
            });
        }

        let mut reader = WireReader::new(
            bytes.slice(..declared_len),
            descriptor.name,
            self.config.max_collection_len,
        );
        let mut values = Vec::with_capacity(descriptor.parameters.len());
        for parameter in descriptor.parameters {
            if !parameter.is_present_at(self.negotiated) {
                debug!(
                    message = descriptor.name,
                    parameter = parameter.name,
                    negotiated = %self.negotiated,
                    "gated-out parameter defaulted to absent"
                );
                values.push(Value::Absent);
                continue;
            }
            reader.enter(parameter.name);
            let value = if parameter.nullable && reader.get_null_flag()? {
                Value::Null
            } else {
                read_value(&mut reader, &parameter.ty)?
            };
            values.push(value);
        }

        let trailing = reader.remaining();
        if trailing > 0 {
            match self.config.trailing_bytes {
                TrailingBytesPolicy::Tolerate => debug!(
                    message = descriptor.name,
                    trailing,
                    "tolerating trailing bytes after last known parameter"
                ),
                TrailingBytesPolicy::Reject => {
                    return Err(CodecError::TrailingBytes {
                        message: descriptor.name,
                        trailing,
                    });
                }
            }
        }

        Ok(Decoded {
            values,
            consumed: reader.consumed(),
            trailing,
        })
    }
}

fn read_value(r: &mut WireReader, ty: &TypeRef) -> Result<Value, CodecError> {
    Ok(match ty {
        TypeRef::Void => Value::Void,
        TypeRef::Boolean => Value::Boolean(r.get_bool()?),
        TypeRef::Byte => Value::Byte(r.get_u8()?),
        TypeRef::Int32 => Value::Int32(r.get_i32()?),
        TypeRef::Int64 => Value::Int64(r.get_i64()?),
        TypeRef::Utf8String => Value::String(r.get_string()?),
        TypeRef::Blob => Value::Blob(r.get_blob()?),
        TypeRef::List {
            element,
            nullable_elements,
        } => {
            let min_element_len = if *nullable_elements {
                1
            } else {
                element.min_wire_len()
            };
            let count = r.get_count(min_element_len)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                if *nullable_elements && r.get_null_flag()? {
                    items.push(Value::Null);
                } else {
                    items.push(read_value(r, element)?);
                }
            }
            Value::List(items)
        }
        TypeRef::PairList { key, value } => {
            let count = r.get_count(key.min_wire_len() + value.min_wire_len())?;
            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                let k = read_value(r, key)?;
                let v = read_value(r, value)?;
                pairs.push((k, v));
            }
            Value::PairList(pairs)
        }
        TypeRef::Struct(kind) => Value::Struct(StructValue::read(*kind, r)?),
    })
}
