//! 通用编码引擎：按描述符把值元组写成线上字节。
//!
//! # 教案定位（Why）
//! - 所有响应消息共用同一套遍历规则，描述符即唯一事实来源，避免每条消息手写一遍序列化；
//! - 版本门控在此与解码端共用 [`crate::version::is_present`]，保证两端对“哪些字段在线上”的判断一致。
//!
//! # 契约说明（What）
//! - 值元组可以按参数总数提供（被门控排除的槽位忽略，习惯上填 [`Value::Absent`]），
//!   也可以只提供当前版本下在线的参数；其他长度一律 [`CodecError::ArityMismatch`]；
//! - 可空参数先写空标志；非空参数收到 `Null`、在线参数收到 `Absent` 均视为类型不符；
//! - 输出确定且最小：同一输入总是得到相同字节，不写任何填充。
//!
//! # 风险提示（Trade-offs）
//! - 编码前不做容量预估，超大集合会多次扩容 `BytesMut`；响应体通常较小，暂不值得两遍遍历。

use bytes::Bytes;
use tracing::trace;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::schema::{MessageDescriptor, ParameterDescriptor};
use crate::types::{TypeRef, Value};
use crate::version::ProtocolVersion;
use crate::wire::WireWriter;

const INITIAL_CAPACITY: usize = 64;

/// 以默认配置编码一条响应。
///
/// ```
/// use spark_codec_response::{ProtocolVersion, Value, catalog, encode};
///
/// let bytes = encode(&catalog::INTEGER, &[Value::Int32(7)], ProtocolVersion::LATEST).unwrap();
/// assert_eq!(&bytes[..], &[7, 0, 0, 0]);
/// ```
pub fn encode(
    descriptor: &MessageDescriptor,
    values: &[Value],
    negotiated: ProtocolVersion,
) -> Result<Bytes, CodecError> {
    Encoder::new(negotiated).encode(descriptor, values)
}

/// 绑定协商版本与帧长上限的编码器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    negotiated: ProtocolVersion,
    max_frame_len: usize,
}

impl Encoder {
    /// 以默认配置创建编码器。
    pub fn new(negotiated: ProtocolVersion) -> Self {
        Self::with_config(negotiated, &CodecConfig::default())
    }

    /// 以指定配置创建编码器。
    pub fn with_config(negotiated: ProtocolVersion, config: &CodecConfig) -> Self {
        Self {
            negotiated,
            max_frame_len: config.max_frame_len,
        }
    }

    /// 协商版本。
    pub fn negotiated(&self) -> ProtocolVersion {
        self.negotiated
    }

    /// 编码值元组。
    pub fn encode(
        &self,
        descriptor: &MessageDescriptor,
        values: &[Value],
    ) -> Result<Bytes, CodecError> {
        descriptor.ensure_supported(self.negotiated)?;

        let mut writer = WireWriter::with_capacity(descriptor.name, INITIAL_CAPACITY);
        if values.len() == descriptor.parameters.len() {
            for (parameter, value) in descriptor.parameters.iter().zip(values) {
                if parameter.is_present_at(self.negotiated) {
                    write_parameter(&mut writer, parameter, value)?;
                } else {
                    trace!(
                        message = descriptor.name,
                        parameter = parameter.name,
                        negotiated = %self.negotiated,
                        "skipping gated-out parameter"
                    );
                }
            }
        } else {
            let expected = descriptor.present_count(self.negotiated);
            if values.len() != expected {
                return Err(CodecError::ArityMismatch {
                    message: descriptor.name,
                    expected,
                    found: values.len(),
                });
            }
            for (parameter, value) in descriptor.present_parameters(self.negotiated).zip(values) {
                write_parameter(&mut writer, parameter, value)?;
            }
        }

        if writer.len() > self.max_frame_len {
            return Err(CodecError::FrameTooLarge {
                len: writer.len(),
                limit: self.max_frame_len,
            });
        }
        Ok(writer.finish())
    }
}

fn write_parameter(
    w: &mut WireWriter,
    parameter: &ParameterDescriptor,
    value: &Value,
) -> Result<(), CodecError> {
    match value {
        Value::Null if parameter.nullable => {
            w.put_null_flag(true);
            Ok(())
        }
        Value::Null | Value::Absent => Err(mismatch(w, parameter.name, &parameter.ty, value)),
        _ => {
            if parameter.nullable {
                w.put_null_flag(false);
            }
            write_value(w, parameter.name, &parameter.ty, value)
        }
    }
}

fn write_value(
    w: &mut WireWriter,
    parameter: &'static str,
    ty: &TypeRef,
    value: &Value,
) -> Result<(), CodecError> {
    match (ty, value) {
        (TypeRef::Void, Value::Void) => {}
        (TypeRef::Boolean, Value::Boolean(value)) => w.put_bool(*value),
        (TypeRef::Byte, Value::Byte(value)) => w.put_u8(*value),
        (TypeRef::Int32, Value::Int32(value)) => w.put_i32(*value),
        (TypeRef::Int64, Value::Int64(value)) => w.put_i64(*value),
        (TypeRef::Utf8String, Value::String(value)) => w.put_str(value)?,
        (TypeRef::Blob, Value::Blob(value)) => w.put_blob(value)?,
        (
            TypeRef::List {
                element,
                nullable_elements,
            },
            Value::List(items),
        ) => {
            w.put_len(items.len())?;
            for item in items {
                if *nullable_elements {
                    w.put_null_flag(item.is_null());
                    if item.is_null() {
                        continue;
                    }
                }
                write_value(w, parameter, element, item)?;
            }
        }
        (TypeRef::PairList { key, value: val }, Value::PairList(pairs)) => {
            w.put_len(pairs.len())?;
            for (k, v) in pairs {
                write_value(w, parameter, key, k)?;
                write_value(w, parameter, val, v)?;
            }
        }
        (TypeRef::Struct(kind), Value::Struct(value)) if value.kind() == *kind => value.write(w)?,
        _ => return Err(mismatch(w, parameter, ty, value)),
    }
    Ok(())
}

fn mismatch(w: &WireWriter, parameter: &'static str, ty: &TypeRef, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        message: w.message(),
        parameter,
        expected: ty.to_string(),
        found: value.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::structs::Address;

    #[test]
    fn nullable_parameter_is_flagged() {
        let null = encode(&catalog::DATA_RESPONSE, &[Value::Null], ProtocolVersion::V1_0)
            .expect("null data");
        assert_eq!(&null[..], &[1]);

        let some = encode(
            &catalog::DATA_RESPONSE,
            &[Value::blob(Bytes::from_static(b"ab"))],
            ProtocolVersion::V1_0,
        )
        .expect("some data");
        assert_eq!(&some[..], &[0, 2, 0, 0, 0, b'a', b'b']);
    }

    #[test]
    fn void_message_is_empty() {
        let bytes = encode(&catalog::VOID, &[], ProtocolVersion::V1_0).expect("void");
        assert!(bytes.is_empty());
    }

    #[test]
    fn null_for_non_nullable_is_type_mismatch() {
        assert_eq!(
            encode(&catalog::INTEGER, &[Value::Null], ProtocolVersion::V1_0),
            Err(CodecError::TypeMismatch {
                message: "Integer",
                parameter: "response",
                expected: "Int32".into(),
                found: "null",
            })
        );
    }

    #[test]
    fn wrong_kind_inside_list_is_type_mismatch() {
        let err = encode(
            &catalog::LIST_DATA_RESPONSE,
            &[Value::list([Value::Int32(1)])],
            ProtocolVersion::V1_0,
        )
        .expect_err("int in blob list");
        assert!(matches!(
            err,
            CodecError::TypeMismatch {
                found: "int32",
                ..
            }
        ));
    }

    #[test]
    fn struct_kind_must_match() {
        let err = encode(
            &catalog::SCHEDULED_TASK_HANDLER,
            &[Value::from(Address::new("h", 1))],
            ProtocolVersion::V1_4,
        )
        .expect_err("address is not a handler");
        assert!(matches!(
            err,
            CodecError::TypeMismatch {
                found: "Address",
                ..
            }
        ));
    }

    #[test]
    fn arity_accepts_full_or_present_count() {
        let full = vec![
            Value::Byte(0),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Byte(1),
            Value::Absent,
            Value::Absent,
        ];
        let from_full = encode(&catalog::AUTHENTICATION, &full, ProtocolVersion::V1_2)
            .expect("full arity");
        let from_present = encode(&catalog::AUTHENTICATION, &full[..5], ProtocolVersion::V1_2)
            .expect("present arity");
        assert_eq!(from_full, from_present);

        assert_eq!(
            encode(&catalog::AUTHENTICATION, &full[..6], ProtocolVersion::V1_2),
            Err(CodecError::ArityMismatch {
                message: "Authentication",
                expected: 5,
                found: 6,
            })
        );
    }

    #[test]
    fn absent_for_present_parameter_is_rejected() {
        let values = vec![
            Value::Byte(0),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Byte(1),
            Value::Absent,
            Value::Null,
        ];
        let err = encode(&catalog::AUTHENTICATION, &values, ProtocolVersion::V1_3)
            .expect_err("server version is on the wire at 1.3");
        assert!(matches!(
            err,
            CodecError::TypeMismatch {
                parameter: "server_hazelcast_version",
                found: "absent",
                ..
            }
        ));
    }

    #[test]
    fn message_gate_applies_before_arity() {
        assert!(matches!(
            encode(&catalog::SCHEDULED_TASK_STATISTICS, &[], ProtocolVersion::V1_3),
            Err(CodecError::MessageNotSupported { .. })
        ));
    }

    #[test]
    fn frame_limit_is_enforced() {
        let config = CodecConfig {
            max_frame_len: 4,
            ..CodecConfig::default()
        };
        let encoder = Encoder::with_config(ProtocolVersion::V1_0, &config);
        assert_eq!(
            encoder.encode(&catalog::LONG, &[Value::Int64(1)]),
            Err(CodecError::FrameTooLarge { len: 8, limit: 4 })
        );
    }
}
