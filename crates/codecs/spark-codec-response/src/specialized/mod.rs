//! 类型化视图：在通用值元组之上为特定响应提供强类型结构。
//!
//! # 教案定位（Why）
//! - 通用引擎只认识 [`Value`]，调用方却需要 `AuthenticationStatus`、`ErrorRecord` 这类带语义的类型；
//! - 视图层只做“值元组 ↔ 结构体”的搬运，线上布局仍完全由描述符决定，不存在第二份序列化逻辑。
//!
//! # 契约说明（What）
//! - 被版本门控排除的字段在视图中表现为 [`Gated::Absent`]，与“可空且为空”的 `None` 区分；
//! - 值元组与视图字段不符时返回 [`CodecError::TypeMismatch`]，参数名取自描述符。

use bytes::Bytes;

use crate::error::CodecError;
use crate::schema::{MessageDescriptor, ParameterDescriptor};
use crate::structs::{
    Address, DistributedObjectInfo, EntryView, JobPartitionState, Member, ScheduledTaskHandler,
    StackFrame,
};
use crate::types::{StructValue, Value};

pub mod authentication;
pub mod cursor;
pub mod error_record;
pub mod statistics;

/// 受版本门控的字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gated<T> {
    /// 协商版本早于字段引入版本，字段不在线上。
    #[default]
    Absent,
    /// 字段在线上。
    Present(T),
}

impl<T> Gated<T> {
    /// 是否在线。
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// 转为 `Option`，丢弃“缺席”与“存在”以外的区分。
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// 借用内部值。
    pub fn as_ref(&self) -> Gated<&T> {
        match self {
            Self::Present(value) => Gated::Present(value),
            Self::Absent => Gated::Absent,
        }
    }

    /// 映射内部值。
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Self::Present(value) => Gated::Present(f(value)),
            Self::Absent => Gated::Absent,
        }
    }
}

impl<T: Into<Value>> From<Gated<T>> for Value {
    fn from(value: Gated<T>) -> Self {
        match value {
            Gated::Present(value) => value.into(),
            Gated::Absent => Value::Absent,
        }
    }
}

/// 从动态值中取出强类型值；种类不符时返回 `None`，由调用方补全错误上下文。
pub(crate) trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! scalar_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_from_value!(
    bool => Boolean,
    u8 => Byte,
    i32 => Int32,
    i64 => Int64,
    String => String,
    Bytes => Blob,
);

macro_rules! struct_from_value {
    ($($ty:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Struct(StructValue::$ty(inner)) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

struct_from_value!(
    Address,
    Member,
    DistributedObjectInfo,
    JobPartitionState,
    StackFrame,
    ScheduledTaskHandler,
);

impl FromValue for EntryView {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Struct(StructValue::EntryView(inner)) => Some(*inner),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Gated<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Absent => Some(Gated::Absent),
            other => T::from_value(other).map(Gated::Present),
        }
    }
}

/// 按参数顺序消费解码结果的游标。
pub(crate) struct Fields {
    descriptor: &'static MessageDescriptor,
    values: std::vec::IntoIter<Value>,
    index: usize,
}

impl Fields {
    /// 值元组长度必须等于参数总数，即解码器的输出形态。
    pub(crate) fn new(
        descriptor: &'static MessageDescriptor,
        values: Vec<Value>,
    ) -> Result<Self, CodecError> {
        if values.len() != descriptor.parameters.len() {
            return Err(CodecError::ArityMismatch {
                message: descriptor.name,
                expected: descriptor.parameters.len(),
                found: values.len(),
            });
        }
        Ok(Self {
            descriptor,
            values: values.into_iter(),
            index: 0,
        })
    }

    fn next_raw(&mut self) -> Result<(&'static ParameterDescriptor, Value), CodecError> {
        let parameters: &'static [ParameterDescriptor] = self.descriptor.parameters;
        match (parameters.get(self.index), self.values.next()) {
            (Some(parameter), Some(value)) => {
                self.index += 1;
                Ok((parameter, value))
            }
            _ => Err(CodecError::ArityMismatch {
                message: self.descriptor.name,
                expected: parameters.len(),
                found: self.index,
            }),
        }
    }

    fn mismatch(&self, parameter: &ParameterDescriptor, found: &'static str) -> CodecError {
        CodecError::TypeMismatch {
            message: self.descriptor.name,
            parameter: parameter.name,
            expected: parameter.ty.to_string(),
            found,
        }
    }

    /// 取下一个参数并转换为 `T`。
    pub(crate) fn take<T: FromValue>(&mut self) -> Result<T, CodecError> {
        let (parameter, value) = self.next_raw()?;
        let found = value.kind();
        T::from_value(value).ok_or_else(|| self.mismatch(parameter, found))
    }

    /// 取下一个 `PairList` 参数。
    pub(crate) fn take_pairs<K: FromValue, V: FromValue>(
        &mut self,
    ) -> Result<Vec<(K, V)>, CodecError> {
        let (parameter, value) = self.next_raw()?;
        let found = value.kind();
        let Value::PairList(pairs) = value else {
            return Err(self.mismatch(parameter, found));
        };
        pairs
            .into_iter()
            .map(|(key, value)| {
                let (key_kind, value_kind) = (key.kind(), value.kind());
                let key = K::from_value(key).ok_or_else(|| self.mismatch(parameter, key_kind))?;
                let value =
                    V::from_value(value).ok_or_else(|| self.mismatch(parameter, value_kind))?;
                Ok((key, value))
            })
            .collect()
    }
}
