//! 类型系统：线上可表示的封闭类型集合与动态值。
//!
//! # 教案定位（Why）
//! - 描述符中的每个参数都引用一个 [`TypeRef`]，通用编解码引擎只需按类型规则遍历，不关心具体业务；
//! - [`Value`] 是引擎输入/输出的值元组元素，结构体类值通过 [`StructValue`] 这一封闭的带标签和类型表示，
//!   不提供开放式多态扩展点。
//!
//! # 契约说明（What）
//! - `TypeRef` 全部由 `'static` 引用组成，可在 `static` 描述符表中常量构造；
//! - `Value::Absent` 专指“因版本门控而未出现在线上”的参数，与 `Value::Null`（可空参数显式为空）严格区分。

use core::fmt;

use bytes::Bytes;

use crate::structs::{
    Address, DistributedObjectInfo, EntryView, JobPartitionState, Member, ScheduledTaskHandler,
    StackFrame,
};

/// 线上类型引用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    /// 不占任何字节。
    Void,
    /// 1 字节布尔，0/1。
    Boolean,
    /// 1 字节无符号整数。
    Byte,
    /// 4 字节小端有符号整数。
    Int32,
    /// 8 字节小端有符号整数。
    Int64,
    /// `Int32` 字节长度 + UTF-8 字节。
    Utf8String,
    /// `Int32` 字节长度 + 原始字节。
    Blob,
    /// `Int32` 元素个数 + 同质元素。
    List {
        /// 元素类型。
        element: &'static TypeRef,
        /// 为真时每个元素前带 1 字节空标志。
        nullable_elements: bool,
    },
    /// `Int32` 键值对个数 + 依次编码的键与值。
    PairList {
        /// 键类型。
        key: &'static TypeRef,
        /// 值类型。
        value: &'static TypeRef,
    },
    /// 固定形状的复合记录，字段依次拼接、无长度前缀。
    Struct(StructKind),
}

impl TypeRef {
    /// 该类型任一合法值在线上至少占用的字节数。
    ///
    /// 解码计数前缀时用它判断“声明的元素个数是否可能装进剩余缓冲”，从而在分配前识别恶意长度。
    pub const fn min_wire_len(&self) -> usize {
        match self {
            Self::Void => 0,
            Self::Boolean | Self::Byte => 1,
            Self::Int32 | Self::Utf8String | Self::Blob => 4,
            Self::Int64 => 8,
            Self::List { .. } | Self::PairList { .. } => 4,
            Self::Struct(kind) => kind.min_wire_len(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("Void"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Byte => f.write_str("Byte"),
            Self::Int32 => f.write_str("Int32"),
            Self::Int64 => f.write_str("Int64"),
            Self::Utf8String => f.write_str("String"),
            Self::Blob => f.write_str("Blob"),
            Self::List {
                element,
                nullable_elements: false,
            } => write!(f, "List<{element}>"),
            Self::List {
                element,
                nullable_elements: true,
            } => write!(f, "List<Nullable<{element}>>"),
            Self::PairList { key, value } => write!(f, "PairList<{key}, {value}>"),
            Self::Struct(kind) => f.write_str(kind.name()),
        }
    }
}

/// 封闭的结构体形状目录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// 成员地址。
    Address,
    /// 集群成员。
    Member,
    /// 分布式对象标识。
    DistributedObjectInfo,
    /// Map 条目快照。
    EntryView,
    /// 作业分区状态。
    JobPartitionState,
    /// 远端异常栈帧。
    StackFrame,
    /// 定时任务句柄。
    ScheduledTaskHandler,
}

impl StructKind {
    /// 形状名称，用于错误信息与类型展示。
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::Member => "Member",
            Self::DistributedObjectInfo => "DistributedObjectInfo",
            Self::EntryView => "EntryView",
            Self::JobPartitionState => "JobPartitionState",
            Self::StackFrame => "StackFrame",
            Self::ScheduledTaskHandler => "ScheduledTaskHandler",
        }
    }

    /// 该形状在线上的最小字节数（字符串按空串、集合按零元素、可空字段按空计算）。
    pub const fn min_wire_len(&self) -> usize {
        match self {
            // host + port
            Self::Address => 8,
            // address + uuid + lite + attributes count
            Self::Member => 8 + 4 + 1 + 4,
            Self::DistributedObjectInfo => 8,
            // key + value + 10 个 Int64
            Self::EntryView => 4 + 4 + 10 * 8,
            Self::JobPartitionState => 8 + 4,
            // class + method + file 空标志 + line
            Self::StackFrame => 4 + 4 + 1 + 4,
            // address 空标志 + partition + scheduler + task
            Self::ScheduledTaskHandler => 1 + 4 + 4 + 4,
        }
    }
}

/// 结构体值：与 [`StructKind`] 一一对应的带标签和类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructValue {
    /// 见 [`Address`]。
    Address(Address),
    /// 见 [`Member`]。
    Member(Member),
    /// 见 [`DistributedObjectInfo`]。
    DistributedObjectInfo(DistributedObjectInfo),
    /// 见 [`EntryView`]；体积较大，装箱以控制 `Value` 尺寸。
    EntryView(Box<EntryView>),
    /// 见 [`JobPartitionState`]。
    JobPartitionState(JobPartitionState),
    /// 见 [`StackFrame`]。
    StackFrame(StackFrame),
    /// 见 [`ScheduledTaskHandler`]。
    ScheduledTaskHandler(ScheduledTaskHandler),
}

impl StructValue {
    /// 返回值对应的形状。
    pub fn kind(&self) -> StructKind {
        match self {
            Self::Address(_) => StructKind::Address,
            Self::Member(_) => StructKind::Member,
            Self::DistributedObjectInfo(_) => StructKind::DistributedObjectInfo,
            Self::EntryView(_) => StructKind::EntryView,
            Self::JobPartitionState(_) => StructKind::JobPartitionState,
            Self::StackFrame(_) => StructKind::StackFrame,
            Self::ScheduledTaskHandler(_) => StructKind::ScheduledTaskHandler,
        }
    }
}

/// 引擎处理的动态值。
///
/// # 契约说明（What）
/// - 编码时按位置与描述符参数对齐；类型不符返回 [`crate::CodecError::TypeMismatch`]；
/// - 解码结果中，被版本门控排除的参数固定为 [`Value::Absent`]，可空参数为空时为 [`Value::Null`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 参数因版本门控不在线上。
    Absent,
    /// 可空参数或可空元素显式为空。
    Null,
    /// `Void` 类型的唯一值。
    Void,
    /// 布尔。
    Boolean(bool),
    /// 单字节。
    Byte(u8),
    /// 32 位整数。
    Int32(i32),
    /// 64 位整数。
    Int64(i64),
    /// UTF-8 字符串。
    String(String),
    /// 不透明字节块。
    Blob(Bytes),
    /// 同质列表。
    List(Vec<Value>),
    /// 有序键值对列表。
    PairList(Vec<(Value, Value)>),
    /// 结构体。
    Struct(StructValue),
}

impl Value {
    /// 值的种类名，用于类型不符时的诊断信息。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Void => "void",
            Self::Boolean(_) => "boolean",
            Self::Byte(_) => "byte",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::String(_) => "string",
            Self::Blob(_) => "blob",
            Self::List(_) => "list",
            Self::PairList(_) => "pair list",
            Self::Struct(value) => value.kind().name(),
        }
    }

    /// 由字节内容构造 `Blob`。
    pub fn blob(bytes: impl Into<Bytes>) -> Self {
        Self::Blob(bytes.into())
    }

    /// 由任意可转换元素构造列表。
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// 由键值对构造 `PairList`。
    pub fn pair_list<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::PairList(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// 是否为 [`Value::Null`]。
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 是否为 [`Value::Absent`]。
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Byte(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Self::Blob(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Self::Struct(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

macro_rules! struct_value_conversions {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Value {
                fn from(value: $variant) -> Self {
                    Self::Struct(StructValue::$variant(value.into()))
                }
            }
        )*
    };
}

struct_value_conversions!(
    Address,
    Member,
    DistributedObjectInfo,
    EntryView,
    JobPartitionState,
    StackFrame,
    ScheduledTaskHandler,
);
