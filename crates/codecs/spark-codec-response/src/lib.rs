#![warn(missing_docs)]

//! # spark-codec-response
//!
//! ## 教案目的（Why）
//! - **定位**：客户端协议响应消息的编解码层，把“消息 id + 有序参数”与线上字节互相转换。
//! - **架构角色**：位于帧切分之上、业务处理之下；连接层交来帧头 id 与负载，本 crate 交回值元组或强类型响应。
//! - **设计策略**：响应目录以静态描述符表达，编码器、解码器与分发表全部由同一份描述符驱动，
//!   字段级与消息级版本门控共享同一个判定函数。
//!
//! ## 交互契约（What）
//! - **目录**：[`catalog`] 给出全部内置消息，[`SchemaRegistry::standard`] 返回进程级注册表；
//! - **通用引擎**：[`encode`] / [`decode`] / [`decode_frame`] 处理任意描述符，[`DispatchTable`] 按 id 路由；
//! - **类型化视图**：[`AuthenticationResponse`]、[`ErrorRecord`]、[`CursorPage`]、[`ScheduledTaskStatistics`]
//!   以及覆盖全目录的 [`Response`]；
//! - **前置条件**：协商版本在连接建立后固定，调用方为每条连接构造一次 [`DispatchTable`]。
//!
//! ## 实现策略（How）
//! - 定宽整数统一小端；字符串与字节块带 `Int32` 长度前缀；可空值前置 1 字节空标志（1 为空）；
//! - 解码端每次取数前检查剩余长度，计数前缀在分配前按元素最小线上长度与配置上限过滤；
//! - `Blob` 以 `Bytes` 切片零拷贝返回。
//!
//! ## 风险提示（Trade-offs）
//! - **跨版本兼容**：新字段只能追加在参数末尾并标注 `since`，本 crate 不校验已发布描述符的演进是否兼容；
//! - **残留字节**：默认容忍以支持滚动升级，严格环境可通过 [`CodecConfig`] 切换为拒绝。

pub mod catalog;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod response;
pub mod schema;
pub mod specialized;
pub mod structs;
pub mod types;
pub mod version;

mod wire;

pub use config::{CodecConfig, TrailingBytesPolicy};
pub use decoder::{Decoded, Decoder, decode, decode_frame};
pub use dispatch::{DecodedMessage, DispatchTable};
pub use encoder::{Encoder, encode};
pub use error::{CodecError, ConfigError, ErrorCategory};
pub use response::{JobProcessInfo, Response};
pub use schema::{MessageDescriptor, ParameterDescriptor, SchemaRegistry};
pub use specialized::Gated;
pub use specialized::authentication::{AuthenticationResponse, AuthenticationStatus, Principal};
pub use specialized::cursor::{CursorPage, EntryPage, KeyPage, ReadResultSet};
pub use specialized::error_record::{ErrorCause, ErrorRecord, NO_CAUSE};
pub use specialized::statistics::ScheduledTaskStatistics;
pub use structs::{
    Address, DistributedObjectInfo, EntryView, JobPartitionState, Member, ScheduledTaskHandler,
    StackFrame, TaskTarget,
};
pub use types::{StructKind, StructValue, TypeRef, Value};
pub use version::{ParseVersionError, ProtocolVersion, is_present};
