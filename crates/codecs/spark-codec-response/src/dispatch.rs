//! 按消息 id 分发的编解码入口。
//!
//! # 教案定位（Why）
//! - 连接层拿到的是“帧头 id + 负载”，需要一张以 id 为键的表把负载交给正确的描述符；
//! - 协商版本在连接建立后固定，因此分发表在构造时绑定版本与配置，之后每次调用都不再传递。
//!
//! # 契约说明（What）
//! - 未知 id 返回 [`CodecError::UnknownMessageId`] 并记录 `warn` 日志，是否断开连接由调用方决定；
//! - 分发表只读，可在多个任务间共享引用。

use bytes::Bytes;
use tracing::warn;

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodecError;
use crate::schema::{MessageDescriptor, SchemaRegistry};
use crate::types::Value;
use crate::version::ProtocolVersion;

/// 解码后的消息：描述符 + 值元组。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// 命中的描述符。
    pub descriptor: &'static MessageDescriptor,
    /// 与参数一一对应的值。
    pub values: Vec<Value>,
    /// 残留字节数，非零意味着对端可能比本端新。
    pub trailing: usize,
}

/// 绑定注册表、协商版本与配置的分发表。
#[derive(Debug, Clone, Copy)]
pub struct DispatchTable<'r> {
    registry: &'r SchemaRegistry,
    encoder: Encoder,
    decoder: Decoder,
}

impl DispatchTable<'static> {
    /// 基于内置目录构造分发表。
    pub fn standard(negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Ok(Self::new(SchemaRegistry::standard()?, negotiated))
    }
}

impl<'r> DispatchTable<'r> {
    /// 以默认配置构造。
    pub fn new(registry: &'r SchemaRegistry, negotiated: ProtocolVersion) -> Self {
        Self::with_config(registry, negotiated, &CodecConfig::default())
    }

    /// 以指定配置构造。
    pub fn with_config(
        registry: &'r SchemaRegistry,
        negotiated: ProtocolVersion,
        config: &CodecConfig,
    ) -> Self {
        Self {
            registry,
            encoder: Encoder::with_config(negotiated, config),
            decoder: Decoder::with_config(negotiated, config),
        }
    }

    /// 协商版本。
    pub fn negotiated(&self) -> ProtocolVersion {
        self.decoder.negotiated()
    }

    /// 底层注册表。
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// 由 id 找到描述符。
    pub fn route(&self, id: i32) -> Result<&'static MessageDescriptor, CodecError> {
        self.registry.resolve_by_id(id).inspect_err(|_| {
            warn!(
                id,
                negotiated = %self.negotiated(),
                "received response with unknown message id"
            );
        })
    }

    /// 解码一帧负载。
    pub fn decode(&self, id: i32, payload: Bytes) -> Result<DecodedMessage, CodecError> {
        let descriptor = self.route(id)?;
        let len = payload.len();
        let decoded = self.decoder.decode_frame(descriptor, payload, len)?;
        Ok(DecodedMessage {
            descriptor,
            values: decoded.values,
            trailing: decoded.trailing,
        })
    }

    /// 按逻辑名称编码，返回消息 id 与负载。
    pub fn encode(&self, name: &str, values: &[Value]) -> Result<(i32, Bytes), CodecError> {
        let descriptor = self.registry.resolve_by_name(name)?;
        Ok((descriptor.id, self.encoder.encode(descriptor, values)?))
    }

    /// 按消息 id 编码。
    pub fn encode_id(&self, id: i32, values: &[Value]) -> Result<Bytes, CodecError> {
        let descriptor = self.route(id)?;
        self.encoder.encode(descriptor, values)
    }
}
