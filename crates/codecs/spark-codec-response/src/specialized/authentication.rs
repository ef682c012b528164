//! 认证响应。
//!
//! # 教案定位（Why）
//! - 认证结果决定连接后续是否可用，状态字节需要收敛为封闭枚举，越界值在解码时立即报错；
//! - `server_hazelcast_version` 与 `client_unregistered_members` 自 1.3 起才出现在线上，
//!   用 [`Gated`] 表达，避免把“旧对端没发”误读为“新对端发了空值”。
//!
//! # 契约说明（What）
//! - 地址与两个 uuid 仅在 [`AuthenticationStatus::Authenticated`] 时有意义；
//!   [`AuthenticationResponse::principal`] 只在此时返回三元组。

use bytes::Bytes;

use crate::catalog;
use crate::decoder;
use crate::encoder;
use crate::error::CodecError;
use crate::specialized::{Fields, Gated};
use crate::structs::{Address, Member};
use crate::types::Value;
use crate::version::ProtocolVersion;

/// 认证状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AuthenticationStatus {
    /// 认证成功。
    Authenticated = 0,
    /// 凭据错误。
    CredentialsFailed = 1,
    /// 客户端与服务端序列化版本不一致。
    SerializationVersionMismatch = 2,
}

impl AuthenticationStatus {
    /// 线上字节。
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// 由线上字节还原，越界返回 `None`。
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Authenticated),
            1 => Some(Self::CredentialsFailed),
            2 => Some(Self::SerializationVersionMismatch),
            _ => None,
        }
    }
}

/// 认证成功后确定的会话身份。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal<'a> {
    /// 服务端成员地址。
    pub address: &'a Address,
    /// 分配给客户端的 uuid。
    pub uuid: &'a str,
    /// 持有该客户端的成员 uuid。
    pub owner_uuid: &'a str,
}

/// `Authentication` 响应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// 认证状态。
    pub status: AuthenticationStatus,
    /// 服务端成员地址。
    pub address: Option<Address>,
    /// 客户端 uuid。
    pub uuid: Option<String>,
    /// 持有者成员 uuid。
    pub owner_uuid: Option<String>,
    /// 服务端序列化版本。
    pub serialization_version: u8,
    /// 服务端产品版本号，1.3 起。
    pub server_version: Gated<String>,
    /// 客户端断线期间已离开集群的成员，1.3 起且可空。
    pub unregistered_members: Gated<Option<Vec<Member>>>,
}

impl AuthenticationResponse {
    /// 认证成功且三项身份字段齐全时返回会话身份。
    pub fn principal(&self) -> Option<Principal<'_>> {
        if self.status != AuthenticationStatus::Authenticated {
            return None;
        }
        Some(Principal {
            address: self.address.as_ref()?,
            uuid: self.uuid.as_deref()?,
            owner_uuid: self.owner_uuid.as_deref()?,
        })
    }

    /// 转为完整长度的值元组。
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Byte(self.status.as_byte()),
            self.address.clone().into(),
            self.uuid.clone().into(),
            self.owner_uuid.clone().into(),
            Value::Byte(self.serialization_version),
            self.server_version.clone().into(),
            self.unregistered_members.clone().into(),
        ]
    }

    /// 由解码器输出的值元组构造。
    pub fn from_values(values: Vec<Value>) -> Result<Self, CodecError> {
        let descriptor = &catalog::AUTHENTICATION;
        let mut fields = Fields::new(descriptor, values)?;
        let raw_status: u8 = fields.take()?;
        let status = AuthenticationStatus::from_byte(raw_status).ok_or(
            CodecError::InvalidEnumerant {
                message: descriptor.name,
                field: "status",
                value: i64::from(raw_status),
            },
        )?;
        Ok(Self {
            status,
            address: fields.take()?,
            uuid: fields.take()?,
            owner_uuid: fields.take()?,
            serialization_version: fields.take()?,
            server_version: fields.take()?,
            unregistered_members: fields.take()?,
        })
    }

    /// 在协商版本下编码。
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<Bytes, CodecError> {
        encoder::encode(&catalog::AUTHENTICATION, &self.to_values(), negotiated)
    }

    /// 在协商版本下解码。
    pub fn decode(bytes: Bytes, negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Self::from_values(decoder::decode(&catalog::AUTHENTICATION, bytes, negotiated)?)
    }
}
