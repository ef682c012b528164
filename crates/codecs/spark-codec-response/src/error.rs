//! 响应编解码错误类型定义。
//!
//! # 教案定位（Why）
//! - 编解码失败需要向调用方明确“是帧损坏、未知消息，还是调用方传错了值”，以便连接层决定丢弃消息还是关闭连接；
//! - 与 `encoder`/`decoder` 解耦，避免遍历逻辑与错误枚举相互污染。
//!
//! # 使用契约（What）
//! - 所有错误都只影响当前这一次 `encode`/`decode` 调用，不会污染注册表或其他在途消息；
//! - 每个变体都提供稳定错误码 [`CodecError::code`] 与分类 [`CodecError::category`]，便于日志与指标聚合；
//! - 远端应用异常（`Exception` 响应）不是编解码错误，而是普通负载，见 [`crate::ErrorRecord`]。

use thiserror::Error;

/// 编解码错误的粗粒度分类，供连接层挑选处置策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 帧内容与描述符不符（截断、长度前缀越界、非法 UTF-8 等），视为损坏帧，本层不重试。
    CorruptFrame,
    /// 分发表无法解析消息 id 或名称；是否关闭连接由连接层决定。
    UnknownMessage,
    /// 调用方提供的值元组与描述符不匹配，属于调用方缺陷。
    CallerBug,
    /// 启动期注册表装配错误，应当在进程启动时即失败。
    Setup,
}

/// 响应编解码过程中可能出现的错误。
///
/// ## 契约定义（What）
/// - `message` 字段均为描述符中的逻辑消息名，`field` / `parameter` 为触发错误的参数名；
/// - 变体只携带整数与静态字符串（`TypeMismatch::expected` 除外），可以廉价克隆并直接在测试中断言。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// 分发表中不存在该消息 id。
    #[error("unknown response message id {id}")]
    UnknownMessageId {
        /// 帧头携带的消息 id。
        id: i32,
    },

    /// 注册表中不存在该逻辑名称。
    #[error("unknown response message name `{name}`")]
    UnknownMessageName {
        /// 调用方请求的逻辑名称。
        name: String,
    },

    /// 注册时发现 id 已被占用。
    #[error("response message id {id} is already registered by `{existing}`, cannot register `{incoming}`")]
    DuplicateMessageId {
        /// 冲突的 id。
        id: i32,
        /// 已注册的消息名。
        existing: &'static str,
        /// 本次尝试注册的消息名。
        incoming: &'static str,
    },

    /// 注册时发现逻辑名称已被占用。
    #[error("response message name `{name}` is already registered")]
    DuplicateMessageName {
        /// 冲突的逻辑名称。
        name: &'static str,
    },

    /// 缓冲在字段中途耗尽。
    #[error("`{message}.{field}` is truncated: needs {needed} bytes, {remaining} remaining")]
    TruncatedMessage {
        /// 消息名。
        message: &'static str,
        /// 参数名。
        field: &'static str,
        /// 当前读取所需字节数。
        needed: usize,
        /// 缓冲剩余字节数。
        remaining: usize,
    },

    /// 计数或长度前缀为负数，或要求越过缓冲末尾读取。
    #[error("`{message}.{field}` declares length {declared} but only {remaining} bytes remain")]
    MalformedLength {
        /// 消息名。
        message: &'static str,
        /// 参数名。
        field: &'static str,
        /// 线上声明的长度或元素个数。
        declared: i64,
        /// 缓冲剩余字节数。
        remaining: usize,
    },

    /// 值的种类与参数声明的类型不一致。
    #[error("`{message}.{parameter}` expects {expected}, found {found}")]
    TypeMismatch {
        /// 消息名。
        message: &'static str,
        /// 参数名。
        parameter: &'static str,
        /// 声明类型的可读形式，例如 `List<Blob>`。
        expected: String,
        /// 实际值的种类。
        found: &'static str,
    },

    /// 值元组长度既不等于参数总数，也不等于当前版本下在线参数个数。
    #[error("`{message}` expects {expected} values, found {found}")]
    ArityMismatch {
        /// 消息名。
        message: &'static str,
        /// 当前版本下期望的值个数。
        expected: usize,
        /// 实际提供的值个数。
        found: usize,
    },

    /// 整条消息晚于协商版本引入。
    #[error("`{message}` requires protocol {since}, negotiated {negotiated}")]
    MessageNotSupported {
        /// 消息名。
        message: &'static str,
        /// 消息引入版本。
        since: crate::ProtocolVersion,
        /// 当前连接协商的版本。
        negotiated: crate::ProtocolVersion,
    },

    /// 字符串字段不是合法 UTF-8。
    #[error("`{message}.{field}` is not valid UTF-8")]
    InvalidUtf8 {
        /// 消息名。
        message: &'static str,
        /// 参数名。
        field: &'static str,
    },

    /// 枚举字段取值越界，例如认证状态不在 0..=2。
    #[error("`{message}.{field}` carries unknown enumerant {value}")]
    InvalidEnumerant {
        /// 消息名。
        message: &'static str,
        /// 参数名。
        field: &'static str,
        /// 线上读到的原始值。
        value: i64,
    },

    /// 帧长度超出配置上限。
    #[error("frame of {len} bytes exceeds limit {limit}")]
    FrameTooLarge {
        /// 帧长度。
        len: usize,
        /// 上限。
        limit: usize,
    },

    /// 严格模式下，最后一个参数之后仍残留字节。
    #[error("`{message}` left {trailing} trailing bytes")]
    TrailingBytes {
        /// 消息名。
        message: &'static str,
        /// 残留字节数。
        trailing: usize,
    },
}

impl CodecError {
    /// 返回稳定错误码，命名空间固定为 `response.codec.*`。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownMessageId { .. } => "response.codec.unknown_id",
            Self::UnknownMessageName { .. } => "response.codec.unknown_name",
            Self::DuplicateMessageId { .. } => "response.codec.duplicate_id",
            Self::DuplicateMessageName { .. } => "response.codec.duplicate_name",
            Self::TruncatedMessage { .. } => "response.codec.truncated",
            Self::MalformedLength { .. } => "response.codec.malformed_length",
            Self::TypeMismatch { .. } => "response.codec.type_mismatch",
            Self::ArityMismatch { .. } => "response.codec.arity_mismatch",
            Self::MessageNotSupported { .. } => "response.codec.not_supported",
            Self::InvalidUtf8 { .. } => "response.codec.invalid_utf8",
            Self::InvalidEnumerant { .. } => "response.codec.invalid_enumerant",
            Self::FrameTooLarge { .. } => "response.codec.frame_too_large",
            Self::TrailingBytes { .. } => "response.codec.trailing_bytes",
        }
    }

    /// 返回错误分类。
    ///
    /// `MessageNotSupported` 归为 [`ErrorCategory::CallerBug`]：协商版本双方已知，
    /// 发送方本不应在低版本连接上发出新消息。
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownMessageId { .. } | Self::UnknownMessageName { .. } => {
                ErrorCategory::UnknownMessage
            }
            Self::DuplicateMessageId { .. } | Self::DuplicateMessageName { .. } => {
                ErrorCategory::Setup
            }
            Self::TruncatedMessage { .. }
            | Self::MalformedLength { .. }
            | Self::InvalidUtf8 { .. }
            | Self::InvalidEnumerant { .. }
            | Self::FrameTooLarge { .. }
            | Self::TrailingBytes { .. } => ErrorCategory::CorruptFrame,
            Self::TypeMismatch { .. }
            | Self::ArityMismatch { .. }
            | Self::MessageNotSupported { .. } => ErrorCategory::CallerBug,
        }
    }
}

/// 配置加载错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 文本无法解析或字段类型不符。
    #[error("invalid codec configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// 上限取值非法（目前仅拒绝 0）。
    #[error("codec limit `{field}` must be greater than zero")]
    InvalidLimit {
        /// 配置项名称。
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_stay_in_namespace() {
        let err = CodecError::TruncatedMessage {
            message: "Integer",
            field: "response",
            needed: 4,
            remaining: 1,
        };
        assert_eq!(err.code(), "response.codec.truncated");
        assert_eq!(err.category(), ErrorCategory::CorruptFrame);
        assert_eq!(
            err.to_string(),
            "`Integer.response` is truncated: needs 4 bytes, 1 remaining"
        );
    }

    #[test]
    fn unknown_id_is_not_a_corrupt_frame() {
        let err = CodecError::UnknownMessageId { id: 999 };
        assert_eq!(err.category(), ErrorCategory::UnknownMessage);
    }
}
