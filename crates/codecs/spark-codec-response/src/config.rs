//! 编解码资源上限与宽容策略。
//!
//! # 教案定位（Why）
//! - 解码面对的是不可信的网络字节，帧长与集合元素个数需要可配置的硬上限；
//! - 残留字节的处理在“滚动升级期间容忍新字段”与“测试环境严格校验”之间需要切换。
//!
//! # 契约说明（What）
//! - 所有字段都有默认值，TOML 中只写需要覆盖的项；未知键直接拒绝，避免拼写错误静默生效；
//! - [`CodecConfig::validate`] 拒绝取值为 0 的上限。

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认帧长上限：16 MiB。
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;
/// 默认单个集合的元素个数上限。
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 20;

/// 最后一个在线参数之后残留字节的处理策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingBytesPolicy {
    /// 容忍并记录；对端可能是更新版本，追加了本端未知的字段。
    #[default]
    Tolerate,
    /// 视为损坏帧，返回 [`crate::CodecError::TrailingBytes`]。
    Reject,
}

/// 编解码配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// 单帧最大字节数，编码输出与解码输入均受此约束。
    pub max_frame_len: usize,
    /// 单个 `List`/`PairList` 声明的最大元素个数。
    pub max_collection_len: usize,
    /// 残留字节策略。
    pub trailing_bytes: TrailingBytesPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            trailing_bytes: TrailingBytesPolicy::Tolerate,
        }
    }
}

impl CodecConfig {
    /// 从 TOML 文本加载并校验。
    ///
    /// ```
    /// use spark_codec_response::{CodecConfig, TrailingBytesPolicy};
    ///
    /// let config = CodecConfig::from_toml_str("trailing_bytes = \"reject\"").unwrap();
    /// assert_eq!(config.trailing_bytes, TrailingBytesPolicy::Reject);
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验上限取值。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_len == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_frame_len",
            });
        }
        if self.max_collection_len == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_collection_len",
            });
        }
        Ok(())
    }
}
