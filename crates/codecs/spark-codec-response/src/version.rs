//! 协议版本与版本门控谓词。
//!
//! # 教案定位（Why）
//! - 新字段只能追加在参数列表末尾，并以 `since` 标注引入版本；双方依据握手时协商出的同一个版本
//!   计算字段是否在线，而不是从线上观察任何标志位；
//! - 编码器与解码器必须共享同一个谓词 [`is_present`]，这种对称性是版本错位下仍能正确解码的前提。

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// 客户端协议版本（`major.minor`），按字典序全序比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    major: u8,
    minor: u8,
}

impl ProtocolVersion {
    /// 协议 1.0。
    pub const V1_0: Self = Self::new(1, 0);
    /// 协议 1.1。
    pub const V1_1: Self = Self::new(1, 1);
    /// 协议 1.2。
    pub const V1_2: Self = Self::new(1, 2);
    /// 协议 1.3：认证响应追加服务端版本与未注册成员列表。
    pub const V1_3: Self = Self::new(1, 3);
    /// 协议 1.4：引入定时任务相关响应。
    pub const V1_4: Self = Self::new(1, 4);
    /// 最早支持的版本。
    pub const EARLIEST: Self = Self::V1_0;
    /// 当前实现支持的最新版本。
    pub const LATEST: Self = Self::V1_4;

    /// 依据主次版本号构造。
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// 主版本号。
    pub const fn major(&self) -> u8 {
        self.major
    }

    /// 次版本号。
    pub const fn minor(&self) -> u8 {
        self.minor
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// 版本字符串无法解析。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid protocol version `{input}`, expected `<major>.<minor>`")]
pub struct ParseVersionError {
    input: String,
}

impl FromStr for ProtocolVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError {
            input: s.to_owned(),
        };
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u8>().map_err(|_| invalid())?;
        let minor = minor.parse::<u8>().map_err(|_| invalid())?;
        Ok(Self::new(major, minor))
    }
}

/// 版本门控谓词：`since` 缺省表示自首个版本起即存在，否则要求 `negotiated >= since`。
///
/// 参数级与消息级门控都只调用这一个函数。
#[inline]
pub fn is_present(since: Option<ProtocolVersion>, negotiated: ProtocolVersion) -> bool {
    match since {
        None => true,
        Some(since) => negotiated >= since,
    }
}
