//! 消息描述符与注册表。
//!
//! # 教案定位（Why）
//! - 响应目录以数据表而非过程代码表达：每条消息是一个 [`MessageDescriptor`]，参数顺序即线上顺序；
//! - 注册表在进程启动时一次性装配，之后只读，可被任意线程无锁并发读取。
//!
//! # 契约说明（What）
//! - 描述符全部是 `'static` 数据，可在 `static` 项中用 `const fn` 构造；
//! - 注册时 id 与名称均须唯一，冲突属于装配期编程错误（[`CodecError::DuplicateMessageId`]）。
//!
//! # 风险提示（Trade-offs）
//! - 参数一旦发布便不可重排或删除，只能在末尾追加带 `since` 的新参数；本模块不做跨版本兼容性检查，
//!   依赖评审与目录测试守护。

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::catalog;
use crate::error::CodecError;
use crate::types::TypeRef;
use crate::version::{ProtocolVersion, is_present};

/// 单个参数的元数据。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// 参数名。
    pub name: &'static str,
    /// 线上类型。
    pub ty: TypeRef,
    /// 是否可空；可空参数在任何版本下都带 1 字节空标志。
    pub nullable: bool,
    /// 引入版本；`None` 表示自首个版本起存在。
    pub since: Option<ProtocolVersion>,
}

impl ParameterDescriptor {
    /// 构造非空、无版本门控的参数。
    pub const fn new(name: &'static str, ty: TypeRef) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            since: None,
        }
    }

    /// 标记为可空。
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// 标记引入版本。
    pub const fn since(self, version: ProtocolVersion) -> Self {
        Self {
            since: Some(version),
            ..self
        }
    }

    /// 在协商版本下该参数是否出现在线上。
    pub fn is_present_at(&self, negotiated: ProtocolVersion) -> bool {
        is_present(self.since, negotiated)
    }
}

/// 一条响应消息的线上形状。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// 全目录唯一的消息 id。
    pub id: i32,
    /// 逻辑名称。
    pub name: &'static str,
    /// 消息本身的引入版本。
    pub since: Option<ProtocolVersion>,
    /// 有序参数列表。
    pub parameters: &'static [ParameterDescriptor],
}

impl MessageDescriptor {
    /// 构造描述符。
    pub const fn new(
        id: i32,
        name: &'static str,
        parameters: &'static [ParameterDescriptor],
    ) -> Self {
        Self {
            id,
            name,
            since: None,
            parameters,
        }
    }

    /// 标记整条消息的引入版本。
    pub const fn since(self, version: ProtocolVersion) -> Self {
        Self {
            since: Some(version),
            ..self
        }
    }

    /// 协商版本下是否允许收发该消息。
    pub fn is_supported_at(&self, negotiated: ProtocolVersion) -> bool {
        is_present(self.since, negotiated)
    }

    /// 消息级门控检查，失败时返回 [`CodecError::MessageNotSupported`]。
    pub fn ensure_supported(&self, negotiated: ProtocolVersion) -> Result<(), CodecError> {
        match self.since {
            Some(since) if !is_present(self.since, negotiated) => {
                Err(CodecError::MessageNotSupported {
                    message: self.name,
                    since,
                    negotiated,
                })
            }
            _ => Ok(()),
        }
    }

    /// 协商版本下在线的参数，按声明顺序。
    pub fn present_parameters(
        &self,
        negotiated: ProtocolVersion,
    ) -> impl Iterator<Item = &'static ParameterDescriptor> + use<> {
        let parameters: &'static [ParameterDescriptor] = self.parameters;
        parameters
            .iter()
            .filter(move |parameter| parameter.is_present_at(negotiated))
    }

    /// 协商版本下在线的参数个数。
    pub fn present_count(&self, negotiated: ProtocolVersion) -> usize {
        self.present_parameters(negotiated).count()
    }

    /// 按名称查找参数。
    pub fn parameter(&self, name: &str) -> Option<&'static ParameterDescriptor> {
        let parameters: &'static [ParameterDescriptor] = self.parameters;
        parameters.iter().find(|parameter| parameter.name == name)
    }
}

/// 描述符注册表。
///
/// 内部以两张哈希索引（id、名称）指向同一批 `'static` 描述符，并保留注册顺序供遍历。
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    ordered: Vec<&'static MessageDescriptor>,
    by_id: HashMap<i32, &'static MessageDescriptor>,
    by_name: HashMap<&'static str, &'static MessageDescriptor>,
}

impl SchemaRegistry {
    /// 创建空注册表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 由描述符序列装配注册表，遇到第一个冲突即失败。
    pub fn from_descriptors(
        descriptors: &[&'static MessageDescriptor],
    ) -> Result<Self, CodecError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// 进程级内置目录注册表，首次访问时装配。
    ///
    /// 内置目录的 id 与名称由 [`crate::catalog`] 的单元测试守护唯一性，正常情况下总是返回 `Ok`。
    pub fn standard() -> Result<&'static SchemaRegistry, CodecError> {
        static STANDARD: OnceLock<Result<SchemaRegistry, CodecError>> = OnceLock::new();
        STANDARD
            .get_or_init(|| SchemaRegistry::from_descriptors(catalog::CATALOG))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// 注册描述符。
    pub fn register(&mut self, descriptor: &'static MessageDescriptor) -> Result<(), CodecError> {
        if let Some(existing) = self.by_id.get(&descriptor.id) {
            return Err(CodecError::DuplicateMessageId {
                id: descriptor.id,
                existing: existing.name,
                incoming: descriptor.name,
            });
        }
        if self.by_name.contains_key(descriptor.name) {
            return Err(CodecError::DuplicateMessageName {
                name: descriptor.name,
            });
        }
        debug!(
            id = descriptor.id,
            name = descriptor.name,
            parameters = descriptor.parameters.len(),
            "registered response descriptor"
        );
        self.by_id.insert(descriptor.id, descriptor);
        self.by_name.insert(descriptor.name, descriptor);
        self.ordered.push(descriptor);
        Ok(())
    }

    /// 按 id 解析。
    pub fn resolve_by_id(&self, id: i32) -> Result<&'static MessageDescriptor, CodecError> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or(CodecError::UnknownMessageId { id })
    }

    /// 按逻辑名称解析。
    pub fn resolve_by_name(&self, name: &str) -> Result<&'static MessageDescriptor, CodecError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| CodecError::UnknownMessageName {
                name: name.to_owned(),
            })
    }

    /// 按注册顺序遍历。
    pub fn iter(&self) -> impl Iterator<Item = &'static MessageDescriptor> + '_ {
        self.ordered.iter().copied()
    }

    /// 已注册的描述符个数。
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    static DUPLICATE_ID: MessageDescriptor =
        MessageDescriptor::new(catalog::ids::VOID, "Other", &[]);
    static DUPLICATE_NAME: MessageDescriptor = MessageDescriptor::new(9_000, "Void", &[]);

    #[test]
    fn standard_registry_holds_whole_catalog() {
        let registry = SchemaRegistry::standard().expect("built-in catalog is consistent");
        assert_eq!(registry.len(), catalog::CATALOG.len());
        assert_eq!(registry.len(), 21);
        let auth = registry
            .resolve_by_name("Authentication")
            .expect("authentication registered");
        assert_eq!(
            registry.resolve_by_id(auth.id).expect("same id").name,
            "Authentication"
        );
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(&catalog::VOID).expect("first registration");
        assert_eq!(
            registry.register(&DUPLICATE_ID),
            Err(CodecError::DuplicateMessageId {
                id: catalog::ids::VOID,
                existing: "Void",
                incoming: "Other",
            })
        );
        assert_eq!(
            registry.register(&DUPLICATE_NAME),
            Err(CodecError::DuplicateMessageName { name: "Void" })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_lookups_fail() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.resolve_by_id(4242),
            Err(CodecError::UnknownMessageId { id: 4242 })
        );
        assert_eq!(
            registry.resolve_by_name("Nope"),
            Err(CodecError::UnknownMessageName {
                name: "Nope".into()
            })
        );
    }

    #[test]
    fn gated_parameters_are_filtered_per_version() {
        let auth = &catalog::AUTHENTICATION;
        assert_eq!(auth.present_count(ProtocolVersion::V1_2), 5);
        assert_eq!(auth.present_count(ProtocolVersion::V1_3), 7);
        assert!(
            catalog::SCHEDULED_TASK_HANDLER
                .ensure_supported(ProtocolVersion::V1_3)
                .is_err()
        );
        assert!(
            catalog::SCHEDULED_TASK_HANDLER
                .ensure_supported(ProtocolVersion::V1_4)
                .is_ok()
        );
    }
}
