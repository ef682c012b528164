//! 固定形状的复合记录及其线上布局。
//!
//! # 教案定位（Why）
//! - 响应目录中出现的结构体数量有限且形状固定，因此以普通 Rust 结构体 + 私有 [`WireStruct`] trait
//!   表达，而不是开放的序列化框架；
//! - 结构体没有长度前缀，字段按声明顺序直接拼接，读取端依靠形状本身知道何时结束。
//!
//! # 契约说明（What）
//! - 字段顺序即线上顺序，一经发布不可调整；
//! - 结构体内部的可空字段同样使用 1 字节空标志。

use bytes::Bytes;

use crate::error::CodecError;
use crate::types::{StructKind, StructValue};
use crate::wire::{WireReader, WireWriter};

/// 结构体的线上读写契约，仅在 crate 内部使用。
pub(crate) trait WireStruct: Sized {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError>;
    fn read(r: &mut WireReader) -> Result<Self, CodecError>;
}

/// 成员网络地址。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// 主机名或 IP 文本。
    pub host: String,
    /// 端口。
    pub port: i32,
}

impl Address {
    /// 构造地址。
    pub fn new(host: impl Into<String>, port: i32) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl WireStruct for Address {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        w.put_str(&self.host)?;
        w.put_i32(self.port);
        Ok(())
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        Ok(Self {
            host: r.get_string()?,
            port: r.get_i32()?,
        })
    }
}

/// 集群成员快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// 成员地址。
    pub address: Address,
    /// 成员唯一标识。
    pub uuid: String,
    /// 是否为不持有数据的轻量成员。
    pub lite_member: bool,
    /// 成员属性，保持线上顺序。
    pub attributes: Vec<(String, String)>,
}

impl WireStruct for Member {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        self.address.write(w)?;
        w.put_str(&self.uuid)?;
        w.put_bool(self.lite_member);
        w.put_len(self.attributes.len())?;
        for (key, value) in &self.attributes {
            w.put_str(key)?;
            w.put_str(value)?;
        }
        Ok(())
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        let address = Address::read(r)?;
        let uuid = r.get_string()?;
        let lite_member = r.get_bool()?;
        let count = r.get_count(8)?;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            attributes.push((r.get_string()?, r.get_string()?));
        }
        Ok(Self {
            address,
            uuid,
            lite_member,
            attributes,
        })
    }
}

/// 分布式对象标识：服务名 + 对象名。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistributedObjectInfo {
    /// 所属服务名。
    pub service_name: String,
    /// 对象名。
    pub name: String,
}

impl WireStruct for DistributedObjectInfo {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        w.put_str(&self.service_name)?;
        w.put_str(&self.name)
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        Ok(Self {
            service_name: r.get_string()?,
            name: r.get_string()?,
        })
    }
}

/// Map 条目快照，键值均为序列化后的不透明字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    /// 序列化键。
    pub key: Bytes,
    /// 序列化值。
    pub value: Bytes,
    /// 条目内存开销（字节）。
    pub cost: i64,
    /// 创建时间（毫秒）。
    pub creation_time: i64,
    /// 过期时间（毫秒）。
    pub expiration_time: i64,
    /// 命中次数。
    pub hits: i64,
    /// 最近访问时间（毫秒）。
    pub last_access_time: i64,
    /// 最近落盘时间（毫秒）。
    pub last_stored_time: i64,
    /// 最近更新时间（毫秒）。
    pub last_update_time: i64,
    /// 条目版本号。
    pub version: i64,
    /// 驱逐判定值。
    pub eviction_criteria_number: i64,
    /// 存活时间（毫秒）。
    pub ttl: i64,
}

impl WireStruct for EntryView {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        w.put_blob(&self.key)?;
        w.put_blob(&self.value)?;
        for field in [
            self.cost,
            self.creation_time,
            self.expiration_time,
            self.hits,
            self.last_access_time,
            self.last_stored_time,
            self.last_update_time,
            self.version,
            self.eviction_criteria_number,
            self.ttl,
        ] {
            w.put_i64(field);
        }
        Ok(())
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        Ok(Self {
            key: r.get_blob()?,
            value: r.get_blob()?,
            cost: r.get_i64()?,
            creation_time: r.get_i64()?,
            expiration_time: r.get_i64()?,
            hits: r.get_i64()?,
            last_access_time: r.get_i64()?,
            last_stored_time: r.get_i64()?,
            last_update_time: r.get_i64()?,
            version: r.get_i64()?,
            eviction_criteria_number: r.get_i64()?,
            ttl: r.get_i64()?,
        })
    }
}

/// 作业在某个分区上的处理状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPartitionState {
    /// 负责该分区的成员地址。
    pub owner: Address,
    /// 状态名，例如 `WAITING`、`MAPPING`。
    pub state: String,
}

impl WireStruct for JobPartitionState {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        self.owner.write(w)?;
        w.put_str(&self.state)
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        Ok(Self {
            owner: Address::read(r)?,
            state: r.get_string()?,
        })
    }
}

/// 远端异常的单个栈帧。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// 声明类名。
    pub declaring_class: String,
    /// 方法名。
    pub method_name: String,
    /// 源文件名，可能缺失。
    pub file_name: Option<String>,
    /// 行号；负数表示未知或本地方法。
    pub line_number: i32,
}

impl WireStruct for StackFrame {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        w.put_str(&self.declaring_class)?;
        w.put_str(&self.method_name)?;
        w.put_null_flag(self.file_name.is_none());
        if let Some(file_name) = &self.file_name {
            w.put_str(file_name)?;
        }
        w.put_i32(self.line_number);
        Ok(())
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        let declaring_class = r.get_string()?;
        let method_name = r.get_string()?;
        let file_name = if r.get_null_flag()? {
            None
        } else {
            Some(r.get_string()?)
        };
        Ok(Self {
            declaring_class,
            method_name,
            file_name,
            line_number: r.get_i32()?,
        })
    }
}

/// 定时任务绑定的执行目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTarget {
    /// 绑定到分区，由分区所有者执行。
    Partition(i32),
    /// 绑定到指定成员。
    Member(Address),
}

/// 定时任务句柄：调度器名 + 任务名 + 执行目标。
///
/// 线上形态为 `nullable(address), partition_id, scheduler_name, task_name`，
/// 成员绑定时 `partition_id` 固定写 `-1`；地址非空而分区 id 不为 `-1` 的帧视为损坏，
/// 解码返回 [`CodecError::InvalidEnumerant`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTaskHandler {
    /// 执行目标。
    pub target: TaskTarget,
    /// 调度器名。
    pub scheduler_name: String,
    /// 任务名。
    pub task_name: String,
}

const MEMBER_BOUND_PARTITION: i32 = -1;

impl WireStruct for ScheduledTaskHandler {
    fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        match &self.target {
            TaskTarget::Member(address) => {
                w.put_null_flag(false);
                address.write(w)?;
                w.put_i32(MEMBER_BOUND_PARTITION);
            }
            TaskTarget::Partition(partition_id) => {
                w.put_null_flag(true);
                w.put_i32(*partition_id);
            }
        }
        w.put_str(&self.scheduler_name)?;
        w.put_str(&self.task_name)
    }

    fn read(r: &mut WireReader) -> Result<Self, CodecError> {
        let address = if r.get_null_flag()? {
            None
        } else {
            Some(Address::read(r)?)
        };
        let partition_id = r.get_i32()?;
        let target = match address {
            Some(address) if partition_id == MEMBER_BOUND_PARTITION => TaskTarget::Member(address),
            Some(_) => {
                return Err(CodecError::InvalidEnumerant {
                    message: r.message(),
                    field: r.field(),
                    value: i64::from(partition_id),
                });
            }
            None => TaskTarget::Partition(partition_id),
        };
        Ok(Self {
            target,
            scheduler_name: r.get_string()?,
            task_name: r.get_string()?,
        })
    }
}

impl StructValue {
    pub(crate) fn write(&self, w: &mut WireWriter) -> Result<(), CodecError> {
        match self {
            Self::Address(value) => value.write(w),
            Self::Member(value) => value.write(w),
            Self::DistributedObjectInfo(value) => value.write(w),
            Self::EntryView(value) => value.write(w),
            Self::JobPartitionState(value) => value.write(w),
            Self::StackFrame(value) => value.write(w),
            Self::ScheduledTaskHandler(value) => value.write(w),
        }
    }

    pub(crate) fn read(kind: StructKind, r: &mut WireReader) -> Result<Self, CodecError> {
        Ok(match kind {
            StructKind::Address => Self::Address(Address::read(r)?),
            StructKind::Member => Self::Member(Member::read(r)?),
            StructKind::DistributedObjectInfo => {
                Self::DistributedObjectInfo(DistributedObjectInfo::read(r)?)
            }
            StructKind::EntryView => Self::EntryView(Box::new(EntryView::read(r)?)),
            StructKind::JobPartitionState => {
                Self::JobPartitionState(JobPartitionState::read(r)?)
            }
            StructKind::StackFrame => Self::StackFrame(StackFrame::read(r)?),
            StructKind::ScheduledTaskHandler => {
                Self::ScheduledTaskHandler(ScheduledTaskHandler::read(r)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: StructValue) -> (StructValue, usize) {
        let mut writer = WireWriter::with_capacity("Test", 64);
        value.write(&mut writer).expect("write struct");
        let bytes = writer.finish();
        let len = bytes.len();
        let mut reader = WireReader::new(bytes, "Test", usize::MAX);
        let decoded = StructValue::read(value.kind(), &mut reader).expect("read struct");
        assert_eq!(reader.remaining(), 0);
        (decoded, len)
    }

    #[test]
    fn minimum_lengths_match_empty_encodings() {
        let empty_address = Address::new("", 0);
        let cases = [
            StructValue::Address(empty_address.clone()),
            StructValue::Member(Member {
                address: empty_address.clone(),
                uuid: String::new(),
                lite_member: false,
                attributes: Vec::new(),
            }),
            StructValue::JobPartitionState(JobPartitionState {
                owner: empty_address,
                state: String::new(),
            }),
            StructValue::StackFrame(StackFrame {
                declaring_class: String::new(),
                method_name: String::new(),
                file_name: None,
                line_number: -1,
            }),
            StructValue::ScheduledTaskHandler(ScheduledTaskHandler {
                target: TaskTarget::Partition(3),
                scheduler_name: String::new(),
                task_name: String::new(),
            }),
        ];
        for case in cases {
            let kind = case.kind();
            let (decoded, len) = round_trip(case.clone());
            assert_eq!(decoded, case);
            assert_eq!(len, kind.min_wire_len(), "{}", kind.name());
        }
    }

    #[test]
    fn member_bound_handler_keeps_address() {
        let handler = StructValue::ScheduledTaskHandler(ScheduledTaskHandler {
            target: TaskTarget::Member(Address::new("10.0.0.7", 5701)),
            scheduler_name: "reports".into(),
            task_name: "nightly".into(),
        });
        let (decoded, _) = round_trip(handler.clone());
        assert_eq!(decoded, handler);
    }

    #[test]
    fn member_bound_handler_with_partition_is_rejected() {
        let mut writer = WireWriter::with_capacity("Test", 64);
        writer.put_null_flag(false);
        Address::new("h", 9)
            .write(&mut writer)
            .expect("write address");
        writer.put_i32(5);
        writer.put_str("s").expect("scheduler");
        writer.put_str("t").expect("task");
        let mut reader = WireReader::new(writer.finish(), "Test", usize::MAX);
        reader.enter("handler");
        assert_eq!(
            StructValue::read(StructKind::ScheduledTaskHandler, &mut reader),
            Err(CodecError::InvalidEnumerant {
                message: "Test",
                field: "handler",
                value: 5,
            })
        );
    }
}
