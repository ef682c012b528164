//! 全目录的强类型响应。
//!
//! # 教案定位（Why）
//! - 连接层收到帧后通常需要“按 id 解码并立刻得到可 match 的类型”，[`Response`] 把目录中的每条消息
//!   映射为一个变体，省去调用方手写值元组拆解；
//! - 变体与描述符一一对应，编码时描述符由变体决定，不可能出现“变体与 id 不符”的帧。
//!
//! # 契约说明（What）
//! - [`Response::decode`] 经由 [`DispatchTable`] 路由，未知 id、版本门控与资源上限均按分发表配置生效；
//! - 残留字节被忽略，需要感知时直接使用 [`DispatchTable::decode`]。

use bytes::Bytes;

use crate::catalog;
use crate::dispatch::DispatchTable;
use crate::encoder;
use crate::error::CodecError;
use crate::schema::MessageDescriptor;
use crate::specialized::Fields;
use crate::specialized::authentication::AuthenticationResponse;
use crate::specialized::cursor::{EntryPage, KeyPage, ReadResultSet};
use crate::specialized::error_record::ErrorRecord;
use crate::specialized::statistics::ScheduledTaskStatistics;
use crate::structs::{
    Address, DistributedObjectInfo, EntryView, JobPartitionState, ScheduledTaskHandler,
};
use crate::types::Value;
use crate::version::ProtocolVersion;

/// 作业进度。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobProcessInfo {
    /// 各分区的处理状态。
    pub partition_states: Vec<JobPartitionState>,
    /// 已处理的记录数。
    pub process_records: i32,
}

/// 目录中任意一条响应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `Void`
    Void,
    /// `Boolean`
    Boolean(bool),
    /// `Integer`
    Integer(i32),
    /// `Long`
    Long(i64),
    /// `String`
    String(String),
    /// `Data`
    Data(Option<Bytes>),
    /// `ListData`
    ListData(Vec<Bytes>),
    /// `Authentication`
    Authentication(Box<AuthenticationResponse>),
    /// `Partitions`：成员地址到分区 id 列表。
    Partitions(Vec<(Address, Vec<i32>)>),
    /// `Exception`
    Exception(Box<ErrorRecord>),
    /// `ListDistributedObject`
    ListDistributedObject(Vec<DistributedObjectInfo>),
    /// `EntryView`
    EntryView(Option<Box<EntryView>>),
    /// `JobProcessInfo`
    JobProcessInfo(JobProcessInfo),
    /// `ReadResultSet`
    ReadResultSet(ReadResultSet),
    /// `CacheKeyIteratorResult`
    CacheKeyIteratorResult(KeyPage),
    /// `ListEntry`
    ListEntry(Vec<(Bytes, Bytes)>),
    /// `EntriesWithCursor`
    EntriesWithCursor(EntryPage),
    /// `ListDataMaybeNullElements`
    ListDataMaybeNullElements(Vec<Option<Bytes>>),
    /// `ScheduledTaskHandler`
    ScheduledTaskHandler(ScheduledTaskHandler),
    /// `ScheduledTaskStatistics`
    ScheduledTaskStatistics(ScheduledTaskStatistics),
    /// `ListScheduledTaskHandler`
    ListScheduledTaskHandler(Vec<ScheduledTaskHandler>),
}

impl Response {
    /// 变体对应的描述符。
    pub fn descriptor(&self) -> &'static MessageDescriptor {
        match self {
            Self::Void => &catalog::VOID,
            Self::Boolean(_) => &catalog::BOOLEAN,
            Self::Integer(_) => &catalog::INTEGER,
            Self::Long(_) => &catalog::LONG,
            Self::String(_) => &catalog::STRING_RESPONSE,
            Self::Data(_) => &catalog::DATA_RESPONSE,
            Self::ListData(_) => &catalog::LIST_DATA_RESPONSE,
            Self::Authentication(_) => &catalog::AUTHENTICATION,
            Self::Partitions(_) => &catalog::PARTITIONS,
            Self::Exception(_) => &catalog::EXCEPTION,
            Self::ListDistributedObject(_) => &catalog::LIST_DISTRIBUTED_OBJECT,
            Self::EntryView(_) => &catalog::ENTRY_VIEW,
            Self::JobProcessInfo(_) => &catalog::JOB_PROCESS_INFO,
            Self::ReadResultSet(_) => &catalog::READ_RESULT_SET,
            Self::CacheKeyIteratorResult(_) => &catalog::CACHE_KEY_ITERATOR_RESULT,
            Self::ListEntry(_) => &catalog::LIST_ENTRY,
            Self::EntriesWithCursor(_) => &catalog::ENTRIES_WITH_CURSOR,
            Self::ListDataMaybeNullElements(_) => &catalog::LIST_DATA_MAYBE_NULL_ELEMENTS,
            Self::ScheduledTaskHandler(_) => &catalog::SCHEDULED_TASK_HANDLER,
            Self::ScheduledTaskStatistics(_) => &catalog::SCHEDULED_TASK_STATISTICS,
            Self::ListScheduledTaskHandler(_) => &catalog::LIST_SCHEDULED_TASK_HANDLER,
        }
    }

    /// 变体对应的消息 id。
    pub fn message_id(&self) -> i32 {
        self.descriptor().id
    }

    /// 转为完整长度的值元组。
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Self::Void => Vec::new(),
            Self::Boolean(value) => vec![Value::Boolean(*value)],
            Self::Integer(value) => vec![Value::Int32(*value)],
            Self::Long(value) => vec![Value::Int64(*value)],
            Self::String(value) => vec![Value::String(value.clone())],
            Self::Data(value) => vec![value.clone().into()],
            Self::ListData(items) => vec![items.clone().into()],
            Self::Authentication(response) => response.to_values(),
            Self::Partitions(partitions) => vec![Value::pair_list(partitions.iter().cloned())],
            Self::Exception(record) => record.to_values(),
            Self::ListDistributedObject(objects) => vec![objects.clone().into()],
            Self::EntryView(view) => vec![view.as_deref().cloned().into()],
            Self::JobProcessInfo(info) => vec![
                info.partition_states.clone().into(),
                Value::Int32(info.process_records),
            ],
            Self::ReadResultSet(set) => set.to_values(),
            Self::CacheKeyIteratorResult(page) => page.to_values(),
            Self::ListEntry(entries) => vec![Value::pair_list(entries.iter().cloned())],
            Self::EntriesWithCursor(page) => page.to_values(),
            Self::ListDataMaybeNullElements(items) => vec![items.clone().into()],
            Self::ScheduledTaskHandler(handler) => vec![handler.clone().into()],
            Self::ScheduledTaskStatistics(stats) => stats.to_values(),
            Self::ListScheduledTaskHandler(handlers) => vec![handlers.clone().into()],
        }
    }

    /// 由描述符与解码器输出的值元组构造。
    pub fn from_values(
        descriptor: &'static MessageDescriptor,
        values: Vec<Value>,
    ) -> Result<Self, CodecError> {
        use crate::catalog::ids;

        // 带专用视图的消息先交给视图，其余在此逐个取字段。
        match descriptor.id {
            ids::AUTHENTICATION => {
                return AuthenticationResponse::from_values(values)
                    .map(|response| Self::Authentication(Box::new(response)));
            }
            ids::EXCEPTION => {
                return ErrorRecord::from_values(values)
                    .map(|record| Self::Exception(Box::new(record)));
            }
            ids::READ_RESULT_SET => {
                return ReadResultSet::from_values(values).map(Self::ReadResultSet);
            }
            ids::CACHE_KEY_ITERATOR_RESULT => {
                return KeyPage::from_values(values).map(Self::CacheKeyIteratorResult);
            }
            ids::ENTRIES_WITH_CURSOR => {
                return EntryPage::from_values(values).map(Self::EntriesWithCursor);
            }
            ids::SCHEDULED_TASK_STATISTICS => {
                return ScheduledTaskStatistics::from_values(values)
                    .map(Self::ScheduledTaskStatistics);
            }
            _ => {}
        }

        let mut fields = Fields::new(descriptor, values)?;
        Ok(match descriptor.id {
            ids::VOID => Self::Void,
            ids::BOOLEAN => Self::Boolean(fields.take()?),
            ids::INTEGER => Self::Integer(fields.take()?),
            ids::LONG => Self::Long(fields.take()?),
            ids::STRING => Self::String(fields.take()?),
            ids::DATA => Self::Data(fields.take()?),
            ids::LIST_DATA => Self::ListData(fields.take()?),
            ids::PARTITIONS => Self::Partitions(fields.take_pairs()?),
            ids::LIST_DISTRIBUTED_OBJECT => Self::ListDistributedObject(fields.take()?),
            ids::ENTRY_VIEW => {
                let view: Option<EntryView> = fields.take()?;
                Self::EntryView(view.map(Box::new))
            }
            ids::JOB_PROCESS_INFO => Self::JobProcessInfo(JobProcessInfo {
                partition_states: fields.take()?,
                process_records: fields.take()?,
            }),
            ids::LIST_ENTRY => Self::ListEntry(fields.take_pairs()?),
            ids::LIST_DATA_MAYBE_NULL_ELEMENTS => Self::ListDataMaybeNullElements(fields.take()?),
            ids::SCHEDULED_TASK_HANDLER => Self::ScheduledTaskHandler(fields.take()?),
            ids::LIST_SCHEDULED_TASK_HANDLER => Self::ListScheduledTaskHandler(fields.take()?),
            id => return Err(CodecError::UnknownMessageId { id }),
        })
    }

    /// 在协商版本下编码，返回消息 id 与负载。
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<(i32, Bytes), CodecError> {
        if let Self::Exception(record) = self {
            record.check_cause()?;
        }
        let descriptor = self.descriptor();
        let payload = encoder::encode(descriptor, &self.to_values(), negotiated)?;
        Ok((descriptor.id, payload))
    }

    /// 以内置目录在协商版本下解码。
    pub fn decode(
        id: i32,
        payload: Bytes,
        negotiated: ProtocolVersion,
    ) -> Result<Self, CodecError> {
        Self::decode_with(&DispatchTable::standard(negotiated)?, id, payload)
    }

    /// 经由指定分发表解码。
    pub fn decode_with(
        table: &DispatchTable<'_>,
        id: i32,
        payload: Bytes,
    ) -> Result<Self, CodecError> {
        let message = table.decode(id, payload)?;
        Self::from_values(message.descriptor, message.values)
    }
}
