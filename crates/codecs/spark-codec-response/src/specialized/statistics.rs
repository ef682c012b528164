//! 定时任务运行统计。

use bytes::Bytes;

use crate::catalog;
use crate::decoder;
use crate::encoder;
use crate::error::CodecError;
use crate::specialized::Fields;
use crate::types::Value;
use crate::version::ProtocolVersion;

/// `ScheduledTaskStatistics` 响应，全部为 `Int64`，时间单位见字段名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScheduledTaskStatistics {
    /// 任务创建时间（毫秒时间戳）。
    pub created_at: i64,
    /// 首次运行开始时刻。
    pub first_run_start_nanos: i64,
    /// 最近一次空闲时长。
    pub last_idle_time_nanos: i64,
    /// 最近一次运行结束时刻。
    pub last_run_end_nanos: i64,
    /// 最近一次运行开始时刻。
    pub last_run_start_nanos: i64,
    /// 累计空闲时长。
    pub total_idle_time_nanos: i64,
    /// 累计运行次数。
    pub total_runs: i64,
    /// 累计运行时长。
    pub total_run_time_nanos: i64,
}

impl ScheduledTaskStatistics {
    fn fields(&self) -> [i64; 8] {
        [
            self.created_at,
            self.first_run_start_nanos,
            self.last_idle_time_nanos,
            self.last_run_end_nanos,
            self.last_run_start_nanos,
            self.total_idle_time_nanos,
            self.total_runs,
            self.total_run_time_nanos,
        ]
    }

    /// 转为值元组。
    pub fn to_values(&self) -> Vec<Value> {
        self.fields().into_iter().map(Value::Int64).collect()
    }

    /// 由值元组构造。
    pub fn from_values(values: Vec<Value>) -> Result<Self, CodecError> {
        let mut fields = Fields::new(&catalog::SCHEDULED_TASK_STATISTICS, values)?;
        Ok(Self {
            created_at: fields.take()?,
            first_run_start_nanos: fields.take()?,
            last_idle_time_nanos: fields.take()?,
            last_run_end_nanos: fields.take()?,
            last_run_start_nanos: fields.take()?,
            total_idle_time_nanos: fields.take()?,
            total_runs: fields.take()?,
            total_run_time_nanos: fields.take()?,
        })
    }

    /// 在协商版本下编码；1.4 之前的连接返回 [`CodecError::MessageNotSupported`]。
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<Bytes, CodecError> {
        encoder::encode(
            &catalog::SCHEDULED_TASK_STATISTICS,
            &self.to_values(),
            negotiated,
        )
    }

    /// 在协商版本下解码。
    pub fn decode(bytes: Bytes, negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Self::from_values(decoder::decode(
            &catalog::SCHEDULED_TASK_STATISTICS,
            bytes,
            negotiated,
        )?)
    }
}
