//! 内置响应目录。
//!
//! 本文件是响应线上形状的唯一事实来源：通用编解码引擎、分发表与类型化视图都从这里读取描述符。
//! 新增字段只能追加在参数列表末尾并标注 `since`；已发布的 id 与参数顺序不可变更。

use crate::schema::{MessageDescriptor, ParameterDescriptor as P};
use crate::types::{StructKind, TypeRef};
use crate::version::ProtocolVersion;

/// 稳定的消息 id 常量。
pub mod ids {
    /// 无返回值。
    pub const VOID: i32 = 100;
    /// 布尔结果。
    pub const BOOLEAN: i32 = 101;
    /// 32 位整数结果。
    pub const INTEGER: i32 = 102;
    /// 64 位整数结果。
    pub const LONG: i32 = 103;
    /// 字符串结果。
    pub const STRING: i32 = 104;
    /// 可空的序列化字节。
    pub const DATA: i32 = 105;
    /// 序列化字节列表。
    pub const LIST_DATA: i32 = 106;
    /// 认证结果。
    pub const AUTHENTICATION: i32 = 107;
    /// 分区表。
    pub const PARTITIONS: i32 = 108;
    /// 远端异常。
    pub const EXCEPTION: i32 = 109;
    /// 分布式对象列表。
    pub const LIST_DISTRIBUTED_OBJECT: i32 = 110;
    /// 条目快照。
    pub const ENTRY_VIEW: i32 = 111;
    /// 作业进度。
    pub const JOB_PROCESS_INFO: i32 = 112;
    /// Ringbuffer 读取结果。
    pub const READ_RESULT_SET: i32 = 115;
    /// 缓存键迭代批次。
    pub const CACHE_KEY_ITERATOR_RESULT: i32 = 116;
    /// 键值对列表。
    pub const LIST_ENTRY: i32 = 117;
    /// 带游标的条目批次。
    pub const ENTRIES_WITH_CURSOR: i32 = 118;
    /// 元素可空的序列化字节列表。
    pub const LIST_DATA_MAYBE_NULL_ELEMENTS: i32 = 119;
    /// 定时任务句柄。
    pub const SCHEDULED_TASK_HANDLER: i32 = 120;
    /// 定时任务运行统计。
    pub const SCHEDULED_TASK_STATISTICS: i32 = 121;
    /// 定时任务句柄列表。
    pub const LIST_SCHEDULED_TASK_HANDLER: i32 = 122;
}

const DATA: TypeRef = TypeRef::Blob;
const STRING: TypeRef = TypeRef::Utf8String;
const ADDRESS: TypeRef = TypeRef::Struct(StructKind::Address);
const MEMBER: TypeRef = TypeRef::Struct(StructKind::Member);
const HANDLER: TypeRef = TypeRef::Struct(StructKind::ScheduledTaskHandler);
const LIST_DATA: TypeRef = TypeRef::List {
    element: &DATA,
    nullable_elements: false,
};
const DATA_ENTRIES: TypeRef = TypeRef::PairList {
    key: &DATA,
    value: &DATA,
};

/// `Void()`
pub static VOID: MessageDescriptor = MessageDescriptor::new(ids::VOID, "Void", &[]);

/// `Boolean(response)`
pub static BOOLEAN: MessageDescriptor = MessageDescriptor::new(
    ids::BOOLEAN,
    "Boolean",
    &[P::new("response", TypeRef::Boolean)],
);

/// `Integer(response)`
pub static INTEGER: MessageDescriptor =
    MessageDescriptor::new(ids::INTEGER, "Integer", &[P::new("response", TypeRef::Int32)]);

/// `Long(response)`
pub static LONG: MessageDescriptor =
    MessageDescriptor::new(ids::LONG, "Long", &[P::new("response", TypeRef::Int64)]);

/// `String(response)`
pub static STRING_RESPONSE: MessageDescriptor =
    MessageDescriptor::new(ids::STRING, "String", &[P::new("response", STRING)]);

/// `Data(nullable response)`
pub static DATA_RESPONSE: MessageDescriptor =
    MessageDescriptor::new(ids::DATA, "Data", &[P::new("response", DATA).nullable()]);

/// `ListData(response)`
pub static LIST_DATA_RESPONSE: MessageDescriptor =
    MessageDescriptor::new(ids::LIST_DATA, "ListData", &[P::new("response", LIST_DATA)]);

/// `ListDataMaybeNullElements(response)`：元素逐个带空标志。
pub static LIST_DATA_MAYBE_NULL_ELEMENTS: MessageDescriptor = MessageDescriptor::new(
    ids::LIST_DATA_MAYBE_NULL_ELEMENTS,
    "ListDataMaybeNullElements",
    &[P::new(
        "response",
        TypeRef::List {
            element: &DATA,
            nullable_elements: true,
        },
    )],
);

/// `ListEntry(response)`
pub static LIST_ENTRY: MessageDescriptor = MessageDescriptor::new(
    ids::LIST_ENTRY,
    "ListEntry",
    &[P::new("response", DATA_ENTRIES)],
);

/// `Authentication(...)`：末尾两个参数自 1.3 起出现。
pub static AUTHENTICATION: MessageDescriptor = MessageDescriptor::new(
    ids::AUTHENTICATION,
    "Authentication",
    &[
        P::new("status", TypeRef::Byte),
        P::new("address", ADDRESS).nullable(),
        P::new("uuid", STRING).nullable(),
        P::new("owner_uuid", STRING).nullable(),
        P::new("serialization_version", TypeRef::Byte),
        P::new("server_hazelcast_version", STRING).since(ProtocolVersion::V1_3),
        P::new(
            "client_unregistered_members",
            TypeRef::List {
                element: &MEMBER,
                nullable_elements: false,
            },
        )
        .nullable()
        .since(ProtocolVersion::V1_3),
    ],
);

/// `Partitions(partitions)`：成员地址到其持有分区 id 列表的映射。
pub static PARTITIONS: MessageDescriptor = MessageDescriptor::new(
    ids::PARTITIONS,
    "Partitions",
    &[P::new(
        "partitions",
        TypeRef::PairList {
            key: &ADDRESS,
            value: &TypeRef::List {
                element: &TypeRef::Int32,
                nullable_elements: false,
            },
        },
    )],
);

/// `ListDistributedObject(response)`
pub static LIST_DISTRIBUTED_OBJECT: MessageDescriptor = MessageDescriptor::new(
    ids::LIST_DISTRIBUTED_OBJECT,
    "ListDistributedObject",
    &[P::new(
        "response",
        TypeRef::List {
            element: &TypeRef::Struct(StructKind::DistributedObjectInfo),
            nullable_elements: false,
        },
    )],
);

/// `EntryView(nullable response)`
pub static ENTRY_VIEW: MessageDescriptor = MessageDescriptor::new(
    ids::ENTRY_VIEW,
    "EntryView",
    &[P::new("response", TypeRef::Struct(StructKind::EntryView)).nullable()],
);

/// `JobProcessInfo(job_partition_states, process_records)`
pub static JOB_PROCESS_INFO: MessageDescriptor = MessageDescriptor::new(
    ids::JOB_PROCESS_INFO,
    "JobProcessInfo",
    &[
        P::new(
            "job_partition_states",
            TypeRef::List {
                element: &TypeRef::Struct(StructKind::JobPartitionState),
                nullable_elements: false,
            },
        ),
        P::new("process_records", TypeRef::Int32),
    ],
);

/// `CacheKeyIteratorResult(table_index, keys)`：`table_index` 为不透明游标。
pub static CACHE_KEY_ITERATOR_RESULT: MessageDescriptor = MessageDescriptor::new(
    ids::CACHE_KEY_ITERATOR_RESULT,
    "CacheKeyIteratorResult",
    &[
        P::new("table_index", TypeRef::Int32),
        P::new("keys", LIST_DATA),
    ],
);

/// `Exception(...)`：原因只展开一层，无原因时 `cause_error_code == -1`。
pub static EXCEPTION: MessageDescriptor = MessageDescriptor::new(
    ids::EXCEPTION,
    "Exception",
    &[
        P::new("error_code", TypeRef::Int32),
        P::new("class_name", STRING),
        P::new("message", STRING).nullable(),
        P::new(
            "stack_trace",
            TypeRef::List {
                element: &TypeRef::Struct(StructKind::StackFrame),
                nullable_elements: false,
            },
        ),
        P::new("cause_error_code", TypeRef::Int32),
        P::new("cause_class_name", STRING).nullable(),
    ],
);

/// `ReadResultSet(read_count, items)`
pub static READ_RESULT_SET: MessageDescriptor = MessageDescriptor::new(
    ids::READ_RESULT_SET,
    "ReadResultSet",
    &[
        P::new("read_count", TypeRef::Int32),
        P::new("items", LIST_DATA),
    ],
);

/// `EntriesWithCursor(table_index, entries)`：`table_index` 为不透明游标。
pub static ENTRIES_WITH_CURSOR: MessageDescriptor = MessageDescriptor::new(
    ids::ENTRIES_WITH_CURSOR,
    "EntriesWithCursor",
    &[
        P::new("table_index", TypeRef::Int32),
        P::new("entries", DATA_ENTRIES),
    ],
);

/// `ScheduledTaskHandler(handler)`，自 1.4 起。
pub static SCHEDULED_TASK_HANDLER: MessageDescriptor = MessageDescriptor::new(
    ids::SCHEDULED_TASK_HANDLER,
    "ScheduledTaskHandler",
    &[P::new("handler", HANDLER)],
)
.since(ProtocolVersion::V1_4);

/// `ScheduledTaskStatistics(...)`：八个 `Int64` 统计量，自 1.4 起。
pub static SCHEDULED_TASK_STATISTICS: MessageDescriptor = MessageDescriptor::new(
    ids::SCHEDULED_TASK_STATISTICS,
    "ScheduledTaskStatistics",
    &[
        P::new("created_at", TypeRef::Int64),
        P::new("first_run_start_nanos", TypeRef::Int64),
        P::new("last_idle_time_nanos", TypeRef::Int64),
        P::new("last_run_end_nanos", TypeRef::Int64),
        P::new("last_run_start_nanos", TypeRef::Int64),
        P::new("total_idle_time_nanos", TypeRef::Int64),
        P::new("total_runs", TypeRef::Int64),
        P::new("total_run_time_nanos", TypeRef::Int64),
    ],
)
.since(ProtocolVersion::V1_4);

/// `ListScheduledTaskHandler(handlers)`，自 1.4 起。
pub static LIST_SCHEDULED_TASK_HANDLER: MessageDescriptor = MessageDescriptor::new(
    ids::LIST_SCHEDULED_TASK_HANDLER,
    "ListScheduledTaskHandler",
    &[P::new(
        "handlers",
        TypeRef::List {
            element: &HANDLER,
            nullable_elements: false,
        },
    )],
)
.since(ProtocolVersion::V1_4);

/// 全部内置描述符，按 id 升序。
pub static CATALOG: &[&MessageDescriptor] = &[
    &VOID,
    &BOOLEAN,
    &INTEGER,
    &LONG,
    &STRING_RESPONSE,
    &DATA_RESPONSE,
    &LIST_DATA_RESPONSE,
    &AUTHENTICATION,
    &PARTITIONS,
    &EXCEPTION,
    &LIST_DISTRIBUTED_OBJECT,
    &ENTRY_VIEW,
    &JOB_PROCESS_INFO,
    &READ_RESULT_SET,
    &CACHE_KEY_ITERATOR_RESULT,
    &LIST_ENTRY,
    &ENTRIES_WITH_CURSOR,
    &LIST_DATA_MAYBE_NULL_ELEMENTS,
    &SCHEDULED_TASK_HANDLER,
    &SCHEDULED_TASK_STATISTICS,
    &LIST_SCHEDULED_TASK_HANDLER,
];
