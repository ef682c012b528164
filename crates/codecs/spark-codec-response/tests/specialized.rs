//! 类型化视图与分发表的端到端场景。

use bytes::{Buf, Bytes};
use spark_codec_response::{
    Address, CodecConfig, CodecError, DispatchTable, EntryPage, ErrorCategory, ErrorCause,
    ErrorRecord, NO_CAUSE, ProtocolVersion, Response, ScheduledTaskHandler,
    ScheduledTaskStatistics, SchemaRegistry, StackFrame, TaskTarget, TrailingBytesPolicy, Value,
    catalog,
};

fn frame(line_number: i32) -> StackFrame {
    StackFrame {
        declaring_class: "com.example.Service".into(),
        method_name: "call".into(),
        file_name: None,
        line_number,
    }
}

#[test]
fn exception_without_cause_reads_nothing_further() {
    let record = ErrorRecord {
        error_code: 7,
        class_name: "java.lang.RuntimeException".into(),
        message: None,
        stack_trace: vec![frame(10), frame(-1)],
        cause: None,
    };
    let bytes = record.encode(ProtocolVersion::LATEST).expect("encode");
    // 末尾 5 字节：cause_error_code = -1 + 类名空标志。
    let tail = &bytes[bytes.len() - 5..];
    assert_eq!(&tail[..4], &NO_CAUSE.to_le_bytes());
    assert_eq!(tail[4], 1);

    let decoded = ErrorRecord::decode(bytes, ProtocolVersion::LATEST).expect("decode");
    assert_eq!(decoded, record);
    assert!(decoded.cause.is_none());
}

#[test]
fn exception_with_cause_round_trips_and_is_an_error() {
    let record = ErrorRecord {
        error_code: 21,
        class_name: "com.hazelcast.core.OperationTimeoutException".into(),
        message: Some("timed out".into()),
        stack_trace: Vec::new(),
        cause: Some(ErrorCause {
            error_code: 4,
            class_name: Some("java.util.concurrent.TimeoutException".into()),
        }),
    };
    let bytes = record.encode(ProtocolVersion::V1_0).expect("encode");
    let decoded = ErrorRecord::decode(bytes, ProtocolVersion::V1_0).expect("decode");
    assert_eq!(decoded, record);

    let as_error: Box<dyn std::error::Error> = Box::new(decoded);
    assert!(as_error.to_string().contains("timed out"));
}

#[test]
fn cause_code_reserved_for_no_cause_is_refused() {
    let record = ErrorRecord {
        error_code: 1,
        class_name: "X".into(),
        message: None,
        stack_trace: Vec::new(),
        cause: Some(ErrorCause {
            error_code: NO_CAUSE,
            class_name: Some("Y".into()),
        }),
    };
    let err = record
        .encode(ProtocolVersion::LATEST)
        .expect_err("cause would read back as None");
    assert_eq!(err.code(), "response.codec.type_mismatch");
    assert!(matches!(
        err,
        CodecError::TypeMismatch {
            message: "Exception",
            parameter: "cause_error_code",
            ..
        }
    ));

    let via_response = Response::Exception(Box::new(record)).encode(ProtocolVersion::LATEST);
    assert_eq!(via_response, Err(err));
}

#[test]
fn entries_with_cursor_keeps_cursor_verbatim() {
    let page = EntryPage {
        cursor: 42,
        items: vec![
            (Bytes::from_static(b"k1"), Bytes::from_static(b"v1")),
            (Bytes::from_static(b"k2"), Bytes::from_static(b"v2")),
        ],
    };
    let mut bytes = page.encode(ProtocolVersion::LATEST).expect("encode");
    assert_eq!(bytes.len(), 4 + 4 + 2 * 2 * (4 + 2));

    let decoded = EntryPage::decode(bytes.clone(), ProtocolVersion::LATEST).expect("decode");
    assert_eq!(decoded, page);

    assert_eq!(bytes.get_i32_le(), 42);
    assert_eq!(bytes.get_i32_le(), 2);
}

#[test]
fn statistics_and_handlers_route_through_dispatch() {
    let table = DispatchTable::standard(ProtocolVersion::V1_4).expect("table");
    let stats = ScheduledTaskStatistics {
        created_at: 1_700_000_000_000,
        total_runs: 12,
        total_run_time_nanos: 9_000,
        ..ScheduledTaskStatistics::default()
    };
    let response = Response::ScheduledTaskStatistics(stats);
    let (id, payload) = response.encode(table.negotiated()).expect("encode");
    assert_eq!(id, catalog::ids::SCHEDULED_TASK_STATISTICS);
    assert_eq!(
        Response::decode_with(&table, id, payload).expect("decode"),
        response
    );

    let handlers = Response::ListScheduledTaskHandler(vec![
        ScheduledTaskHandler {
            target: TaskTarget::Partition(17),
            scheduler_name: "s".into(),
            task_name: "t1".into(),
        },
        ScheduledTaskHandler {
            target: TaskTarget::Member(Address::new("10.1.1.1", 5701)),
            scheduler_name: "s".into(),
            task_name: "t2".into(),
        },
    ]);
    let (id, payload) = handlers.encode(table.negotiated()).expect("encode");
    assert_eq!(
        Response::decode_with(&table, id, payload).expect("decode"),
        handlers
    );
}

#[test]
fn strict_table_rejects_trailing_bytes() {
    let registry = SchemaRegistry::standard().expect("registry");
    let config = CodecConfig {
        trailing_bytes: TrailingBytesPolicy::Reject,
        ..CodecConfig::default()
    };
    let table = DispatchTable::with_config(registry, ProtocolVersion::LATEST, &config);
    let err = table
        .decode(catalog::ids::BOOLEAN, Bytes::from_static(&[1, 0]))
        .expect_err("one trailing byte");
    assert_eq!(
        err,
        CodecError::TrailingBytes {
            message: "Boolean",
            trailing: 1,
        }
    );
    assert_eq!(err.category(), ErrorCategory::CorruptFrame);

    let lenient = DispatchTable::standard(ProtocolVersion::LATEST).expect("table");
    let message = lenient
        .decode(catalog::ids::BOOLEAN, Bytes::from_static(&[1, 0]))
        .expect("tolerated");
    assert_eq!(message.values, vec![Value::Boolean(true)]);
    assert_eq!(message.trailing, 1);
}

#[test]
fn generic_and_typed_paths_agree() {
    let table = DispatchTable::standard(ProtocolVersion::LATEST).expect("table");
    let (id, payload) = table
        .encode(
            "ReadResultSet",
            &[
                Value::Int32(3),
                Value::list([Bytes::from_static(b"a"), Bytes::from_static(b"b")]),
            ],
        )
        .expect("generic encode");
    match Response::decode_with(&table, id, payload).expect("typed decode") {
        Response::ReadResultSet(set) => {
            assert_eq!(set.read_count, 3);
            assert_eq!(set.items.len(), 2);
        }
        other => panic!("unexpected response {other:?}"),
    }
}

#[test]
fn unknown_id_is_an_unknown_message() {
    let err = Response::decode(4_242, Bytes::new(), ProtocolVersion::LATEST)
        .expect_err("unknown id");
    assert_eq!(err.code(), "response.codec.unknown_id");
    assert_eq!(err.category(), ErrorCategory::UnknownMessage);
}
