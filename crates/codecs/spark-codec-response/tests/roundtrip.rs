//! 全目录编解码往返性质。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：对目录中的每一条描述符、每一个协议版本，随机构造合法值元组，验证
//!   `decode(encode(values)) == values`。被门控排除的参数在生成时即填 `Value::Absent`，与解码器输出形态一致。
//! - **设计手法 (How)**：`value_for` 按 `TypeRef` 递归构造策略，可空参数与可空元素以 `prop_oneof!` 混入 `Null`；
//!   消息级门控不满足时退到最新版本，保证每个样本都可编码。
//! - **合同与边界 (What)**：字符串限定为短 ASCII，集合长度不超过 4，足以覆盖空集合、单元素与多元素三种形态。

use bytes::Bytes;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;
use spark_codec_response::{
    Address, DistributedObjectInfo, EntryView, JobPartitionState, Member, MessageDescriptor,
    ParameterDescriptor, ProtocolVersion, ScheduledTaskHandler, StackFrame, StructKind,
    TaskTarget, TypeRef, Value, catalog, decode, encode,
};

fn text() -> BoxedStrategy<String> {
    "[a-z0-9.]{0,12}".boxed()
}

fn blob() -> BoxedStrategy<Bytes> {
    vec(any::<u8>(), 0..16).prop_map(Bytes::from).boxed()
}

fn address() -> BoxedStrategy<Address> {
    (text(), any::<i32>())
        .prop_map(|(host, port)| Address::new(host, port))
        .boxed()
}

fn struct_value(kind: StructKind) -> BoxedStrategy<Value> {
    match kind {
        StructKind::Address => address().prop_map(Value::from).boxed(),
        StructKind::Member => (address(), text(), any::<bool>(), vec((text(), text()), 0..3))
            .prop_map(|(address, uuid, lite_member, attributes)| {
                Value::from(Member {
                    address,
                    uuid,
                    lite_member,
                    attributes,
                })
            })
            .boxed(),
        StructKind::DistributedObjectInfo => (text(), text())
            .prop_map(|(service_name, name)| {
                Value::from(DistributedObjectInfo { service_name, name })
            })
            .boxed(),
        StructKind::EntryView => (blob(), blob(), any::<[i64; 10]>())
            .prop_map(|(key, value, n)| {
                Value::from(EntryView {
                    key,
                    value,
                    cost: n[0],
                    creation_time: n[1],
                    expiration_time: n[2],
                    hits: n[3],
                    last_access_time: n[4],
                    last_stored_time: n[5],
                    last_update_time: n[6],
                    version: n[7],
                    eviction_criteria_number: n[8],
                    ttl: n[9],
                })
            })
            .boxed(),
        StructKind::JobPartitionState => (address(), text())
            .prop_map(|(owner, state)| Value::from(JobPartitionState { owner, state }))
            .boxed(),
        StructKind::StackFrame => (text(), text(), option::of(text()), any::<i32>())
            .prop_map(|(declaring_class, method_name, file_name, line_number)| {
                Value::from(StackFrame {
                    declaring_class,
                    method_name,
                    file_name,
                    line_number,
                })
            })
            .boxed(),
        StructKind::ScheduledTaskHandler => (
            prop_oneof![
                any::<i32>().prop_map(TaskTarget::Partition),
                address().prop_map(TaskTarget::Member),
            ],
            text(),
            text(),
        )
            .prop_map(|(target, scheduler_name, task_name)| {
                Value::from(ScheduledTaskHandler {
                    target,
                    scheduler_name,
                    task_name,
                })
            })
            .boxed(),
    }
}

fn value_for(ty: &'static TypeRef) -> BoxedStrategy<Value> {
    match ty {
        TypeRef::Void => Just(Value::Void).boxed(),
        TypeRef::Boolean => any::<bool>().prop_map(Value::Boolean).boxed(),
        TypeRef::Byte => any::<u8>().prop_map(Value::Byte).boxed(),
        TypeRef::Int32 => any::<i32>().prop_map(Value::Int32).boxed(),
        TypeRef::Int64 => any::<i64>().prop_map(Value::Int64).boxed(),
        TypeRef::Utf8String => text().prop_map(Value::String).boxed(),
        TypeRef::Blob => blob().prop_map(Value::Blob).boxed(),
        TypeRef::List {
            element,
            nullable_elements,
        } => {
            let element = if *nullable_elements {
                prop_oneof![Just(Value::Null), value_for(element)].boxed()
            } else {
                value_for(element)
            };
            vec(element, 0..4).prop_map(Value::List).boxed()
        }
        TypeRef::PairList { key, value } => vec((value_for(key), value_for(value)), 0..4)
            .prop_map(Value::PairList)
            .boxed(),
        TypeRef::Struct(kind) => struct_value(*kind),
    }
}

fn parameter_value(parameter: &'static ParameterDescriptor) -> BoxedStrategy<Value> {
    if parameter.nullable {
        prop_oneof![Just(Value::Null), value_for(&parameter.ty)].boxed()
    } else {
        value_for(&parameter.ty)
    }
}

fn tuple_for(
    descriptor: &'static MessageDescriptor,
    negotiated: ProtocolVersion,
) -> BoxedStrategy<Vec<Value>> {
    descriptor
        .parameters
        .iter()
        .map(|parameter| {
            if parameter.is_present_at(negotiated) {
                parameter_value(parameter)
            } else {
                Just(Value::Absent).boxed()
            }
        })
        .collect::<Vec<_>>()
        .boxed()
}

fn version() -> impl Strategy<Value = ProtocolVersion> {
    (0u8..=4).prop_map(|minor| ProtocolVersion::new(1, minor))
}

fn case() -> impl Strategy<Value = (&'static MessageDescriptor, ProtocolVersion, Vec<Value>)> {
    (0..catalog::CATALOG.len(), version()).prop_flat_map(|(index, negotiated)| {
        let descriptor: &'static MessageDescriptor = catalog::CATALOG[index];
        let negotiated = if descriptor.is_supported_at(negotiated) {
            negotiated
        } else {
            ProtocolVersion::LATEST
        };
        tuple_for(descriptor, negotiated).prop_map(move |values| (descriptor, negotiated, values))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_every_descriptor_round_trips((descriptor, negotiated, values) in case()) {
        let bytes = encode(descriptor, &values, negotiated)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let decoded = decode(descriptor, bytes, negotiated)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn prop_encoding_is_deterministic((descriptor, negotiated, values) in case()) {
        let first = encode(descriptor, &values, negotiated);
        let second = encode(descriptor, &values, negotiated);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_nullable_data_keeps_null_and_empty_apart(payload in option::of(blob())) {
        let value = Value::from(payload.clone());
        let bytes = encode(&catalog::DATA_RESPONSE, &[value.clone()], ProtocolVersion::LATEST)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(bytes.len(), payload.as_ref().map_or(1, |blob| 5 + blob.len()));
        let decoded = decode(&catalog::DATA_RESPONSE, bytes, ProtocolVersion::LATEST)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(decoded, vec![value]);
    }

    #[test]
    fn prop_truncated_payload_never_decodes(
        (descriptor, negotiated, values) in case(),
        cut in 1usize..8,
    ) {
        let bytes = encode(descriptor, &values, negotiated)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assume!(!bytes.is_empty());
        let keep = bytes.len().saturating_sub(cut);
        prop_assert!(decode(descriptor, bytes.slice(..keep), negotiated).is_err());
    }
}

#[test]
fn nullable_elements_preserve_positions() {
    let values = vec![Value::list([
        Value::Null,
        Value::blob(Bytes::from_static(b"one")),
        Value::Null,
        Value::blob(Bytes::new()),
    ])];
    let bytes = encode(
        &catalog::LIST_DATA_MAYBE_NULL_ELEMENTS,
        &values,
        ProtocolVersion::V1_0,
    )
    .expect("encode");
    // count + [null] + [flag, len, "one"] + [null] + [flag, len]
    assert_eq!(bytes.len(), 4 + 1 + (1 + 4 + 3) + 1 + (1 + 4));
    let decoded = decode(
        &catalog::LIST_DATA_MAYBE_NULL_ELEMENTS,
        bytes,
        ProtocolVersion::V1_0,
    )
    .expect("decode");
    assert_eq!(decoded, values);
}

#[test]
fn null_and_empty_blob_encode_differently() {
    let null = encode(&catalog::DATA_RESPONSE, &[Value::Null], ProtocolVersion::V1_0)
        .expect("null");
    let empty = encode(
        &catalog::DATA_RESPONSE,
        &[Value::blob(Bytes::new())],
        ProtocolVersion::V1_0,
    )
    .expect("empty");
    assert_ne!(null, empty);
    assert_eq!(&empty[..], &[0, 0, 0, 0, 0]);
}
