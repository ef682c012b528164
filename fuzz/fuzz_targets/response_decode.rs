#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use spark_codec_response::{CodecError, DispatchTable, ProtocolVersion, Response, catalog};

/// Fuzz 输入：选中的消息、协商版本与任意负载。
///
/// - **Why**：解码器直面不可信字节，任何长度前缀都可能是伪造的；本目标要求解码只返回错误，绝不 panic、
///   绝不按伪造计数分配巨量内存。
/// - **How**：`message` 对目录长度取模选中描述符，`minor` 取模映射到 1.0..=1.4，负载原样交给分发表与强类型解码。
/// - **What**：解码成功时再编码一次，重新解码必须得到相同的值元组；强类型视图只允许以枚举越界拒绝。
#[derive(Debug, Arbitrary)]
struct DecodeCase {
    message: u8,
    minor: u8,
    payload: Vec<u8>,
}

fuzz_target!(|case: DecodeCase| {
    let descriptor = catalog::CATALOG[usize::from(case.message) % catalog::CATALOG.len()];
    let negotiated = ProtocolVersion::new(1, case.minor % 5);
    let Ok(table) = DispatchTable::standard(negotiated) else {
        return;
    };
    let payload = Bytes::from(case.payload);

    let Ok(message) = table.decode(descriptor.id, payload.clone()) else {
        return;
    };
    let reencoded = table
        .encode_id(descriptor.id, &message.values)
        .expect("decoded values must encode again");
    assert!(reencoded.len() <= payload.len() - message.trailing);
    let again = table
        .decode(descriptor.id, reencoded)
        .expect("re-encoded payload must decode");
    assert_eq!(again.values, message.values);
    assert_eq!(again.trailing, 0);

    match Response::decode_with(&table, descriptor.id, payload) {
        Ok(_) | Err(CodecError::InvalidEnumerant { .. }) => {}
        Err(err) => panic!("typed view rejected generic output: {err}"),
    }
});
