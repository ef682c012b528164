//! 线上原语读写。
//!
//! 所有定宽整数统一小端序；字符串与字节块均为 `Int32` 长度前缀；可空值前置 1 字节空标志
//! （`1` 表示为空且后续无内容，`0` 表示后续紧跟值）。读取端的每一次取数都先做剩余长度检查，
//! 绝不越过缓冲末尾。

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::CodecError;

pub(crate) const IS_NULL: u8 = 1;
pub(crate) const NOT_NULL: u8 = 0;

/// 顺序写入器，记录当前消息与参数名以便报告长度溢出。
pub(crate) struct WireWriter {
    buf: BytesMut,
    message: &'static str,
}

impl WireWriter {
    pub(crate) fn with_capacity(message: &'static str, capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            message,
        }
    }

    pub(crate) fn message(&self) -> &'static str {
        self.message
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn put_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub(crate) fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub(crate) fn put_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub(crate) fn put_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    pub(crate) fn put_null_flag(&mut self, is_null: bool) {
        self.buf.put_u8(if is_null { IS_NULL } else { NOT_NULL });
    }

    /// 写入长度或计数前缀；超过 `i32::MAX` 的集合无法在线上表达。
    pub(crate) fn put_len(&mut self, len: usize) -> Result<(), CodecError> {
        let prefix = i32::try_from(len).map_err(|_| CodecError::FrameTooLarge {
            len,
            limit: i32::MAX as usize,
        })?;
        self.buf.put_i32_le(prefix);
        Ok(())
    }

    pub(crate) fn put_str(&mut self, value: &str) -> Result<(), CodecError> {
        self.put_blob(value.as_bytes())
    }

    pub(crate) fn put_blob(&mut self, value: &[u8]) -> Result<(), CodecError> {
        self.put_len(value.len())?;
        self.buf.put_slice(value);
        Ok(())
    }

    pub(crate) fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// 顺序读取器。
///
/// `Blob` 通过 `Bytes::split_to` 零拷贝切出，与输入缓冲共享底层存储。
pub(crate) struct WireReader {
    buf: Bytes,
    total: usize,
    message: &'static str,
    field: &'static str,
    max_collection_len: usize,
}

impl WireReader {
    pub(crate) fn new(buf: Bytes, message: &'static str, max_collection_len: usize) -> Self {
        Self {
            total: buf.len(),
            buf,
            message,
            field: "",
            max_collection_len,
        }
    }

    /// 切换当前参数名，后续错误以此定位。
    pub(crate) fn enter(&mut self, field: &'static str) {
        self.field = field;
    }

    pub(crate) fn message(&self) -> &'static str {
        self.message
    }

    pub(crate) fn field(&self) -> &'static str {
        self.field
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub(crate) fn consumed(&self) -> usize {
        self.total - self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(CodecError::TruncatedMessage {
                message: self.message,
                field: self.field,
                needed,
                remaining,
            });
        }
        Ok(())
    }

    fn malformed(&self, declared: i64) -> CodecError {
        CodecError::MalformedLength {
            message: self.message,
            field: self.field,
            declared,
            remaining: self.buf.remaining(),
        }
    }

    pub(crate) fn get_bool(&mut self) -> Result<bool, CodecError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8() != 0)
    }

    pub(crate) fn get_u8(&mut self) -> Result<u8, CodecError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn get_i32(&mut self) -> Result<i32, CodecError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    pub(crate) fn get_i64(&mut self) -> Result<i64, CodecError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64_le())
    }

    /// 读取空标志，返回值为真表示“为空”。
    pub(crate) fn get_null_flag(&mut self) -> Result<bool, CodecError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8() != NOT_NULL)
    }

    fn get_len(&mut self) -> Result<usize, CodecError> {
        let declared = self.get_i32()?;
        usize::try_from(declared).map_err(|_| self.malformed(i64::from(declared)))
    }

    pub(crate) fn get_blob(&mut self) -> Result<Bytes, CodecError> {
        let len = self.get_len()?;
        if len > self.buf.remaining() {
            return Err(self.malformed(len as i64));
        }
        Ok(self.buf.split_to(len))
    }

    pub(crate) fn get_string(&mut self) -> Result<String, CodecError> {
        let raw = self.get_blob()?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8 {
            message: self.message,
            field: self.field,
        })
    }

    /// 读取集合计数前缀。
    ///
    /// `min_element_len` 为单个元素的最小线上长度；声明个数乘以它仍超过剩余字节时，
    /// 直接判为长度畸形，避免按攻击者声明的个数预分配。
    pub(crate) fn get_count(&mut self, min_element_len: usize) -> Result<usize, CodecError> {
        let count = self.get_len()?;
        if count > self.max_collection_len
            || count.saturating_mul(min_element_len) > self.buf.remaining()
        {
            return Err(self.malformed(count as i64));
        }
        Ok(count)
    }
}
