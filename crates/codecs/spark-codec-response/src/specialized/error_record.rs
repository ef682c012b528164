//! 远端异常记录。
//!
//! 服务端把一次失败序列化为 `Exception` 响应：错误码、类名、可空消息、栈帧列表，以及最多一层原因。
//! 这是普通负载而不是编解码失败，解码成功即得到 [`ErrorRecord`]；调用方可以把它当作
//! `std::error::Error` 继续向上抛出。

use core::fmt;

use bytes::Bytes;

use crate::catalog;
use crate::decoder;
use crate::encoder;
use crate::error::CodecError;
use crate::specialized::Fields;
use crate::structs::StackFrame;
use crate::types::Value;
use crate::version::ProtocolVersion;

/// 线上表示“没有原因”的错误码。
pub const NO_CAUSE: i32 = -1;

/// 异常的直接原因。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCause {
    /// 原因的错误码，不得为 [`NO_CAUSE`]。
    pub error_code: i32,
    /// 原因的类名。
    pub class_name: Option<String>,
}

/// 解码后的远端异常。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// 错误码。
    pub error_code: i32,
    /// 异常类名。
    pub class_name: String,
    /// 异常消息。
    pub message: Option<String>,
    /// 栈帧，栈顶在前。
    pub stack_trace: Vec<StackFrame>,
    /// 直接原因。
    pub cause: Option<ErrorCause>,
}

impl ErrorRecord {
    /// 转为完整长度的值元组。
    ///
    /// 没有原因时写 `cause_error_code = -1` 且类名为空。
    pub fn to_values(&self) -> Vec<Value> {
        let (cause_code, cause_class): (i32, Value) = match &self.cause {
            Some(cause) => (cause.error_code, cause.class_name.clone().into()),
            None => (NO_CAUSE, Value::Null),
        };
        vec![
            Value::Int32(self.error_code),
            Value::String(self.class_name.clone()),
            self.message.clone().into(),
            self.stack_trace.clone().into(),
            Value::Int32(cause_code),
            cause_class,
        ]
    }

    /// 由解码器输出的值元组构造。
    ///
    /// `cause_error_code == -1` 时忽略原因类名，原因记为 `None`。
    pub fn from_values(values: Vec<Value>) -> Result<Self, CodecError> {
        let mut fields = Fields::new(&catalog::EXCEPTION, values)?;
        let error_code = fields.take()?;
        let class_name = fields.take()?;
        let message = fields.take()?;
        let stack_trace = fields.take()?;
        let cause_code: i32 = fields.take()?;
        let cause_class: Option<String> = fields.take()?;
        let cause = (cause_code != NO_CAUSE).then(|| ErrorCause {
            error_code: cause_code,
            class_name: cause_class,
        });
        Ok(Self {
            error_code,
            class_name,
            message,
            stack_trace,
            cause,
        })
    }

    /// 原因错误码占用 [`NO_CAUSE`] 时拒绝编码，否则解码端会把原因读成 `None`。
    pub(crate) fn check_cause(&self) -> Result<(), CodecError> {
        match &self.cause {
            Some(cause) if cause.error_code == NO_CAUSE => Err(CodecError::TypeMismatch {
                message: catalog::EXCEPTION.name,
                parameter: "cause_error_code",
                expected: format!("Int32 other than {NO_CAUSE}"),
                found: "NO_CAUSE",
            }),
            _ => Ok(()),
        }
    }

    /// 在协商版本下编码。
    ///
    /// 原因错误码为 [`NO_CAUSE`] 时返回 [`CodecError::TypeMismatch`]。
    pub fn encode(&self, negotiated: ProtocolVersion) -> Result<Bytes, CodecError> {
        self.check_cause()?;
        encoder::encode(&catalog::EXCEPTION, &self.to_values(), negotiated)
    }

    /// 在协商版本下解码。
    pub fn decode(bytes: Bytes, negotiated: ProtocolVersion) -> Result<Self, CodecError> {
        Self::from_values(decoder::decode(&catalog::EXCEPTION, bytes, negotiated)?)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.class_name, self.error_code)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(cause) = &self.cause {
            match &cause.class_name {
                Some(class_name) => {
                    write!(f, "; caused by {class_name} (code {})", cause.error_code)?;
                }
                None => write!(f, "; caused by code {}", cause.error_code)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ErrorRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cause: Option<ErrorCause>) -> ErrorRecord {
        ErrorRecord {
            error_code: 12,
            class_name: "java.lang.IllegalStateException".into(),
            message: Some("queue is closed".into()),
            stack_trace: vec![StackFrame {
                declaring_class: "com.example.Queue".into(),
                method_name: "offer".into(),
                file_name: Some("Queue.java".into()),
                line_number: 88,
            }],
            cause,
        }
    }

    #[test]
    fn display_includes_cause() {
        let err = record(Some(ErrorCause {
            error_code: 3,
            class_name: Some("java.io.IOException".into()),
        }));
        assert_eq!(
            err.to_string(),
            "java.lang.IllegalStateException (code 12): queue is closed; caused by java.io.IOException (code 3)"
        );
    }

    #[test]
    fn no_cause_is_written_as_minus_one_and_null() {
        let values = record(None).to_values();
        assert_eq!(values[4], Value::Int32(NO_CAUSE));
        assert_eq!(values[5], Value::Null);
    }

    #[test]
    fn cause_with_reserved_code_is_rejected() {
        let err = record(Some(ErrorCause {
            error_code: NO_CAUSE,
            class_name: Some("java.io.IOException".into()),
        }))
        .encode(ProtocolVersion::LATEST)
        .expect_err("reserved cause code");
        assert!(matches!(
            err,
            CodecError::TypeMismatch {
                parameter: "cause_error_code",
                ..
            }
        ));
    }

    #[test]
    fn cause_class_is_ignored_without_cause_code() {
        let mut values = record(None).to_values();
        values[5] = Value::String("stale".into());
        let decoded = ErrorRecord::from_values(values).expect("record");
        assert_eq!(decoded.cause, None);
    }
}
