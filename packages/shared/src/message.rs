//! Chat message record exchanged over the test socket.
//!
//! On the wire a message is always a JSON object with exactly two string
//! keys, `name` and `str`:
//!
//! ```json
//! {"name":"Alice","str":"hello"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use thiserror::Error;

/// Errors produced while encoding or decoding a [`ChatMessage`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not valid JSON
    #[error("payload is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The payload is JSON but not a `{name, str}` object of strings
    #[error("payload is not a chat message: {0}")]
    Shape(#[source] serde_json::Error),
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            Category::Syntax | Category::Eof | Category::Io => Self::Syntax(e),
            Category::Data => Self::Shape(e),
        }
    }
}

/// A single chat message: who sent it and what they said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender identifier
    pub name: String,
    /// Message body (`str` on the wire)
    #[serde(rename = "str")]
    pub body: String,
}

impl ChatMessage {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Serialize to the JSON text carried by one frame.
    pub fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one frame's text payload.
    ///
    /// Extra keys are ignored; missing or non-string `name`/`str` are a
    /// [`CodecError::Shape`].
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_exactly_name_and_str_keys() {
        // テスト項目: エンコード結果が name と str の 2 キーだけを持つ JSON オブジェクトになる
        // given (前提条件):
        let msg = ChatMessage::new("Alice", "hello");

        // when (操作):
        let json = msg.encode().unwrap();

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["name"], "Alice");
        assert_eq!(object["str"], "hello");
    }

    #[test]
    fn test_round_trip_preserves_unicode() {
        // テスト項目: エンコード→デコードで Unicode を含む両フィールドが保持される
        // given (前提条件):
        let msg = ChatMessage::new("홍길동", "누구세요 \"quoted\" \n 🚀");

        // when (操作):
        let decoded = ChatMessage::decode(&msg.encode().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_ignores_extra_keys() {
        // テスト項目: 余分なキーがあってもデコードできる
        // given (前提条件):
        let text = r#"{"name":"Bob","str":"hi","room":"lobby"}"#;

        // when (操作):
        let msg = ChatMessage::decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(msg, ChatMessage::new("Bob", "hi"));
    }

    #[test]
    fn test_decode_rejects_non_json_as_syntax_error() {
        // テスト項目: JSON でない入力は Syntax エラーになる
        // given (前提条件):
        let text = "not json at all";

        // when (操作):
        let result = ChatMessage::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::Syntax(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_json_as_syntax_error() {
        // テスト項目: 途中で切れた JSON は Syntax エラーになる
        // given (前提条件):
        let text = r#"{"name":"Alice","str":"hel"#;

        // when (操作):
        let result = ChatMessage::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::Syntax(_))));
    }

    #[test]
    fn test_decode_rejects_missing_field_as_shape_error() {
        // テスト項目: str フィールドが欠けている場合は Shape エラーになる
        // given (前提条件):
        let text = r#"{"name":"Alice"}"#;

        // when (操作):
        let result = ChatMessage::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::Shape(_))));
    }

    #[test]
    fn test_decode_rejects_non_string_field_as_shape_error() {
        // テスト項目: フィールドが文字列でない場合は Shape エラーになる
        // given (前提条件):
        let text = r#"{"name":"Alice","str":42}"#;

        // when (操作):
        let result = ChatMessage::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::Shape(_))));
    }
}
