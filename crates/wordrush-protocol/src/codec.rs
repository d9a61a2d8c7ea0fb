//! Codec trait and implementations for the Wordrush wire format.
//!
//! A codec converts between the typed protocol messages in
//! [`types`](crate::ClientAction) and the raw bytes carried by a
//! connection. Everything above this layer works with [`ServerMessage`]
//! and [`ClientAction`]; everything below it works with `Vec<u8>`.
//!
//! The server speaks internally tagged JSON, so [`JsonCodec`] is the only
//! implementation shipped today. The trait keeps the client runtime
//! independent of that choice, and lets tests plug in a codec that fails
//! on purpose.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientAction, ProtocolError, ServerMessage};

/// Largest action frame the server reads, in bytes. Longer frames are
/// dropped there without a reply.
pub const MAX_ACTION_FRAME_LEN: usize = 500;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → the codec is shared between the client runtime task
///   and the action emitter handed out to the UI.
/// - `'static` → it owns everything it needs, so it can live inside a
///   spawned Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Encodes an outgoing client action.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` if the frame is over
    /// [`MAX_ACTION_FRAME_LEN`] bytes.
    fn encode_action(&self, action: &ClientAction) -> Result<Vec<u8>, ProtocolError> {
        let bytes = self.encode(action)?;
        if bytes.len() > MAX_ACTION_FRAME_LEN {
            return Err(ProtocolError::InvalidMessage(format!(
                "action frame is {} bytes (max {MAX_ACTION_FRAME_LEN})",
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    /// Decodes one inbound frame into a server message.
    ///
    /// An unknown `"type"` tag is a decode error, not a panic: the caller
    /// drops the frame and keeps the session alive.
    fn decode_message(&self, data: &[u8]) -> Result<ServerMessage, ProtocolError> {
        self.decode(data)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use wordrush_protocol::{ClientAction, Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let bytes = codec
///     .encode_action(&ClientAction::ChatMessage { content: "gg".into() })
///     .unwrap();
/// assert_eq!(bytes, br#"{"type":"ChatMessage","content":"gg"}"#);
///
/// let msg = codec
///     .decode_message(br#"{"type":"StartingCountdown","time_left":7}"#)
///     .unwrap();
/// assert_eq!(msg, ServerMessage::StartingCountdown { time_left: 7 });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{MessageKind, PlayerId};

    #[test]
    fn test_decode_message_reads_text_frame_bytes() {
        let codec = JsonCodec;
        let msg = codec
            .decode_message(br#"{"type":"Error","content":"not the room owner"}"#)
            .unwrap();
        assert_eq!(msg.kind(), MessageKind::Error);
    }

    #[test]
    fn test_decode_message_unknown_tag_is_decode_error() {
        let codec = JsonCodec;
        let err = codec
            .decode_message(br#"{"type":"Teleport","to":"moon"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
        assert!(err.to_string().starts_with("decode failed"));
    }

    #[test]
    fn test_decode_message_malformed_payload_is_decode_error() {
        let codec = JsonCodec;
        // `turn` is required on WordBombPrompt.
        let err = codec
            .decode_message(br#"{"type":"WordBombPrompt","life_change":0,"prompt":"ab"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_decode_message_garbage_is_decode_error() {
        let codec = JsonCodec;
        assert!(codec.decode_message(b"\x00\x01not json").is_err());
    }

    #[test]
    fn test_encode_action_word_bomb_guess() {
        let codec = JsonCodec;
        let bytes = codec
            .encode_action(&ClientAction::WordBombGuess { word: "cat".into() })
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["type"], "WordBombGuess");
        assert_eq!(json["word"], "cat");
    }

    #[test]
    fn test_encode_action_over_frame_limit_is_invalid() {
        let codec = JsonCodec;
        // 250 characters, but four bytes each.
        let content = "\u{1F600}".repeat(250);
        let err = codec
            .encode_action(&ClientAction::ChatMessage { content })
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
        assert!(err.to_string().contains("max 500"));

        let content = "x".repeat(250);
        let bytes = codec
            .encode_action(&ClientAction::ChatMessage { content })
            .unwrap();
        assert!(bytes.len() <= MAX_ACTION_FRAME_LEN);
    }

    #[test]
    fn test_decode_message_ids_stay_opaque_strings() {
        let codec = JsonCodec;
        let msg = codec
            .decode_message(br#"{"type":"WordBombInput","uuid":"9f1c-77","input":"ca"}"#)
            .unwrap();
        assert_eq!(
            msg,
            ServerMessage::WordBombInput {
                uuid: PlayerId::from("9f1c-77"),
                input: "ca".into(),
            }
        );
    }
}
