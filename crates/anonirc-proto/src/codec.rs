//! CRLF line codec for tokio.
//!
//! The decoder yields one `Result<Message, ProtocolError>` per line so a
//! single bad line never tears down the stream; only I/O errors are fatal.

use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::message::Message;
use crate::MAX_LINE_LEN;

/// Line codec producing and consuming [`Message`]s.
#[derive(Debug)]
pub struct IrcCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Bytes thrown away from an overlong line whose LF has not arrived yet.
    discarding: Option<usize>,
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new(MAX_LINE_LEN)
    }
}

impl IrcCodec {
    /// Create a codec accepting lines up to `max_len` bytes, CRLF included.
    pub fn new(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: None,
        }
    }

    fn decode_line(&self, line: &[u8]) -> Option<Result<Message, ProtocolError>> {
        if line.len() > self.max_len {
            return Some(Err(ProtocolError::MessageTooLong {
                actual: line.len(),
                limit: self.max_len,
            }));
        }

        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => return Some(Err(ProtocolError::InvalidUtf8(e.to_string()))),
        };

        if text.trim().is_empty() {
            return None;
        }
        if text.contains('\0') {
            return Some(Err(ProtocolError::IllegalControlChar('\0')));
        }

        Some(text.parse())
    }

    fn encode_message(&self, msg: &Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = msg.to_string();
        if let Some(bad) = line.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
            return Err(ProtocolError::IllegalControlChar(bad));
        }

        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

impl Decoder for IrcCodec {
    type Item = Result<Message, ProtocolError>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if let Some(dropped) = self.discarding.as_mut() {
                    *dropped += src.len();
                    src.clear();
                    self.next_index = 0;
                } else if src.len() > self.max_len {
                    // no LF within the limit: drop what we have and skip to the next LF
                    self.discarding = Some(src.len());
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if let Some(dropped) = self.discarding.take() {
                return Ok(Some(Err(ProtocolError::MessageTooLong {
                    actual: dropped + line.len(),
                    limit: self.max_len,
                })));
            }

            match self.decode_line(&line) {
                Some(item) => return Ok(Some(item)),
                // blank line: keep going
                None => continue,
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => {
                // unterminated tail of a closed stream
                src.clear();
                self.next_index = 0;
                self.discarding = None;
                Ok(None)
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encode_message(&msg, dst)
    }
}

impl Encoder<Arc<Message>> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Arc<Message>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encode_message(&msg, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::error::MessageParseError;

    fn decode_all(codec: &mut IrcCodec, buf: &mut BytesMut) -> Vec<Result<Message, ProtocolError>> {
        let mut out = Vec::new();
        while let Some(item) = codec.decode(buf).unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn splits_lines_and_waits_for_partial() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("NICK a\r\nUSER a 0 * :A\r\nPING");
        let items = decode_all(&mut codec, &mut buf);
        assert_eq!(items.len(), 2);
        assert_eq!(buf.as_ref(), b"PING");

        buf.extend_from_slice(b" tok\r\n");
        let items = decode_all(&mut codec, &mut buf);
        assert_eq!(
            items[0].as_ref().unwrap().command,
            Command::PING("tok".into(), None)
        );
    }

    #[test]
    fn skips_blank_lines() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("\r\n\r\nQUIT\r\n");
        let items = decode_all(&mut codec, &mut buf);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn bad_line_does_not_end_stream() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("KICK #a\r\nNICK b\r\n");
        let items = decode_all(&mut codec, &mut buf);
        assert!(matches!(
            items[0].as_ref().unwrap_err().parse_cause(),
            Some(MessageParseError::NotEnoughArguments { .. })
        ));
        assert!(items[1].is_ok());
    }

    #[test]
    fn overlong_line_is_discarded_up_to_lf() {
        let mut codec = IrcCodec::new(16);
        let mut buf = BytesMut::from(&b"PRIVMSG #a :aaaaaaaaaaaaaaaaaaaa"[..]);
        assert!(decode_all(&mut codec, &mut buf).is_empty());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"aaaa\r\nNICK z\r\n");
        let items = decode_all(&mut codec, &mut buf);
        assert!(matches!(
            items[0],
            Err(ProtocolError::MessageTooLong { limit: 16, .. })
        ));
        assert_eq!(
            items[1].as_ref().unwrap().command,
            Command::NICK("z".into())
        );
    }

    #[test]
    fn complete_overlong_line_reports_too_long() {
        let mut codec = IrcCodec::new(10);
        let mut buf = BytesMut::from("NICK abcdefghij\r\n");
        let items = decode_all(&mut codec, &mut buf);
        assert!(matches!(items[0], Err(ProtocolError::MessageTooLong { .. })));
    }

    #[test]
    fn eof_drops_unterminated_tail() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("NICK a\r\nPRIVMSG #x :half");
        assert!(codec.decode_eof(&mut buf).unwrap().is_some());
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn encoder_appends_crlf_and_refuses_injection() {
        let mut codec = IrcCodec::default();
        let mut dst = BytesMut::new();
        codec
            .encode(Message::from(Command::NICK("a".into())), &mut dst)
            .unwrap();
        assert_eq!(dst.as_ref(), b"NICK a\r\n");

        let evil = Message::from(Command::PRIVMSG("#a".into(), "x\r\nQUIT".into()));
        assert!(codec.encode(evil, &mut dst).is_err());
    }
}
