//! Incremental decoder for newline-delimited `data:` event streams.
//!
//! Generation backends answer with a stream of lines such as:
//!
//! ```text
//! data: {"response":"Hel"}
//! data: {"response":"lo"}
//! data: [DONE]
//! ```
//!
//! The transport delivers this text in chunks whose boundaries have nothing
//! to do with line boundaries: a chunk may end in the middle of a line, in
//! the middle of a JSON payload, or even in the middle of a multi-byte UTF-8
//! character. [`FrameDecoder`] absorbs chunks one at a time and returns the
//! events that became complete with each one.
//!
//! # Decoding rules
//!
//! | Line                         | Result                                   |
//! |------------------------------|------------------------------------------|
//! | `data: [DONE]`               | [`DecodedEvent::Done`], decoder finishes |
//! | `data: {"response":"text"}`  | [`DecodedEvent::Token`] with `text`      |
//! | `data: {"response":""}`      | nothing                                  |
//! | `data:` (empty payload)      | nothing                                  |
//! | `data: {"respo` (unparsable) | buffered until later lines complete it   |
//! | anything else                | nothing (framing noise)                  |
//!
//! # Re-buffering
//!
//! A `data:` line whose payload does not parse is kept as a pending fragment.
//! Following lines are appended to it (joined by the newline that separated
//! them) until the payload parses, a new `data:` line supersedes it, or the
//! stream ends. The amount of unresolved text is bounded by
//! `max_buffered_bytes`; exceeding it is a [`DecodeError`].

use super::event::DecodedEvent;
use crate::core::error::DecodeError;

/// Prefix marking a meaningful line.
const DATA_PREFIX: &str = "data:";

/// Payload signalling the end of the stream.
const DONE_PAYLOAD: &str = "[DONE]";

/// Default bound on unresolved text held by the decoder (1 MiB).
pub const DEFAULT_MAX_BUFFERED_BYTES: usize = 1024 * 1024;

/// Outcome of parsing one frame payload.
enum Payload {
    /// Parsed, carrying a non-empty `response` text.
    Text(String),
    /// Parsed, but there is nothing to emit.
    Nothing,
    /// Not parseable yet.
    Incomplete,
}

fn parse_payload(payload: &str) -> Payload {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => match value.get("response").and_then(|r| r.as_str()) {
            Some(text) if !text.is_empty() => Payload::Text(text.to_string()),
            _ => Payload::Nothing,
        },
        Err(_) => Payload::Incomplete,
    }
}

/// Stateful decoder turning raw chunks into [`DecodedEvent`]s.
///
/// One decoder serves exactly one generation stream. Once it has produced
/// [`DecodedEvent::Done`] (or [`finish`](Self::finish) was called) it is
/// finished and ignores further input.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Text after the last newline seen so far.
    carry: String,
    /// Payload of a `data:` line that has not parsed yet.
    pending: Option<String>,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    utf8_tail: Vec<u8>,
    max_buffered_bytes: usize,
    finished: bool,
    dropped_fragments: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFERED_BYTES)
    }
}

impl FrameDecoder {
    /// Create a decoder holding at most `max_buffered_bytes` of unresolved text.
    pub fn new(max_buffered_bytes: usize) -> Self {
        Self {
            carry: String::new(),
            pending: None,
            utf8_tail: Vec::new(),
            max_buffered_bytes,
            finished: false,
            dropped_fragments: 0,
        }
    }

    /// Whether the decoder has seen the end of its stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Bytes of text currently held back (partial line, pending fragment,
    /// incomplete UTF-8 sequence).
    pub fn buffered_len(&self) -> usize {
        self.carry.len() + self.pending.as_ref().map_or(0, |p| p.len()) + self.utf8_tail.len()
    }

    /// Number of unparsable fragments abandoned so far, either superseded by
    /// a newer frame or left over when the stream ended.
    pub fn dropped_fragments(&self) -> usize {
        self.dropped_fragments
    }

    /// Feed a raw byte chunk and return the events it completed.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD; a multi-byte character split
    /// across chunks is reassembled.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<DecodedEvent>, DecodeError> {
        if self.finished {
            return Ok(Vec::new());
        }
        let text = self.decode_utf8(chunk);
        self.ingest(&text)
    }

    /// Feed a chunk that is already text.
    pub fn push_str(&mut self, chunk: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        self.push(chunk.as_bytes())
    }

    /// Signal that the source has no more data.
    ///
    /// A final line without a trailing newline is still decoded. Whatever
    /// remains unresolved afterwards is discarded.
    pub fn finish(&mut self) -> Vec<DecodedEvent> {
        if self.finished {
            return Vec::new();
        }

        if !self.utf8_tail.is_empty() {
            let tail = std::mem::take(&mut self.utf8_tail);
            self.carry.push_str(&String::from_utf8_lossy(&tail));
        }

        let mut events = Vec::new();
        let last_line = std::mem::take(&mut self.carry);
        if !last_line.is_empty()
            && let Some(event) = self.process_line(&last_line)
        {
            events.push(event);
        }

        if self.pending.take().is_some() {
            self.dropped_fragments += 1;
        }
        self.finished = true;
        events
    }

    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, remainder) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &remainder[len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for the next chunk.
                            self.utf8_tail = remainder.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        text
    }

    fn ingest(&mut self, text: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        let mut events = Vec::new();

        let mut buffered = std::mem::take(&mut self.carry);
        buffered.push_str(text);

        let mut lines: Vec<&str> = buffered.split('\n').collect();
        let tail = lines.pop().unwrap_or_default();

        for line in lines {
            if let Some(event) = self.process_line(line) {
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    self.finish_at_done();
                    return Ok(events);
                }
            }
        }

        self.carry = tail.to_string();
        self.check_bound()?;
        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<DecodedEvent> {
        let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
            // Not a frame of its own; it may continue a pending fragment.
            let pending = self.pending.take()?;
            return self.resolve(format!("{pending}\n{line}"));
        };

        if self.pending.take().is_some() {
            self.dropped_fragments += 1;
        }

        let payload = rest.trim();
        if payload.is_empty() {
            return None;
        }
        if payload == DONE_PAYLOAD {
            return Some(DecodedEvent::Done);
        }
        self.resolve(payload.to_string())
    }

    fn resolve(&mut self, payload: String) -> Option<DecodedEvent> {
        match parse_payload(&payload) {
            Payload::Text(text) => Some(DecodedEvent::Token(text)),
            Payload::Nothing => None,
            Payload::Incomplete => {
                self.pending = Some(payload);
                None
            }
        }
    }

    fn finish_at_done(&mut self) {
        self.carry.clear();
        self.utf8_tail.clear();
        self.pending = None;
        self.finished = true;
    }

    fn check_bound(&self) -> Result<(), DecodeError> {
        let buffered = self.buffered_len();
        if buffered > self.max_buffered_bytes {
            return Err(DecodeError::BufferLimitExceeded {
                limit: self.max_buffered_bytes,
                buffered,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str) -> DecodedEvent {
        DecodedEvent::Token(text.to_string())
    }

    fn decode_chunks(chunks: &[&[u8]]) -> Vec<DecodedEvent> {
        let mut decoder = FrameDecoder::default();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.push(chunk).unwrap());
            if decoder.is_finished() {
                break;
            }
        }
        events.extend(decoder.finish());
        events
    }

    const WELL_FORMED: &str = concat!(
        "data: {\"response\":\"Hél\"}\n",
        ": keep-alive\n",
        "\n",
        "data: {\"response\":\"lo 🌍\"}\n",
        "data: {\"response\":\"\",\"usage\":{\"prompt_tokens\":3}}\n",
        "data:{\"response\":\" wörld\"}\r\n",
        "data: [DONE]\n",
    );

    fn expected_well_formed() -> Vec<DecodedEvent> {
        vec![
            token("Hél"),
            token("lo 🌍"),
            token(" wörld"),
            DecodedEvent::Done,
        ]
    }

    #[test]
    fn test_frames_split_mid_payload() {
        let events = decode_chunks(&[
            b"data: {\"response\":\"hi\"}\n",
            b"data: {\"respo",
            b"nse\":\" there\"}\n",
            b"data: [DONE]\n",
        ]);
        assert_eq!(events, vec![token("hi"), token(" there"), DecodedEvent::Done]);
    }

    #[test]
    fn test_unsplit_input() {
        let events = decode_chunks(&[WELL_FORMED.as_bytes()]);
        assert_eq!(events, expected_well_formed());
    }

    #[test]
    fn test_every_two_way_split_matches_unsplit() {
        let bytes = WELL_FORMED.as_bytes();
        for at in 0..=bytes.len() {
            let (head, tail) = bytes.split_at(at);
            assert_eq!(
                decode_chunks(&[head, tail]),
                expected_well_formed(),
                "split at byte {at}"
            );
        }
    }

    #[test]
    fn test_every_three_way_split_matches_unsplit() {
        let bytes = WELL_FORMED.as_bytes();
        for first in 0..=bytes.len() {
            for second in first..=bytes.len() {
                let chunks = [&bytes[..first], &bytes[first..second], &bytes[second..]];
                assert_eq!(
                    decode_chunks(&chunks),
                    expected_well_formed(),
                    "split at bytes {first} and {second}"
                );
            }
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let chunks: Vec<&[u8]> = WELL_FORMED.as_bytes().chunks(1).collect();
        assert_eq!(decode_chunks(&chunks), expected_well_formed());
    }

    #[test]
    fn test_done_clears_carry_and_ignores_rest_of_chunk() {
        let mut decoder = FrameDecoder::default();
        let events = decoder
            .push_str("data: {\"response\":\"a\"}\ndata: [DONE]\ndata: {\"response\":\"b\"}\ndata: {\"resp")
            .unwrap();

        assert_eq!(events, vec![token("a"), DecodedEvent::Done]);
        assert!(decoder.is_finished());
        assert_eq!(decoder.buffered_len(), 0);

        let later = decoder.push_str("onse\":\"c\"}\ndata: [DONE]\n").unwrap();
        assert!(later.is_empty());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_done_emitted_exactly_once() {
        let events = decode_chunks(&[b"data: [DONE]\ndata: [DONE]\n", b"data: [DONE]\n"]);
        assert_eq!(events, vec![DecodedEvent::Done]);
    }

    #[test]
    fn test_lines_without_data_prefix_are_ignored() {
        let events = decode_chunks(&[concat!(
            "event: {\"response\":\"nope\"}\n",
            " data: {\"response\":\"leading space\"}\n",
            "{\"response\":\"bare json\"}\n",
            "id: 7\n",
            "DATA: {\"response\":\"upper\"}\n",
        )
        .as_bytes()]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_empty_and_fieldless_payloads_are_ignored() {
        let events = decode_chunks(&[concat!(
            "data:\n",
            "data:    \n",
            "data: {\"response\":\"\"}\n",
            "data: {\"other\":\"x\"}\n",
            "data: {\"response\":42}\n",
            "data: [1,2,3]\n",
        )
        .as_bytes()]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_unparsable_line_is_rebuffered_until_completed() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.push_str("data: {\"response\":\n").unwrap().is_empty());
        assert!(decoder.buffered_len() > 0);

        let events = decoder.push_str("\"split across lines\"}\n").unwrap();
        assert_eq!(events, vec![token("split across lines")]);
        assert_eq!(decoder.buffered_len(), 0);
        assert_eq!(decoder.dropped_fragments(), 0);
    }

    #[test]
    fn test_new_frame_supersedes_pending_fragment() {
        let events = decode_chunks(&[
            b"data: {\"broken\n",
            b"data: {\"response\":\"fresh\"}\n",
            b"data: [DONE]\n",
        ]);
        assert_eq!(events, vec![token("fresh"), DecodedEvent::Done]);
    }

    #[test]
    fn test_pending_fragment_dropped_at_end_of_stream() {
        let mut decoder = FrameDecoder::default();
        decoder.push_str("data: {\"never closed\n").unwrap();
        assert!(decoder.finish().is_empty());
        assert_eq!(decoder.dropped_fragments(), 1);
    }

    #[test]
    fn test_finish_decodes_trailing_line_without_newline() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.push_str("data: {\"response\":\"tail\"}").unwrap().is_empty());
        assert_eq!(decoder.finish(), vec![token("tail")]);
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_buffer_limit_exceeded() {
        let mut decoder = FrameDecoder::new(32);
        decoder.push_str("data: {\"response\":\n").unwrap();
        let err = decoder
            .push_str("\"this fragment keeps growing without ever closing")
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BufferLimitExceeded { limit: 32, .. }
        ));
    }

    #[test]
    fn test_oversized_partial_line_exceeds_limit() {
        let mut decoder = FrameDecoder::new(8);
        let err = decoder.push_str("data: {\"response\":\"long\"").unwrap_err();
        assert!(matches!(err, DecodeError::BufferLimitExceeded { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut decoder = FrameDecoder::default();
        let mut chunk = b"data: {\"response\":\"a".to_vec();
        chunk.push(0xFF);
        chunk.extend_from_slice(b"b\"}\n");
        let events = decoder.push(&chunk).unwrap();
        assert_eq!(events, vec![token("a\u{FFFD}b")]);
    }

    #[test]
    fn test_split_multibyte_character_is_reassembled() {
        let bytes = "data: {\"response\":\"🌍\"}\n".as_bytes();
        let start = bytes.iter().position(|b| *b == 0xF0).unwrap();
        let mut decoder = FrameDecoder::default();

        assert!(decoder.push(&bytes[..start + 2]).unwrap().is_empty());
        assert_eq!(decoder.push(&bytes[start + 2..]).unwrap(), vec![token("🌍")]);
    }
}
