//! Incremental server-sent-events wire decoder.
//!
//! Feed raw transport chunks in, pop complete events out. Field handling
//! follows the event-stream format: `data:` lines accumulate joined by
//! newlines, `event:` names the event, `:` lines are comments, a blank
//! line dispatches. Chunk boundaries may fall anywhere, including inside
//! a line.

use bytes::BytesMut;

/// One decoded server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name from the `event:` field; `None` for unnamed events.
    pub event: Option<String>,
    /// Joined `data:` payload.
    pub data: String,
}

/// Stateful decoder from byte chunks to [`SseEvent`]s.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    event: Option<String>,
    data: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk from the transport.
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pop the next complete event, if the buffered lines finish one.
    pub fn next_event(&mut self) -> Option<SseEvent> {
        while let Some(line) = self.take_line() {
            if line.is_empty() {
                let event = self.event.take();
                let data = std::mem::take(&mut self.data);
                // A blank line without accumulated data dispatches nothing
                if data.is_empty() {
                    continue;
                }
                return Some(SseEvent { event, data });
            }
            self.apply_field(&line);
        }
        None
    }

    /// Take one complete line off the buffer, stripping the terminator.
    fn take_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line = self.buffer.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            let len = line.len() - 1;
            line.truncate(len);
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn apply_field(&mut self, line: &str) {
        // Lines starting with a colon are comments (keep-alives)
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value);
            }
            "event" => self.event = Some(value.to_string()),
            // `id` and `retry` are part of the protocol but unused by this feed
            _ => {}
        }
    }
}
