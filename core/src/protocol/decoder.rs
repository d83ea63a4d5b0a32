use serde_json::Value;

use crate::protocol::ProtocolEvent;

/// Opening bytes of a structured event line.
const EVENT_PREFIX: &str = "{\"kind\":";

/// Incremental decoder for the child's stdout stream.
///
/// The framework interleaves structured event lines with plain diagnostic
/// text, and a single event may arrive split across several read chunks.
/// Each chunk is split on newlines; a fragment that looks like the start of
/// an event is carried until enough data arrives to parse it, everything
/// else comes out as a `stderr` event.
#[derive(Debug, Default)]
pub struct LineDecoder {
    carry: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a partial structured line is waiting for more data.
    pub fn has_partial(&self) -> bool {
        !self.carry.is_empty()
    }

    /// Decode one chunk of stdout, returning events in stream order.
    pub fn feed(&mut self, chunk: &str) -> Vec<ProtocolEvent> {
        let mut out = Vec::new();
        for line in chunk.split('\n') {
            // terminal newlines yield empty segments; nothing to flush
            if line.is_empty() && self.carry.is_empty() {
                continue;
            }

            let joined = if self.carry.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", self.carry, line)
            };

            match serde_json::from_str::<Value>(&joined) {
                Ok(value) if value.get("kind").is_some() => {
                    self.carry.clear();
                    match serde_json::from_value::<ProtocolEvent>(value) {
                        Ok(event) => out.push(event),
                        Err(err) => {
                            // unknown kind or malformed payload: demote to text
                            tracing::debug!(
                                target: "mocharelay.decoder",
                                %err,
                                "unrecognized structured line"
                            );
                            out.push(ProtocolEvent::Stderr { data: joined });
                        }
                    }
                    continue;
                }
                // valid JSON without a kind field is plain output
                Ok(_) => {}
                Err(_) => {
                    if !self.carry.is_empty() || looks_like_event_start(line) {
                        self.carry.push_str(line);
                        continue;
                    }
                }
            }

            self.carry.clear();
            out.push(ProtocolEvent::Stderr { data: joined });
        }
        out
    }
}

/// A line opens a structured event when it begins with the `kind` prefix, or
/// is itself a leading fragment of it (the chunk boundary may fall inside
/// the prefix).
fn looks_like_event_start(line: &str) -> bool {
    line.starts_with(EVENT_PREFIX) || (!line.is_empty() && EVENT_PREFIX.starts_with(line))
}
