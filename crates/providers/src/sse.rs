//! Server-sent events line decoding.
//!
//! Network chunks split lines (and multi-byte characters) at arbitrary
//! points, so bytes are buffered until a full `\n`-terminated line exists.

use streamcall_core::provider::StreamFragment;

/// The outcome of one `data:` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// Zero or more fragments decoded from a chunk
    Fragments(Vec<StreamFragment>),
    /// The `[DONE]` sentinel
    Done,
}

/// Incremental splitter that yields the payload of each `data:` line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes and return the payloads of every completed line.
    ///
    /// Blank lines, `:` comments and non-`data` fields are skipped.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(data) = data_payload(&line) {
                payloads.push(data.to_string());
            }
        }
        payloads
    }

    /// The payload of a final `data:` line that never got its newline.
    pub fn finish(self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.buffer);
        data_payload(line.trim()).map(str::to_string)
    }
}

fn data_payload(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    (!data.is_empty()).then_some(data)
}
