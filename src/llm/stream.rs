use serde::Deserialize;

use super::InferenceError;

/// Terminal payload of an OpenAI-style event stream
const DONE_MARKER: &str = "[DONE]";

/// Assembles the text of a streamed chat completion.
///
/// Bytes are fed in network order; they may split lines (or UTF-8
/// sequences) anywhere. Each complete `data:` line is decoded as a chunk and
/// the first choice's content delta is appended. Other SSE fields and
/// comments are ignored.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    buffer: Vec<u8>,
    content: String,
    done: bool,
    chunks: usize,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` marker has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of content chunks decoded so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), InferenceError> {
        if self.done {
            return Ok(());
        }

        self.buffer.extend_from_slice(bytes);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line)?;
            if self.done {
                self.buffer.clear();
                break;
            }
        }

        Ok(())
    }

    /// Flush any unterminated trailing line and return the full text
    pub fn finish(mut self) -> Result<String, InferenceError> {
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.handle_line(&line)?;
        }
        Ok(self.content)
    }

    fn handle_line(&mut self, line: &[u8]) -> Result<(), InferenceError> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\n', '\r']);

        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim_start();

        if data.is_empty() {
            return Ok(());
        }
        if data == DONE_MARKER {
            self.done = true;
            return Ok(());
        }

        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| InferenceError::Stream(format!("Undecodable chunk ({}): {}", e, data)))?;

        if let Some(error) = chunk.error {
            let message = match error {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(InferenceError::Stream(message));
        }

        if let Some(content) = chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
            self.content.push_str(&content);
            self.chunks += 1;
        }

        Ok(())
    }
}
