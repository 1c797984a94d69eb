use std::io::{self, Write};

use serde_json::Value;

/// Where accepted payloads go for a human to look at.
pub trait PayloadSink: Send + Sync {
    fn emit(&self, payload: &Value);
}

/// Prints each payload to stdout under a fixed header line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn write_to<W: Write>(out: &mut W, payload: &Value) -> io::Result<()> {
        // One buffer, one write: concurrent requests must not interleave.
        let rendered = format!("Received JSON from device:\n{payload}\n");
        out.write_all(rendered.as_bytes())?;
        out.flush()
    }
}

impl PayloadSink for ConsoleSink {
    fn emit(&self, payload: &Value) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(err) = Self::write_to(&mut handle, payload) {
            tracing::warn!(error = %err, "failed to print payload");
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use serde_json::Value;

    use super::PayloadSink;

    /// Keeps every emitted payload in memory.
    #[derive(Default)]
    pub struct RecordingSink {
        seen: Mutex<Vec<Value>>,
    }

    impl RecordingSink {
        pub fn payloads(&self) -> Vec<Value> {
            self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
        }
    }

    impl PayloadSink for RecordingSink {
        fn emit(&self, payload: &Value) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(payload.clone());
            }
        }
    }
}
