use serde_json::Value;

use crate::models::SubmissionError;
use crate::sink::PayloadSink;

/// Parses `body` as JSON and hands the value to `sink`.
///
/// Empty, whitespace-only, malformed and `null` bodies are all rejected the
/// same way, and the sink is left untouched.
pub fn handle_submission(sink: &dyn PayloadSink, body: &[u8]) -> Result<Value, SubmissionError> {
    let payload = parse_payload(body)?;
    sink.emit(&payload);
    Ok(payload)
}

fn parse_payload(body: &[u8]) -> Result<Value, SubmissionError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => Err(SubmissionError::MissingOrInvalidPayload),
        Ok(payload) => Ok(payload),
        Err(err) => {
            tracing::debug!(error = %err, "payload did not parse");
            Err(SubmissionError::MissingOrInvalidPayload)
        }
    }
}
