//! `$batch` request encoding.
//!
//! Builds the `multipart/mixed` body for the Web API batch endpoint. Each
//! instruction becomes one `application/http` part carrying an inlined
//! request line, JSON headers and the payload.

use std::fmt;

use chrono::Local;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;

const CRLF: &str = "\r\n";

/// Length of the random suffix appended to the boundary timestamp.
const BOUNDARY_ENTROPY_LEN: usize = 12;

/// HTTP command of a batched operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchCommand {
    /// Create a record or invoke an action.
    Post,
    /// Update a record.
    Patch,
    /// Delete a record or association.
    Delete,
    /// Read a record or collection.
    Get,
}

impl BatchCommand {
    /// Returns the request-line verb.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Get => "GET",
        }
    }
}

impl fmt::Display for BatchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation inside a `$batch` request.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::{BatchCommand, BatchInstruction};
/// use serde_json::json;
///
/// let create = BatchInstruction::new(BatchCommand::Post, "accounts", json!({"name": "Contoso"}));
/// let read = BatchInstruction::without_payload(BatchCommand::Get, "accounts?$top=1");
/// assert_eq!(create.command, BatchCommand::Post);
/// assert!(read.payload.is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BatchInstruction {
    /// HTTP command.
    pub command: BatchCommand,
    /// Request target, relative to the service root or absolute.
    pub url_segment: String,
    /// JSON body, if any.
    pub payload: Option<Value>,
}

impl BatchInstruction {
    /// Creates an instruction carrying a JSON body.
    #[must_use]
    pub fn new(command: BatchCommand, url_segment: impl Into<String>, payload: Value) -> Self {
        Self {
            command,
            url_segment: url_segment.into(),
            payload: Some(payload),
        }
    }

    /// Creates an instruction without a body.
    #[must_use]
    pub fn without_payload(command: BatchCommand, url_segment: impl Into<String>) -> Self {
        Self {
            command,
            url_segment: url_segment.into(),
            payload: None,
        }
    }
}

/// An encoded `$batch` body and the boundary that delimits its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchRequest {
    /// Multipart boundary, without the leading `--`.
    pub boundary: String,
    /// Complete multipart body.
    pub body: String,
}

impl BatchRequest {
    /// Encodes `instructions` with a freshly generated boundary.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a payload cannot be rendered.
    pub fn encode(instructions: &[BatchInstruction]) -> Result<Self, serde_json::Error> {
        Self::encode_with_boundary(instructions, generate_boundary())
    }

    /// Encodes `instructions` with a caller supplied boundary.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a payload cannot be rendered.
    pub fn encode_with_boundary(
        instructions: &[BatchInstruction],
        boundary: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let boundary = boundary.into();
        let delimiter = format!("--{boundary}");
        let mut body = String::new();

        for instruction in instructions {
            let payload = match &instruction.payload {
                Some(value) => serde_json::to_string(value)?,
                None => String::new(),
            };

            body.push_str(&delimiter);
            body.push_str(CRLF);
            body.push_str("Content-Type: application/http");
            body.push_str(CRLF);
            body.push_str("Content-Transfer-Encoding: binary");
            body.push_str(CRLF);
            body.push_str(CRLF);
            body.push_str(&format!(
                "{} {} HTTP/1.1",
                instruction.command, instruction.url_segment
            ));
            body.push_str(CRLF);
            body.push_str("Accept: application/json");
            body.push_str(CRLF);
            body.push_str("Content-Type: application/json;type=entry");
            body.push_str(CRLF);
            body.push_str(CRLF);
            body.push_str(&payload);
            body.push_str(CRLF);
        }

        body.push_str(&delimiter);
        body.push_str("--");
        body.push_str(CRLF);

        Ok(Self { boundary, body })
    }

    /// Returns the `Content-Type` header value for this body.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/mixed;boundary={}", self.boundary)
    }
}

/// Generates `batch_<yyyyMMddHHmmss>_<random>`.
///
/// The timestamp alone repeats within a second, so a random suffix keeps
/// concurrent batches distinct.
#[must_use]
pub fn generate_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_ENTROPY_LEN)
        .map(char::from)
        .collect();
    format!("batch_{}_{suffix}", Local::now().format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_two_instructions_produce_two_parts_and_terminator() {
        let instructions = vec![
            BatchInstruction::new(BatchCommand::Post, "accounts", json!({"name": "A"})),
            BatchInstruction::new(
                BatchCommand::Patch,
                "accounts(00000000-0000-0000-0000-000000000001)",
                json!({"name": "B"}),
            ),
        ];

        let batch = BatchRequest::encode_with_boundary(&instructions, "batch_test").unwrap();

        assert_eq!(batch.body.matches("--batch_test\r\n").count(), 2);
        assert!(batch.body.ends_with("--batch_test--\r\n"));
        assert_eq!(batch.body.matches("--batch_test--").count(), 1);
        assert_eq!(batch.body.matches("Content-Type: application/http").count(), 2);
    }

    #[test]
    fn test_part_layout() {
        let instructions = vec![BatchInstruction::new(
            BatchCommand::Post,
            "contacts",
            json!({"firstname": "Ada"}),
        )];
        let batch = BatchRequest::encode_with_boundary(&instructions, "b1").unwrap();

        let expected = "--b1\r\n\
            Content-Type: application/http\r\n\
            Content-Transfer-Encoding: binary\r\n\
            \r\n\
            POST contacts HTTP/1.1\r\n\
            Accept: application/json\r\n\
            Content-Type: application/json;type=entry\r\n\
            \r\n\
            {\"firstname\":\"Ada\"}\r\n\
            --b1--\r\n";
        assert_eq!(batch.body, expected);
        assert_eq!(batch.content_type(), "multipart/mixed;boundary=b1");
    }

    #[test]
    fn test_instruction_without_payload_has_empty_body() {
        let instructions = vec![BatchInstruction::without_payload(
            BatchCommand::Delete,
            "accounts(1)",
        )];
        let batch = BatchRequest::encode_with_boundary(&instructions, "b2").unwrap();
        let expected_part = "DELETE accounts(1) HTTP/1.1\r\n\
            Accept: application/json\r\n\
            Content-Type: application/json;type=entry\r\n\
            \r\n\
            \r\n\
            --b2--";
        assert!(batch.body.contains(expected_part));
    }

    #[test]
    fn test_empty_batch_is_only_terminator() {
        let batch = BatchRequest::encode_with_boundary(&[], "b3").unwrap();
        assert_eq!(batch.body, "--b3--\r\n");
    }

    #[test]
    fn test_generated_boundaries_are_distinct() {
        let first = generate_boundary();
        let second = generate_boundary();
        assert!(first.starts_with("batch_"));
        assert_ne!(first, second);
        assert_eq!(first.len(), "batch_".len() + 14 + 1 + BOUNDARY_ENTROPY_LEN);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(BatchCommand::Post.to_string(), "POST");
        assert_eq!(BatchCommand::Patch.to_string(), "PATCH");
        assert_eq!(BatchCommand::Delete.to_string(), "DELETE");
        assert_eq!(BatchCommand::Get.to_string(), "GET");
    }
}
