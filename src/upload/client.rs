//! Transport to the graph-processing service.

use log::{debug, warn};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use wasm_bindgen_futures::JsFuture;

use crate::config::ServiceConfig;
use crate::error::UploadError;

/// Multipart field name the service reads the upload from.
const FILE_FIELD: &str = "file";

/// A file picked by the user, read fully into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
	pub name: String,
	pub bytes: Vec<u8>,
}

/// Error body returned by the service alongside a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
	error: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
	endpoint: String,
	client: Client,
}

impl AnalysisClient {
	pub fn new(config: &ServiceConfig) -> Self {
		Self {
			endpoint: config.process_url(),
			client: Client::new(),
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Post `file` and return the raw graph document on success.
	pub async fn process(&self, file: UploadFile) -> Result<Vec<u8>, UploadError> {
		debug!("posting {} ({} bytes) to {}", file.name, file.bytes.len(), self.endpoint);
		let form = Form::new().part(FILE_FIELD, Part::bytes(file.bytes).file_name(file.name));

		let response = self
			.client
			.post(&self.endpoint)
			.multipart(form)
			.send()
			.await
			.map_err(map_http_error)?;

		let status = response.status();
		let body = response.bytes().await.map_err(map_http_error)?;
		if status.is_success() {
			Ok(body.to_vec())
		} else {
			Err(failure_from_body(status.as_u16(), &body))
		}
	}
}

fn map_http_error(error: reqwest::Error) -> UploadError {
	if error.is_timeout() {
		UploadError::Transport(format!("request timeout: {}", error))
	} else if is_connect(&error) {
		UploadError::Transport(format!("connection error: {}", error))
	} else {
		UploadError::Transport(format!("http error: {}", error))
	}
}

#[cfg(not(target_arch = "wasm32"))]
fn is_connect(error: &reqwest::Error) -> bool {
	error.is_connect()
}

// fetch reports refused connections as plain request errors
#[cfg(target_arch = "wasm32")]
fn is_connect(_: &reqwest::Error) -> bool {
	false
}

/// Classify a non-success response. A `{"error": ...}` body is the service
/// speaking; anything else is a transport failure.
pub fn failure_from_body(status: u16, body: &[u8]) -> UploadError {
	match serde_json::from_slice::<ErrorBody>(body) {
		Ok(ErrorBody { error }) if !error.trim().is_empty() => UploadError::ServerReported(error),
		_ => {
			warn!("service answered {} without an error message", status);
			UploadError::Transport(format!("HTTP {}", status))
		}
	}
}

/// Read a browser `File` into an [`UploadFile`].
pub async fn read_file(file: &web_sys::File) -> Result<UploadFile, UploadError> {
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|err| UploadError::Transport(format!("could not read {}: {:?}", file.name(), err)))?;
	Ok(UploadFile {
		name: file.name(),
		bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn error_bodies_carry_the_service_message() {
		assert_eq!(
			failure_from_body(400, br#"{"error": "No file part"}"#),
			UploadError::ServerReported("No file part".into())
		);
	}

	#[test]
	fn other_bodies_are_transport_failures() {
		assert_eq!(
			failure_from_body(502, b"<html>Bad Gateway</html>"),
			UploadError::Transport("HTTP 502".into())
		);
		assert_eq!(
			failure_from_body(500, br#"{"error": ""}"#),
			UploadError::Transport("HTTP 500".into())
		);
	}

	#[test]
	fn request_errors_become_transport_failures() {
		let error = Client::new().get("not a url").build().unwrap_err();
		let UploadError::Transport(message) = map_http_error(error) else {
			panic!("expected a transport failure");
		};
		assert!(message.starts_with("http error: "), "{message}");
		assert_eq!(
			UploadError::Transport(message).user_message(),
			crate::error::GENERIC_FAILURE_MESSAGE
		);
	}

	#[test]
	fn endpoint_follows_the_service_config() {
		let client = AnalysisClient::new(&ServiceConfig {
			base_url: "http://graphs.local:8080/".into(),
		});
		assert_eq!(client.endpoint(), "http://graphs.local:8080/api/process");
	}
}
