//! Error types shared by the upload pipeline, the scene manager and the
//! selection panel.

use thiserror::Error;

/// Generic text shown for any failure that carries no server-supplied message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process the file. Please try again.";

/// Local shape checks on a graph document that the service reported as successful.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
	/// The document is not JSON, or `elements.nodes` / `elements.edges` are
	/// missing, or a node carries no usable id.
	#[error("malformed graph payload: {0}")]
	MalformedPayload(String),

	/// An edge endpoint names a node id that is not in the node set.
	#[error("edge #{index} ({from} -> {to}) references unknown node `{missing}`")]
	DanglingEdge {
		index: usize,
		from: String,
		to: String,
		missing: String,
	},
}

/// Everything that can end an upload without a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
	#[error("no file selected")]
	NoFileSelected,

	#[error("transport error: {0}")]
	Transport(String),

	#[error("analysis service reported: {0}")]
	ServerReported(String),

	#[error(transparent)]
	Validation(#[from] ValidationError),
}

impl UploadError {
	/// The single line surfaced to the user for this failure.
	///
	/// Validation failures read exactly like transport failures; only the
	/// logs tell them apart.
	pub fn user_message(&self) -> String {
		match self {
			UploadError::NoFileSelected => "Choose a JSON file to upload.".to_string(),
			UploadError::ServerReported(message) => message.clone(),
			UploadError::Transport(_) | UploadError::Validation(_) => {
				GENERIC_FAILURE_MESSAGE.to_string()
			}
		}
	}

	/// Stable label for diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			UploadError::NoFileSelected => "no_file_selected",
			UploadError::Transport(_) => "transport",
			UploadError::ServerReported(_) => "server_reported",
			UploadError::Validation(ValidationError::MalformedPayload(_)) => "malformed_payload",
			UploadError::Validation(ValidationError::DanglingEdge { .. }) => "dangling_edge",
		}
	}
}

/// A selected node's message data could not be materialised.
///
/// Never shown to the user; the selection degrades to an empty message list.
#[derive(Error, Debug)]
pub enum SelectionDataError {
	#[error("node has no message data")]
	Missing,

	#[error("message data is not a message list: {0}")]
	Unparseable(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
	#[error("scene #{0} is still live; destroy it before building another")]
	AlreadyLive(u64),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn server_message_reaches_the_user_verbatim() {
		let err = UploadError::ServerReported("Format file harus.json".into());
		assert_eq!(err.user_message(), "Format file harus.json");
		assert_eq!(err.kind(), "server_reported");
	}

	#[test]
	fn validation_and_transport_look_the_same_to_the_user() {
		let transport = UploadError::Transport("connection refused".into());
		let validation: UploadError = ValidationError::DanglingEdge {
			index: 0,
			from: "A".into(),
			to: "Z".into(),
			missing: "Z".into(),
		}
		.into();

		assert_eq!(transport.user_message(), validation.user_message());
		assert_ne!(transport.kind(), validation.kind());
		assert_eq!(validation.kind(), "dangling_edge");
	}
}
