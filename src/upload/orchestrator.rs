//! Upload lifecycle with stale-response suppression.
//!
//! Every upload takes a ticket stamped with a fresh generation. Only the
//! response whose ticket matches the latest generation may change the page;
//! earlier responses resolve to [`UploadOutcome::Stale`] and are dropped.

use log::{debug, error, info};

use crate::config::EncodingConfig;
use crate::error::UploadError;
use crate::graph::payload::from_slice;
use crate::graph::{VisualScene, encode};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum UploadStatus {
	#[default]
	Idle,
	Loading {
		file_name: String,
	},
	Succeeded {
		nodes: usize,
		edges: usize,
	},
	Failed(UploadError),
}

impl UploadStatus {
	pub fn is_loading(&self) -> bool {
		matches!(self, UploadStatus::Loading { .. })
	}
}

/// Proof of which upload a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
	generation: u64,
}

impl UploadTicket {
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
	/// The latest upload produced a scene ready to be built.
	Ready(VisualScene),
	Failed(UploadError),
	/// A newer upload started before this response arrived.
	Stale,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOrchestrator {
	generation: u64,
	status: UploadStatus,
	encoding: EncodingConfig,
}

impl UploadOrchestrator {
	pub fn new(encoding: EncodingConfig) -> Self {
		Self {
			generation: 0,
			status: UploadStatus::Idle,
			encoding,
		}
	}

	pub fn status(&self) -> &UploadStatus {
		&self.status
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Start an upload for the chosen file.
	///
	/// Without a file nothing changes and no request should be made.
	pub fn begin(&mut self, file_name: Option<&str>) -> Result<UploadTicket, UploadError> {
		let Some(file_name) = file_name else {
			debug!("upload requested without a file");
			return Err(UploadError::NoFileSelected);
		};
		self.generation += 1;
		self.status = UploadStatus::Loading {
			file_name: file_name.to_string(),
		};
		info!("upload #{} started: {}", self.generation, file_name);
		Ok(UploadTicket {
			generation: self.generation,
		})
	}

	pub fn is_current(&self, ticket: UploadTicket) -> bool {
		ticket.generation == self.generation
	}

	/// Settle the upload identified by `ticket` with the service response.
	pub fn complete(
		&mut self,
		ticket: UploadTicket,
		response: Result<Vec<u8>, UploadError>,
	) -> UploadOutcome {
		if !self.is_current(ticket) {
			debug!(
				"dropping response for upload #{} (current #{})",
				ticket.generation, self.generation
			);
			return UploadOutcome::Stale;
		}

		let parsed = response.and_then(|body| from_slice(&body).map_err(UploadError::from));
		match parsed {
			Ok(payload) => {
				let scene = encode(&payload, &self.encoding);
				info!(
					"upload #{} ready: {} nodes, {} edges",
					ticket.generation,
					scene.nodes.len(),
					scene.edges.len()
				);
				self.status = UploadStatus::Succeeded {
					nodes: scene.nodes.len(),
					edges: scene.edges.len(),
				};
				UploadOutcome::Ready(scene)
			}
			Err(err) => {
				error!("upload #{} failed [{}]: {}", ticket.generation, err.kind(), err);
				self.status = UploadStatus::Failed(err.clone());
				UploadOutcome::Failed(err)
			}
		}
	}
}
