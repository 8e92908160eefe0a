use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use web_sys::HtmlInputElement;

use crate::components::force_graph::ForceGraphCanvas;
use crate::components::inspector::InspectorPanel;
use crate::components::legend::EdgeLegend;
use crate::config::ViewerConfig;
use crate::error::UploadError;
use crate::graph::{CommunityColoring, NodeAttrs, VisualScene};
use crate::interaction::InteractionMachine;
use crate::upload::client::read_file;
use crate::upload::{AnalysisClient, UploadOrchestrator, UploadOutcome, UploadStatus};

/// Upload form, graph canvas and inspection panel.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ViewerConfig>().unwrap_or_default();
	let client = AnalysisClient::new(&config.service);

	let uploads = RwSignal::new(UploadOrchestrator::new(config.encoding));
	let machine = RwSignal::new(InteractionMachine::new());
	let scene = RwSignal::new(None::<Arc<VisualScene>>);
	let notice = RwSignal::new(None::<String>);

	let coloring = Memo::new(move |_| machine.with(InteractionMachine::coloring));
	let selected = Memo::new(move |_| machine.with(|m| m.selected_id().map(str::to_string)));
	let selection = Signal::derive(move || machine.with(|m| m.selection().cloned()));

	let on_node_tap = Callback::new(move |attrs: NodeAttrs| {
		machine.update(|m| {
			m.tap_node(&attrs);
		});
	});
	let on_background_tap = Callback::new(move |_: ()| machine.update(InteractionMachine::tap_background));
	let on_scene_built = Callback::new(move |_: ()| machine.update(InteractionMachine::scene_built));

	let on_file_change = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let file = input.files().and_then(|files| files.get(0));
		// re-picking the same file must fire `change` again
		input.set_value("");
		let name = file.as_ref().map(web_sys::File::name);
		let begun = uploads
			.try_update(|u| u.begin(name.as_deref()))
			.unwrap_or(Err(UploadError::NoFileSelected));

		match (begun, file) {
			(Ok(ticket), Some(file)) => {
				notice.set(None);
				machine.update(InteractionMachine::new_upload);
				scene.set(None);
				let client = client.clone();
				spawn_local(async move {
					let response = match read_file(&file).await {
						Ok(upload) => client.process(upload).await,
						Err(err) => Err(err),
					};
					if let Some(UploadOutcome::Ready(visual)) =
						uploads.try_update(|u| u.complete(ticket, response))
					{
						scene.set(Some(Arc::new(visual)));
					}
				});
			}
			(Err(err), _) => notice.set(Some(err.user_message())),
			(Ok(_), None) => {}
		}
	};

	let on_toggle = move |_| {
		if let Some(coloring) = machine.try_update(InteractionMachine::toggle_community).flatten() {
			debug!("restyling scene: {:?}", coloring);
		}
	};

	let status = move || {
		uploads.with(|u| match u.status() {
			UploadStatus::Idle => {
				view! { <p class="status">"Upload a JSON file to visualize the graph."</p> }.into_any()
			}
			UploadStatus::Loading { .. } => view! { <p class="status">"Processing..."</p> }.into_any(),
			UploadStatus::Succeeded { nodes, edges } => {
				view! { <p class="summary">{format!("{} nodes, {} edges", nodes, edges)}</p> }.into_any()
			}
			UploadStatus::Failed(err) => {
				view! { <p class="error">{format!("Error: {}", err.user_message())}</p> }.into_any()
			}
		})
	};

	view! {
		<div class="viewer">
			<header class="viewer-controls">
				<h1>"Interaction Graph"</h1>
				<input type="file" accept=".json,application/json" on:change=on_file_change />
				<label>
					<input
						type="checkbox"
						prop:checked=move || coloring.get() == CommunityColoring::ByCommunity
						on:change=on_toggle
					/>
					" Color by community"
				</label>
				{move || notice.get().map(|text| view! { <p class="notice">{text}</p> })}
				{status}
			</header>

			<Show when=move || scene.with(Option::is_some)>
				<EdgeLegend />
			</Show>

			<div class="viewer-body">
				<div class="viewer-canvas">
					<ForceGraphCanvas
						scene=scene
						coloring=coloring
						selected=selected
						on_node_tap=on_node_tap
						on_background_tap=on_background_tap
						on_scene_built=on_scene_built
					/>
				</div>
				<InspectorPanel selection=selection />
			</div>
		</div>
	}
}
