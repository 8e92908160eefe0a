use leptos::prelude::*;

use crate::graph::encode::edge_legend;

/// Interaction types and the edge color each one is drawn with.
#[component]
pub fn EdgeLegend() -> impl IntoView {
	view! {
		<div class="legend">
			<h3>"Edge types"</h3>
			<ul>
				{edge_legend()
					.into_iter()
					.map(|(kind, color)| {
						view! {
							<li>
								<span class="legend-swatch" style:background-color=color></span>
								{kind}
							</li>
						}
					})
					.collect_view()}
			</ul>
		</div>
	}
}
