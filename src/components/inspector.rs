use leptos::prelude::*;

use crate::graph::tweets::Tweet;
use crate::interaction::SelectedNode;

/// Details of the selected user and their captured messages.
#[component]
pub fn InspectorPanel(#[prop(into)] selection: Signal<Option<SelectedNode>>) -> impl IntoView {
	view! {
		<Show when=move || selection.with(Option::is_some)>
			{move || {
				selection
					.get()
					.map(|node| {
						let heading = if node.name.is_empty() {
							format!("@{}", node.username)
						} else {
							format!("{} (@{})", node.name, node.username)
						};
						let count = node.tweets.len();
						view! {
							<aside class="inspector">
								<h2>{heading}</h2>
								<p class="inspector-count">{format!("{} captured messages", count)}</p>
								{if node.tweets.is_empty() {
									view! { <p class="inspector-empty">"No messages captured for this user."</p> }
										.into_any()
								} else {
									view! {
										<ul class="inspector-messages">
											{node.tweets.into_iter().map(message_row).collect_view()}
										</ul>
									}
										.into_any()
								}}
							</aside>
						}
					})
			}}
		</Show>
	}
}

fn message_row(tweet: Tweet) -> impl IntoView {
	let metrics = &tweet.metrics;
	let engagement = format!(
		"{} likes · {} retweets · {} replies · {} quotes",
		metrics.like_count, metrics.retweet_count, metrics.reply_count, metrics.quote_count
	);
	view! {
		<li class="inspector-message">
			<p>{tweet.text}</p>
			<small>{tweet.created_at.unwrap_or_default()}" "{engagement}</small>
		</li>
	}
}
