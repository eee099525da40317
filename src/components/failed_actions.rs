use super::{use_failed_actions, Spinner};
use crate::queue::OfflineQueue;
use yew::prelude::*;

/// Lists actions that exhausted their retries, with controls to retry or discard them.
#[function_component]
pub fn FailedActions() -> Html {
	let queue = use_context::<OfflineQueue>();
	let failed = use_failed_actions();
	let Some(queue) = queue else {
		return html! {};
	};

	if failed.loading && failed.data.is_none() {
		return html! {<Spinner label="Loading failed actions" />};
	}
	if let Some(err) = &failed.error {
		log::warn!(target: "queue", "Failed to list failed actions: {err}");
	}
	let actions = failed.data.clone().unwrap_or_default();
	if actions.is_empty() {
		return html! {};
	}

	let retry_all = Callback::from({
		let queue = queue.clone();
		move |_: MouseEvent| {
			let queue = queue.clone();
			wasm_bindgen_futures::spawn_local(async move {
				if let Some(report) = queue.retry_failed().await {
					log::info!(target: "queue", "Retried failed actions: {report:?}");
				}
			});
		}
	});
	let discard_all = Callback::from({
		let queue = queue.clone();
		move |_: MouseEvent| {
			let queue = queue.clone();
			wasm_bindgen_futures::spawn_local(async move {
				if let Err(err) = queue.clear_failed().await {
					log::warn!(target: "queue", "Failed to discard failed actions: {err}");
				}
			});
		}
	});

	html! {
		<div class="card border-danger">
			<div class="card-header d-flex align-items-center">
				<span class="me-auto">{format!("{} action(s) could not be synced", actions.len())}</span>
				<button class="btn btn-sm btn-outline-primary me-2" onclick={retry_all} disabled={queue.is_processing()}>
					{"Retry all"}
				</button>
				<button class="btn btn-sm btn-outline-danger" onclick={discard_all}>{"Discard all"}</button>
			</div>
			<ul class="list-group list-group-flush">
				{actions.into_iter().map(|action| html! {
					<li class="list-group-item d-flex" key={action.id.clone()}>
						<span class="badge text-bg-secondary me-2">{action.kind.to_string()}</span>
						<span class="me-auto text-truncate">{action.id.clone()}</span>
						<span class="small text-body-secondary">{format!("{} attempts", action.retries)}</span>
					</li>
				}).collect::<Html>()}
			</ul>
		</div>
	}
}
