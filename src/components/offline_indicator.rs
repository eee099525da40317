use super::use_network_status;
use yew::prelude::*;

/// A banner shown while offline, and briefly after reconnecting.
#[function_component]
pub fn OfflineIndicator() -> Html {
	let status = use_network_status();
	let (class, icon, message) = match (status.online, status.just_reconnected) {
		(false, _) => ("alert-warning", "bi-wifi-off", "You are offline"),
		(true, true) => ("alert-success", "bi-wifi", "Back online!"),
		(true, false) => return html! {},
	};
	html! {
		<div class="position-fixed bottom-0 start-0 p-3" style="z-index: 1080;">
			<div class={classes!("alert", class, "shadow", "d-flex", "align-items-center", "gap-2", "mb-0")} role="status">
				<i class={classes!("bi", icon)} />
				<span class="fw-semibold">{message}</span>
				{status.is_offline().then(|| html! {
					<span class="small opacity-75">{"Changes will sync when you reconnect."}</span>
				})}
			</div>
		</div>
	}
}
