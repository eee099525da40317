use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SpinnerProps {
	#[prop_or("Loading...".into())]
	pub label: AttrValue,
}

#[function_component]
pub fn Spinner(props: &SpinnerProps) -> Html {
	html! {
		<div class="spinner-border spinner-border-sm" role="status">
			<span class="visually-hidden">{props.label.clone()}</span>
		</div>
	}
}
