use super::{Style, ThemeId, ThemeManager};
use enumset::EnumSet;
use yew::prelude::*;

/// Context value handed to components below [`Provider`].
#[derive(Clone, PartialEq)]
pub struct ThemeHandle {
	manager: ThemeManager,
	theme: ThemeId,
}

impl ThemeHandle {
	pub fn theme(&self) -> ThemeId {
		self.theme
	}

	pub fn select(&self, theme: ThemeId) {
		let manager = self.manager.clone();
		wasm_bindgen_futures::spawn_local(async move {
			manager.select(theme).await;
		});
	}

	pub fn preview(&self, theme: ThemeId) {
		self.manager.preview(theme);
	}

	pub fn end_preview(&self) {
		self.manager.end_preview();
	}
}

#[derive(Properties, PartialEq)]
pub struct ProviderProps {
	pub manager: ThemeManager,
	#[prop_or_default]
	pub children: Html,
}

/// Mounts the theme before the first render and re-renders its children on every change.
#[function_component]
pub fn Provider(props: &ProviderProps) -> Html {
	let ProviderProps { manager, children } = props;
	let theme = use_state_eq({
		let manager = manager.clone();
		move || manager.mount()
	});

	use_effect_with(manager.clone(), {
		let theme = theme.clone();
		move |manager: &ThemeManager| {
			theme.set(manager.current());
			let subscription = manager.watch(move |value| theme.set(*value));
			move || drop(subscription)
		}
	});

	let handle = ThemeHandle {
		manager: manager.clone(),
		theme: *theme,
	};
	html! {
		<ContextProvider<ThemeHandle> context={handle}>
			{children.clone()}
		</ContextProvider<ThemeHandle>>
	}
}

#[hook]
pub fn use_theme() -> Option<ThemeHandle> {
	use_context::<ThemeHandle>()
}

/// Navbar dropdown listing every theme grouped by style. Hovering an entry previews it.
#[function_component]
pub fn Dropdown() -> Html {
	let Some(handle) = use_theme() else {
		log::warn!(target: "theme", "Theme dropdown rendered outside of a theme provider");
		return html! {};
	};

	let onclick = {
		let handle = handle.clone();
		Callback::from(move |e: MouseEvent| {
			let Some(element) = e.target_dyn_into::<web_sys::HtmlElement>() else {
				return;
			};
			let Some(value) = element.get_attribute("value") else {
				return;
			};
			match value.parse::<ThemeId>() {
				Ok(theme) => handle.select(theme),
				Err(err) => log::warn!(target: "theme", "{err}"),
			}
		})
	};
	let onmouseleave = {
		let handle = handle.clone();
		Callback::from(move |_: MouseEvent| handle.end_preview())
	};

	let current = handle.theme();
	html! {
		<li class="nav-item dropdown">
			<a class="nav-link dropdown-toggle" role="button" data-bs-toggle="dropdown" aria-expanded="false">
				<i class={format!("bi {}", current.mode().as_icon_name())} style="margin-right: 5px;" />
				{current.label()}
			</a>
			<div class="dropdown-menu dropdown-menu-end" {onmouseleave}>
				{EnumSet::<Style>::all().into_iter().map(|style| html! {<>
					<h6 class="dropdown-header">{style.as_display_name()}</h6>
					{ThemeId::all().filter(|theme| theme.style() == style).map(|theme| {
						let onmouseenter = {
							let handle = handle.clone();
							Callback::from(move |_: MouseEvent| handle.preview(theme))
						};
						html! {
							<a
								class={classes!("dropdown-item", (theme == current).then_some("active"))}
								value={theme.as_str()}
								onclick={onclick.clone()}
								{onmouseenter}
							>
								<i class={format!("bi {}", theme.mode().as_icon_name())} style="margin-right: 5px;"></i>
								{theme.label()}
							</a>
						}
					}).collect::<Vec<_>>()}
				</>}).collect::<Vec<_>>()}
			</div>
		</li>
	}
}
