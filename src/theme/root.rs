use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

/// The element stylesheets read the active theme from.
pub trait RenderRoot {
	fn set_attribute(&self, name: &str, value: &str);
	fn attribute(&self, name: &str) -> Option<String>;
}

/// Attributes held in memory, standing in for a document outside the browser.
#[derive(Clone, Default)]
pub struct MemoryRoot(Rc<RefCell<BTreeMap<String, String>>>);

impl RenderRoot for MemoryRoot {
	fn set_attribute(&self, name: &str, value: &str) {
		self.0.borrow_mut().insert(name.to_owned(), value.to_owned());
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.0.borrow().get(name).cloned()
	}
}

/// The `<html>` element of the current document.
#[cfg(target_family = "wasm")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentRoot;

#[cfg(target_family = "wasm")]
impl RenderRoot for DocumentRoot {
	fn set_attribute(&self, name: &str, value: &str) {
		let Some(element) = gloo_utils::document().document_element() else {
			log::warn!(target: "theme", "Document has no root element to apply {name}={value:?} to");
			return;
		};
		if let Err(err) = element.set_attribute(name, value) {
			log::warn!(target: "theme", "Failed to set {name} on the document root: {err:?}");
		}
	}

	fn attribute(&self, name: &str) -> Option<String> {
		gloo_utils::document().document_element()?.get_attribute(name)
	}
}
