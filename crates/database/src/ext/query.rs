use wasm_bindgen::JsValue;

pub trait QueryExt {
	fn from_str_key(key: &str) -> idb::Query;
}

impl QueryExt for idb::Query {
	fn from_str_key(key: &str) -> idb::Query {
		idb::Query::Key(JsValue::from_str(key))
	}
}
