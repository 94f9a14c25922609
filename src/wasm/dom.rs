//! [`Page`] and [`Storage`] over the live document.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

use crate::error::{Error, Result};
use crate::page::Page;
use crate::storage::Storage;

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub struct WebPage {
    document: Document,
    root: Element,
}

impl WebPage {
    /// `None` when the document has no root element.
    pub fn new(document: Document) -> Option<Self> {
        let root = document.document_element()?;
        Some(Self { document, root })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Page for WebPage {
    type Element = Element;

    fn root(&self) -> Element {
        self.root.clone()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn create(&self, tag: &str) -> Result<Element> {
        self.document
            .create_element(tag)
            .map_err(|err| Error::Dom(describe(&err)))
    }

    fn append(&self, parent: &Element, child: &Element) -> Result<()> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(|err| Error::Dom(describe(&err)))
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn clear_children(&self, element: &Element) {
        element.set_inner_html("");
    }

    fn add_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().add_1(class) {
            tracing::warn!(err = %describe(&err), class, "could not add class");
        }
    }

    fn remove_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().remove_1(class) {
            tracing::warn!(err = %describe(&err), class, "could not remove class");
        }
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(err) = element.set_attribute(name, value) {
            tracing::warn!(err = %describe(&err), name, "could not set attribute");
        }
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(element) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = element.style().set_property(property, value) {
            tracing::warn!(err = %describe(&err), property, "could not set style");
        }
    }
}

/// `window.localStorage`.
pub struct LocalStorage(web_sys::Storage);

impl LocalStorage {
    pub fn open(window: &Window) -> Result<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self(storage)),
            Ok(None) => Err(Error::Storage("localStorage is not available".to_owned())),
            Err(err) => Err(Error::Storage(describe(&err))),
        }
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.0
            .get_item(key)
            .map_err(|err| Error::Storage(describe(&err)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.0
            .set_item(key, value)
            .map_err(|err| Error::Storage(describe(&err)))
    }
}
