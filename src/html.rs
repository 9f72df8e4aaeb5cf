// src/html.rs

use scraper::node::Element;
use scraper::{ElementRef, Node};

use crate::process::utils::collapse_ws;

/// True if `el` carries `class` in its class list.
pub fn has_class(el: &Element, class: &str) -> bool {
    el.classes().any(|c| c == class)
}

/// Text of `el` with whitespace collapsed. Text under any descendant element
/// for which `skip` returns true is left out; `<br>` reads as a space.
pub fn visible_text(el: ElementRef<'_>, skip: impl Fn(&Element) -> bool) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .take_while(|a| a.id() != el.id())
                    .filter_map(|a| a.value().as_element())
                    .any(|e| skip(e));
                if !hidden {
                    out.push_str(text);
                }
            }
            Node::Element(e) if e.name() == "br" => out.push(' '),
            _ => {}
        }
    }
    collapse_ws(&out)
}

/// Nearest enclosing element named `name`, not counting `el` itself.
pub fn enclosing<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == name)
}
