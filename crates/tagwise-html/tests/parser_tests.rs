//! Integration tests for the tree builder.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tagwise_dom::{Attribute, AttributeValue, DomTree, DynamicValue, NodeClosed, NodeId};
use tagwise_html::{CloseKind, Event, ParseError, Parser, ParserOptions, Source, SourceHooks};
use tagwise_meta::MetaTable;

fn parser(options: ParserOptions) -> Parser {
    Parser::new(Arc::new(MetaTable::html5().unwrap()), options)
}

/// Helper to parse a document with default options.
fn parse(input: &str) -> DomTree {
    parser(ParserOptions::default()).parse(&Source::inline(input)).unwrap()
}

/// Find the first element named `tag_name`.
fn element(tree: &DomTree, tag_name: &str) -> NodeId {
    tree.find(|_, element| element.is(tag_name))
        .unwrap_or_else(|| panic!("Expected a <{tag_name}> element"))
}

fn closed(tree: &DomTree, id: NodeId) -> NodeClosed {
    tree.as_element(id).unwrap().closed()
}

/// Record every event as `name:detail` while parsing `input`.
fn record_events(input: &str) -> Vec<String> {
    let parser = parser(ParserOptions::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let _ = parser.on("*", move |name, event, tree| {
        let detail = match event {
            Event::TagStart { target, .. } | Event::TagReady { target, .. } | Event::ElementReady { target, .. } => {
                tree.as_element(*target).map(|e| e.tag_name.clone()).unwrap_or_default()
            }
            Event::Attr { key, .. } => key.clone(),
            Event::TagEnd { target, tag_name, kind, .. } => {
                let name = target
                    .and_then(|id| tree.as_element(id))
                    .map(|e| e.tag_name.clone())
                    .or_else(|| tag_name.clone())
                    .unwrap_or_default();
                format!("{name}({kind})")
            }
            _ => String::new(),
        };
        sink.borrow_mut().push(format!("{name}:{detail}"));
    });
    let _ = parser.parse(&Source::inline(input)).unwrap();
    log.take()
}

// ========== structure ==========

#[test]
fn test_simple_tree() {
    let tree = parse("<div id=\"foo\"><p class=\"bar\">baz</p></div>");
    let div = tree.child_elements(NodeId::ROOT).next().unwrap();
    assert!(tree.as_element(div).unwrap().is("div"));
    assert_eq!(tree.as_element(div).unwrap().id(), Some("foo"));

    let p = tree.children(div)[0];
    assert!(tree.as_element(p).unwrap().is("p"));
    assert_eq!(tree.text_content(p), "baz");
    assert_eq!(tree.parent(p), Some(div));
    assert_eq!(closed(&tree, div), NodeClosed::EndTag);
    assert_eq!(closed(&tree, p), NodeClosed::EndTag);
}

#[test]
fn test_meta_is_attached() {
    let tree = parse("<div><custom-element></custom-element></div>");
    let div = element(&tree, "div");
    assert_eq!(tree.as_element(div).unwrap().meta.as_ref().map(|m| m.tag_name.as_str()), Some("div"));
    assert!(tree.as_element(element(&tree, "custom-element")).unwrap().meta.is_none());
}

#[test]
fn test_doctype() {
    let tree = parse("<!DOCTYPE html><html></html>");
    assert_eq!(tree.doctype(), Some("html"));
}

#[test]
fn test_element_location() {
    let tree = parse("<div>\n  <p></p>\n</div>");
    let location = tree.location(element(&tree, "p")).unwrap();
    assert_eq!((location.line, location.column, location.offset), (2, 3, 8));
}

#[test]
fn test_text_is_merged_across_comments() {
    let tree = parse("<p>a<!-- c -->b</p>");
    let p = element(&tree, "p");
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.as_text(tree.children(p)[0]), Some("ab"));
}

#[test]
fn test_script_content_is_text() {
    let tree = parse("<script>if (a < b) {}</script>");
    let script = element(&tree, "script");
    assert_eq!(tree.text_content(script), "if (a < b) {}");
    assert_eq!(tree.child_elements(script).count(), 0);
}

// ========== void and self-closed ==========

#[test]
fn test_void_elements() {
    let tree = parse("<div><input><br/></div>");
    assert_eq!(closed(&tree, element(&tree, "input")), NodeClosed::VoidOmitted);
    assert_eq!(closed(&tree, element(&tree, "br")), NodeClosed::VoidSelfClosed);
    assert_eq!(tree.child_elements(element(&tree, "div")).count(), 2);
}

#[test]
fn test_void_element_has_no_children() {
    let tree = parse("<img>text");
    let img = element(&tree, "img");
    assert!(tree.children(img).is_empty());
    assert_eq!(tree.children(tree.root()).len(), 2);
}

#[test]
fn test_self_closed_non_void() {
    let tree = parse("<div/><p></p>");
    let div = element(&tree, "div");
    assert_eq!(closed(&tree, div), NodeClosed::VoidSelfClosed);
    assert!(tree.children(div).is_empty());
    assert_eq!(tree.next_element_sibling(div), Some(element(&tree, "p")));
}

// ========== implicit and recovered closes ==========

#[test]
fn test_implicitly_closed_siblings() {
    let tree = parse("<ul><li>a<li>b</ul>");
    let ul = element(&tree, "ul");
    let items: Vec<NodeId> = tree.child_elements(ul).collect();
    assert_eq!(items.len(), 2);
    assert_eq!(tree.text_content(items[0]), "a");
    assert_eq!(tree.text_content(items[1]), "b");
    assert!(items.iter().all(|&li| closed(&tree, li) == NodeClosed::EndTag));
}

#[test]
fn test_implicit_close_events() {
    let events = record_events("<ul><li><li></ul>");
    let ends: Vec<&String> = events.iter().filter(|e| e.starts_with("tag-end")).collect();
    assert_eq!(ends, ["tag-end:li(implicit)", "tag-end:li(implicit)", "tag-end:ul(end-tag)"]);
}

#[test]
fn test_mismatched_end_tag_closes_intervening_elements() {
    let events = record_events("<div><span></div>");
    let ends: Vec<&String> = events.iter().filter(|e| e.starts_with("tag-end")).collect();
    assert_eq!(ends, ["tag-end:span(ancestor)", "tag-end:div(end-tag)"]);
}

#[test]
fn test_ancestor_end_tag_closes_optional_end_tags_implicitly() {
    let events = record_events("<table><tr><td>x</table>");
    let ends: Vec<&String> = events.iter().filter(|e| e.starts_with("tag-end")).collect();
    assert_eq!(
        ends,
        ["tag-end:td(implicit)", "tag-end:tr(implicit)", "tag-end:table(end-tag)"]
    );
}

#[test]
fn test_unmatched_end_tag() {
    let parser = parser(ParserOptions::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _ = parser.on("tag-end", move |_, event, _| {
        if let Event::TagEnd {
            target: None,
            previous,
            tag_name,
            kind,
            ..
        } = event
        {
            sink.borrow_mut().push((*previous, tag_name.clone(), *kind));
        }
    });
    let tree = parser.parse(&Source::inline("<div></span></div>")).unwrap();
    let div = element(&tree, "div");
    assert_eq!(*seen.borrow(), [(div, Some("span".to_string()), CloseKind::Unmatched)]);
    assert_eq!(closed(&tree, div), NodeClosed::EndTag);
}

#[test]
fn test_open_elements_at_end_of_document() {
    let events = record_events("<div><p>");
    let ends: Vec<&String> = events.iter().filter(|e| e.starts_with("tag-end")).collect();
    assert_eq!(ends, ["tag-end:p(end-of-document)", "tag-end:div(end-of-document)"]);

    let tree = parse("<div><p>");
    assert_eq!(closed(&tree, element(&tree, "div")), NodeClosed::Open);
    assert_eq!(closed(&tree, element(&tree, "p")), NodeClosed::Open);
}

#[test]
fn test_strict_close() {
    let parser = parser(ParserOptions { strict_close: true });
    let err = parser.parse(&Source::inline("<div>\n  <p>\n</div")).unwrap_err();
    assert!(matches!(err, ParseError::Tokenizer(_)));

    let err = parser.parse(&Source::inline("<div>\n  <p>")).unwrap_err();
    match &err {
        ParseError::UnclosedElement { tag, location } => {
            assert_eq!(tag, "p");
            assert_eq!((location.line, location.column), (2, 3));
        }
        _ => panic!("Expected UnclosedElement, got {err:?}"),
    }
    assert!(parser.parse(&Source::inline("<div></div>")).is_ok());
}

#[test]
fn test_tokenizer_error_aborts_parse() {
    let err = parser(ParserOptions::default())
        .parse(&Source::inline("<div id=\"x></div>"))
        .unwrap_err();
    assert!(matches!(err, ParseError::Tokenizer(_)));
    assert_eq!(err.location().column, 9);
}

// ========== foreign content ==========

#[test]
fn test_foreign_namespace() {
    let tree = parse("<svg><g><circle/></g></svg><p></p>");
    let svg = element(&tree, "svg");
    assert_eq!(tree.as_element(svg).unwrap().namespace, None);
    assert!(tree.as_element(svg).unwrap().meta.as_ref().is_some_and(|m| m.foreign));

    let circle = tree.as_element(element(&tree, "circle")).unwrap();
    assert_eq!(circle.namespace.as_deref(), Some("svg"));
    assert_eq!(circle.qualified_name(), "svg:circle");
    assert!(circle.meta.is_none());

    assert_eq!(tree.as_element(element(&tree, "p")).unwrap().namespace, None);
}

// ========== events ==========

#[test]
fn test_event_order() {
    let events = record_events("<!DOCTYPE html><div id=\"a\" hidden><br></div>");
    assert_eq!(
        events,
        [
            "dom-load:",
            "doctype:",
            "tag-start:div",
            "attr:id",
            "attr:hidden",
            "tag-ready:div",
            "tag-start:br",
            "tag-ready:br",
            "tag-end:br(void)",
            "element-ready:br",
            "tag-end:div(end-tag)",
            "element-ready:div",
            "dom-ready:",
        ]
    );
}

#[test]
fn test_whitespace_events() {
    let events = record_events("<div>\n  <p> x </p>\n</div>");
    assert_eq!(events.iter().filter(|e| e.starts_with("whitespace")).count(), 2);
}

#[test]
fn test_attr_event_payload() {
    let parser = parser(ParserOptions::default());
    let attrs = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&attrs);
    let _ = parser.on("attr", move |_, event, _| {
        if let Event::Attr {
            key,
            value,
            quote,
            value_location,
            ..
        } = event
        {
            let value = match value {
                Some(AttributeValue::Static(value)) => Some(value.clone()),
                _ => None,
            };
            sink.borrow_mut()
                .push((key.clone(), value, *quote, value_location.as_ref().map(|l| l.column)));
        }
    });
    let _ = parser.parse(&Source::inline("<a href='#' download>")).unwrap();
    assert_eq!(
        *attrs.borrow(),
        [
            ("href".to_string(), Some("#".to_string()), Some('\''), Some(10)),
            ("download".to_string(), None, None, None),
        ]
    );
}

#[test]
fn test_directive_event_parent() {
    let parser = parser(ParserOptions::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _ = parser.on("directive", move |_, event, _| {
        if let Event::Directive {
            action, data, parent, ..
        } = event
        {
            sink.borrow_mut().push((action.clone(), data.clone(), *parent));
        }
    });
    let tree = parser
        .parse(&Source::inline(
            "<!-- [html-validate-disable void-style] --><div><!-- [html-validate-disable-block foo] --></div>",
        ))
        .unwrap();
    let div = element(&tree, "div");
    assert_eq!(
        *seen.borrow(),
        [
            ("disable".to_string(), "void-style".to_string(), NodeId::ROOT),
            ("disable-block".to_string(), "foo".to_string(), div),
        ]
    );
}

#[test]
fn test_listeners_see_every_parse() {
    let parser = parser(ParserOptions::default());
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let _ = parser.on("dom-ready", move |_, _, _| *sink.borrow_mut() += 1);
    let _ = parser.parse(&Source::inline("<p>")).unwrap();
    let _ = parser.parse(&Source::inline("<div></div>")).unwrap();
    assert_eq!(*count.borrow(), 2);
}

#[test]
fn test_listener_can_mutate_tree() {
    let parser = parser(ParserOptions::default());
    let _ = parser.on("tag-start", |_, event, tree| {
        if let Some(target) = event.target()
            && let Some(element) = tree.as_element_mut(target)
        {
            element.disable_rule("deprecated");
        }
    });
    let tree = parser.parse(&Source::inline("<center></center>")).unwrap();
    assert!(!tree.as_element(element(&tree, "center")).unwrap().rule_enabled("deprecated"));
}

// ========== hooks ==========

#[test]
fn test_process_attribute_hook() {
    let hooks = SourceHooks {
        process_attribute: Some(Arc::new(|attr: Attribute| {
            let Some(key) = attr.key.strip_prefix(':').map(str::to_string) else {
                return vec![attr];
            };
            let mut derived = attr.clone();
            derived.value = attr.value_str().map(|expr| {
                AttributeValue::Dynamic(DynamicValue {
                    expr: expr.to_string(),
                })
            });
            derived.original_attribute = Some(attr.key.clone());
            derived.key = key;
            vec![attr, derived]
        })),
        process_element: None,
    };
    let source = Source::inline("<input :value=\"name\">").with_hooks(hooks);
    let tree = parser(ParserOptions::default()).parse(&source).unwrap();
    let input = tree.as_element(element(&tree, "input")).unwrap();
    assert_eq!(input.attrs.len(), 2);

    let derived = input.attribute("value").unwrap();
    assert!(derived.is_dynamic());
    assert_eq!(derived.original_attribute.as_deref(), Some(":value"));
}

#[test]
fn test_process_element_hook() {
    let hooks = SourceHooks {
        process_attribute: None,
        process_element: Some(Arc::new(|tree: &mut DomTree, id: NodeId, meta: &MetaTable| {
            if let Some(element) = tree.as_element_mut(id)
                && element.is("my-button")
            {
                element.meta = meta.get_meta_for("button");
            }
        })),
    };
    let source = Source::inline("<my-button></my-button>").with_hooks(hooks);
    let tree = parser(ParserOptions::default()).parse(&source).unwrap();
    let button = tree.as_element(element(&tree, "my-button")).unwrap();
    assert_eq!(button.meta.as_ref().map(|m| m.tag_name.as_str()), Some("button"));
}

#[test]
fn test_source_offset_is_preserved() {
    let source = Source::new("<p></p>", "component.vue").at(4, 3, 50);
    let tree = parser(ParserOptions::default()).parse(&source).unwrap();
    let location = tree.location(element(&tree, "p")).unwrap();
    assert_eq!(location.filename, "component.vue");
    assert_eq!((location.line, location.column, location.offset), (4, 3, 50));
}
