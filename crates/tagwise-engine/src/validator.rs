//! Content-model checks shared by the bundled rules.
//!
//! Everything here is a pure function of the tree and a metadata rule list.

use std::collections::BTreeMap;

use tagwise_dom::{Attribute, DomTree, NodeId, SelectorError};
use tagwise_meta::{AttributeRule, PermittedEntry, Qualifier, Transparent};

/// Whether `node` is allowed by a permitted-content list.
///
/// `None` allows everything. The list is a set of alternatives: the node must
/// match at least one of them.
#[must_use]
pub fn validate_permitted(tree: &DomTree, node: NodeId, rules: Option<&[PermittedEntry]>) -> bool {
    rules.is_none_or(|rules| rules.iter().any(|rule| validate_permitted_rule(tree, node, rule, false)))
}

fn validate_permitted_rule(tree: &DomTree, node: NodeId, rule: &PermittedEntry, is_exclude: bool) -> bool {
    match rule {
        PermittedEntry::Tag { .. } | PermittedEntry::Category(_) => {
            validate_permitted_category(tree, node, rule, !is_exclude)
        }
        PermittedEntry::Group(members) => members
            .iter()
            .all(|member| validate_permitted_rule(tree, node, member, is_exclude)),
        PermittedEntry::Exclude(excluded) => !excluded
            .iter()
            .any(|member| validate_permitted_rule(tree, node, member, true)),
    }
}

/// Whether `node` matches a single tag or category entry.
///
/// Category entries cannot be decided for an element without metadata;
/// `default_match` is returned instead. Group and exclude entries are
/// evaluated as in [`validate_permitted`].
#[must_use]
pub fn validate_permitted_category(tree: &DomTree, node: NodeId, entry: &PermittedEntry, default_match: bool) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    match entry {
        PermittedEntry::Tag { name, .. } => element.is(name),
        PermittedEntry::Category(category) => {
            if element.meta.is_none() {
                default_match
            } else {
                tree.is_category(node, *category)
            }
        }
        PermittedEntry::Group(_) | PermittedEntry::Exclude(_) => validate_permitted_rule(tree, node, entry, !default_match),
    }
}

/// Whether `count` occurrences of `node`'s tag are allowed by `rules`.
///
/// Only a matching tag entry with a `?` qualifier limits the count (to one).
#[must_use]
pub fn validate_occurrences(tree: &DomTree, node: NodeId, rules: Option<&[PermittedEntry]>, count: usize) -> bool {
    let Some(rules) = rules else {
        return true;
    };
    let Some(element) = tree.as_element(node) else {
        return true;
    };
    let entry = rules.iter().find(|rule| match rule {
        PermittedEntry::Tag { name, .. } => element.is(name),
        _ => false,
    });
    match entry.and_then(PermittedEntry::qualifier) {
        Some(Qualifier::Optional) => count <= 1,
        Some(Qualifier::Any) | None => true,
    }
}

/// Check that `children` appear in the order given by `rules`.
///
/// Each child is ranked by the first entry it matches. A child matching no
/// entry is ignored. On the first child that matches only an entry ranked
/// before the current position, `on_violation(child, previous_child)` is
/// called and `false` returned.
pub fn validate_order(
    tree: &DomTree,
    children: &[NodeId],
    rules: Option<&[PermittedEntry]>,
    mut on_violation: impl FnMut(NodeId, Option<NodeId>),
) -> bool {
    let Some(rules) = rules else {
        return true;
    };
    let mut rank = 0;
    let mut previous = None;
    for &child in children {
        let old = rank;
        while rank < rules.len() && !validate_permitted_category(tree, child, &rules[rank], true) {
            rank += 1;
        }
        if rank >= rules.len() {
            if rules.iter().any(|rule| validate_permitted_category(tree, child, rule, true)) {
                on_violation(child, previous);
                return false;
            }
            rank = old;
        }
        previous = Some(child);
    }
    true
}

/// Whether `node` or one of its ancestors matches one of the `rules`
/// (tag names or simple selectors).
pub fn validate_ancestors(tree: &DomTree, node: NodeId, rules: Option<&[String]>) -> Result<bool, SelectorError> {
    let Some(rules) = rules.filter(|rules| !rules.is_empty()) else {
        return Ok(true);
    };
    for rule in rules {
        if tree.closest(node, rule)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The tag names in `required` with no matching descendant of `node`.
#[must_use]
pub fn validate_required_content(tree: &DomTree, node: NodeId, required: Option<&[String]>) -> Vec<String> {
    let Some(required) = required else {
        return Vec::new();
    };
    required
        .iter()
        .filter(|tag_name| {
            !tree
                .descendants(node)
                .any(|descendant| tree.as_element(descendant).is_some_and(|e| e.is(tag_name)))
        })
        .cloned()
        .collect()
}

/// Whether the attribute's value is allowed by `rules`.
///
/// Attributes without a rule pass, as do dynamic values. An empty rule list
/// marks a boolean attribute, which takes no value, an empty value or its
/// own name.
#[must_use]
pub fn validate_attribute(attribute: &Attribute, rules: &BTreeMap<String, Vec<AttributeRule>>) -> bool {
    let Some(allowed) = rules.get(&attribute.key.to_ascii_lowercase()) else {
        return true;
    };
    if attribute.is_dynamic() {
        return true;
    }
    let value = attribute.value_str();
    if allowed.is_empty() {
        return value.is_none_or(|value| value.is_empty() || value.eq_ignore_ascii_case(&attribute.key));
    }
    allowed.iter().any(|rule| rule.accepts(value))
}

/// Children of a transparent element that are validated against its parent's model.
#[must_use]
pub fn transparent_children(tree: &DomTree, node: NodeId, transparent: &Transparent) -> Vec<NodeId> {
    match transparent {
        Transparent::No => Vec::new(),
        Transparent::All => tree.child_elements(node).collect(),
        Transparent::Only(entries) => tree
            .child_elements(node)
            .filter(|&child| {
                entries
                    .iter()
                    .any(|entry| validate_permitted_category(tree, child, entry, false))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use tagwise_common::Location;
    use tagwise_dom::{AttributeValue, DynamicValue, ElementData, NodeType};
    use tagwise_html::{Parser, ParserOptions, Source};
    use tagwise_meta::{MetaTable, MetaTableBuilder};

    use super::*;

    fn location() -> Location {
        Location::new("inline", 1, 1, 0, 0)
    }

    fn element(tree: &mut DomTree, meta: &MetaTable, parent: NodeId, tag: &str) -> NodeId {
        let data = ElementData::new(tag, Vec::new(), meta.get_meta_for(tag));
        let id = tree.alloc(NodeType::Element(data), location());
        tree.append_child(parent, id);
        id
    }

    fn entries(tokens: &[&str]) -> Vec<PermittedEntry> {
        tokens.iter().map(|token| token.parse().unwrap()).collect()
    }

    fn content_model(rules: &Value) -> Vec<PermittedEntry> {
        PermittedEntry::list_from_values(rules.as_array().unwrap()).unwrap()
    }

    /// Parse `markup` against a table built from `elements` and return the top-level elements.
    fn parse_with(elements: &Value, markup: &str) -> (DomTree, Vec<NodeId>) {
        let mut builder = MetaTableBuilder::new();
        let _ = builder.load_from_value(elements, "test").unwrap();
        let parser = Parser::new(Arc::new(builder.init().unwrap()), ParserOptions::default());
        let tree = parser.parse(&Source::inline(markup)).unwrap();
        let children = tree.child_elements(NodeId::ROOT).collect();
        (tree, children)
    }

    fn parse_html5(markup: &str) -> DomTree {
        let parser = Parser::new(Arc::new(MetaTable::html5().unwrap()), ParserOptions::default());
        parser.parse(&Source::inline(markup)).unwrap()
    }

    fn attribute(key: &str, value: Option<&str>) -> Attribute {
        Attribute::new(key, value.map(str::to_string), location(), None)
    }

    fn attribute_rules(rules: &Value) -> BTreeMap<String, Vec<AttributeRule>> {
        rules
            .as_object()
            .unwrap()
            .iter()
            .map(|(key, values)| {
                let parsed = values
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|raw| AttributeRule::parse(raw.as_str().unwrap()).unwrap())
                    .collect();
                (key.clone(), parsed)
            })
            .collect()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|item| (*item).to_string()).collect()
    }

    // ========== validate_permitted ==========

    #[test]
    fn test_permitted_none_allows_everything() {
        let (tree, children) = parse_with(&json!({ "foo": { "void": true } }), "<foo/>");
        assert!(validate_permitted(&tree, children[0], None));
    }

    #[test]
    fn test_permitted_tag_name() {
        let elements = json!({ "foo": { "void": true }, "nil": { "void": true } });
        let (tree, children) = parse_with(&elements, "<foo/><nil/>");
        for rules in [entries(&["foo"]), entries(&["foo?"])] {
            assert!(validate_permitted(&tree, children[0], Some(&rules)));
            assert!(!validate_permitted(&tree, children[1], Some(&rules)));
        }
    }

    #[test]
    fn test_permitted_each_category() {
        let elements = json!({
            "nil": { "void": true },
            "meta": { "metadata": true, "void": true },
            "flow": { "flow": true, "void": true },
            "sectioning": { "sectioning": true, "void": true },
            "heading": { "heading": true, "void": true },
            "phrasing": { "phrasing": true, "void": true },
            "embedded": { "embedded": true, "void": true },
            "interactive": { "interactive": true, "void": true },
            "scripting": { "scriptSupporting": true, "void": true },
            "form": { "form": true, "void": true },
        });
        let cases = [
            ("@meta", "meta"),
            ("@flow", "flow"),
            ("@sectioning", "sectioning"),
            ("@heading", "heading"),
            ("@phrasing", "phrasing"),
            ("@embedded", "embedded"),
            ("@interactive", "interactive"),
            ("@script", "scripting"),
            ("@form", "form"),
        ];
        for (reference, tag) in cases {
            let (tree, children) = parse_with(&elements, &format!("<{tag}/><nil/>"));
            let rules = entries(&[reference]);
            assert!(validate_permitted(&tree, children[0], Some(&rules)), "<{tag}> in {reference}");
            assert!(!validate_permitted(&tree, children[1], Some(&rules)), "<nil> in {reference}");
        }
    }

    #[test]
    fn test_permitted_alternatives() {
        let elements = json!({
            "nil": { "void": true },
            "flow": { "flow": true, "void": true },
            "phrasing": { "phrasing": true, "void": true },
        });
        let (tree, children) = parse_with(&elements, "<flow/><phrasing/><nil/>");
        let rules = entries(&["@flow", "@phrasing"]);
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
        assert!(validate_permitted(&tree, children[1], Some(&rules)));
        assert!(!validate_permitted(&tree, children[2], Some(&rules)));
    }

    #[test]
    fn test_permitted_group_requires_every_member() {
        let elements = json!({
            "foo": { "flow": true, "phrasing": true, "void": true },
            "flow": { "flow": true, "phrasing": false, "void": true },
            "phrasing": { "flow": false, "phrasing": true, "void": true },
        });
        let (tree, children) = parse_with(&elements, "<foo/><flow/><phrasing/>");
        let rules = content_model(&json!([["@flow", "@phrasing"]]));
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
        assert!(!validate_permitted(&tree, children[1], Some(&rules)));
        assert!(!validate_permitted(&tree, children[2], Some(&rules)));
    }

    #[test]
    fn test_permitted_exclude_tag_name() {
        let elements = json!({
            "foo": { "flow": true, "void": true },
            "bar": { "flow": true, "void": true },
        });
        let (tree, children) = parse_with(&elements, "<foo/><bar/>");
        let rules = content_model(&json!([["@flow", { "exclude": "bar" }]]));
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
        assert!(!validate_permitted(&tree, children[1], Some(&rules)));
    }

    #[test]
    fn test_permitted_exclude_category_in_group() {
        let elements = json!({
            "foo": { "flow": true, "interactive": false, "void": true },
            "bar": { "flow": true, "interactive": true, "void": true },
        });
        let (tree, children) = parse_with(&elements, "<foo/><bar/>");
        let rules = content_model(&json!([["@flow", { "exclude": "@interactive" }]]));
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
        assert!(!validate_permitted(&tree, children[1], Some(&rules)));
    }

    #[test]
    fn test_permitted_exclude_multiple_targets() {
        let elements = json!({
            "foo": { "flow": true, "void": true },
            "bar": { "flow": true, "void": true },
        });
        let (tree, children) = parse_with(&elements, "<foo/><bar/>");
        for model in [
            json!([{ "exclude": ["bar", "baz"] }]),
            json!([["@flow", { "exclude": ["bar", "baz"] }]]),
        ] {
            let rules = content_model(&model);
            assert!(validate_permitted(&tree, children[0], Some(&rules)), "{model}");
            assert!(!validate_permitted(&tree, children[1], Some(&rules)), "{model}");
        }
    }

    #[test]
    fn test_permitted_top_level_exclude_is_an_alternative() {
        let elements = json!({
            "foo": { "flow": true, "void": true },
            "bar": { "flow": true, "void": true },
            "baz": { "phrasing": true, "void": true },
        });
        let (tree, children) = parse_with(&elements, "<foo/><bar/><baz/>");
        let rules = content_model(&json!(["@phrasing", { "exclude": "bar" }]));
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
        assert!(!validate_permitted(&tree, children[1], Some(&rules)));
        assert!(validate_permitted(&tree, children[2], Some(&rules)));
    }

    #[test]
    fn test_permitted_exclude_without_meta_passes() {
        let (tree, children) = parse_with(&json!({}), "<foo/>");
        let rules = content_model(&json!([[{ "exclude": "@interactive" }]]));
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
    }

    #[test]
    fn test_permitted_empty_exclude() {
        let (tree, children) = parse_with(&json!({ "foo": { "flow": true, "void": true } }), "<foo/>");
        let rules = content_model(&json!([["@flow", {}]]));
        assert!(validate_permitted(&tree, children[0], Some(&rules)));
    }

    #[test]
    fn test_order_categories() {
        let elements = json!({ "foo": { "void": true }, "bar": { "void": true, "flow": true } });
        let rules = entries(&["foo", "@flow"]);
        let (tree, children) = parse_with(&elements, "<foo/><bar/>");
        assert!(validate_order(&tree, &children, Some(&rules), |_, _| {}));
        let (tree, children) = parse_with(&elements, "<bar/><foo/>");
        assert!(!validate_order(&tree, &children, Some(&rules), |_, _| {}));
    }

    // ========== validate_ancestors ==========

    #[test]
    fn test_ancestors() {
        let tree = parse_html5("<dl id=\"variant-1\">\n  <dt></dt>\n  <dd></dd>\n</dl>");
        let dd = tree.query_selector(NodeId::ROOT, "dd").unwrap().unwrap();
        assert!(validate_ancestors(&tree, dd, None).unwrap());
        assert!(validate_ancestors(&tree, dd, Some(strings(&[]).as_slice())).unwrap());
        assert!(validate_ancestors(&tree, dd, Some(strings(&["dl"]).as_slice())).unwrap());
        assert!(validate_ancestors(&tree, dd, Some(strings(&["dl > dd"]).as_slice())).unwrap());
        assert!(validate_ancestors(&tree, dd, Some(strings(&["spam", "dl"]).as_slice())).unwrap());
        assert!(!validate_ancestors(&tree, dd, Some(strings(&["spam"]).as_slice())).unwrap());
        assert!(!validate_ancestors(&tree, dd, Some(strings(&["div > dd"]).as_slice())).unwrap());
    }

    // ========== validate_required_content ==========

    #[test]
    fn test_required_content() {
        let tree = parse_html5("<div><foo></foo></div>");
        let div = tree.query_selector(NodeId::ROOT, "div").unwrap().unwrap();
        assert!(validate_required_content(&tree, div, None).is_empty());
        assert!(validate_required_content(&tree, div, Some(strings(&[]).as_slice())).is_empty());

        let required = strings(&["foo", "bar", "baz"]);
        assert_eq!(validate_required_content(&tree, div, Some(required.as_slice())), ["bar", "baz"]);
    }

    // ========== validate_attribute ==========

    #[test]
    fn test_attribute_without_rule() {
        assert!(validate_attribute(&attribute("foo", Some("bar")), &BTreeMap::new()));
    }

    #[test]
    fn test_attribute_regex() {
        let ba = attribute_rules(&json!({ "foo": ["/ba.*/"] }));
        let any = attribute_rules(&json!({ "foo": ["/.*/"] }));
        assert!(validate_attribute(&attribute("foo", Some("bar")), &ba));
        assert!(validate_attribute(&attribute("foo", Some("foo")), &any));
        assert!(validate_attribute(&attribute("foo", Some("")), &any));
        assert!(!validate_attribute(&attribute("foo", Some("car")), &ba));
        assert!(!validate_attribute(&attribute("foo", None), &ba));
        assert!(!validate_attribute(&attribute("foo", None), &any));
    }

    #[test]
    fn test_attribute_literal() {
        let rules = attribute_rules(&json!({ "foo": ["fred", "barney", "wilma"] }));
        assert!(validate_attribute(&attribute("foo", Some("barney")), &rules));
        assert!(!validate_attribute(&attribute("foo", Some("pebble")), &rules));
        assert!(!validate_attribute(&attribute("FOO", Some("pebble")), &rules));

        let mixed = attribute_rules(&json!({ "foo": ["foo", "/bar/"] }));
        assert!(!validate_attribute(&attribute("foo", None), &mixed));
    }

    #[test]
    fn test_attribute_dynamic_value() {
        let rules = attribute_rules(&json!({ "foo": ["bar"], "bar": [] }));
        for key in ["foo", "bar"] {
            let mut attr = attribute(key, None);
            attr.value = Some(AttributeValue::Dynamic(DynamicValue { expr: "any".to_string() }));
            assert!(validate_attribute(&attr, &rules), "{key}");
        }
    }

    #[test]
    fn test_attribute_empty_literal() {
        let rules = attribute_rules(&json!({ "foo": [""] }));
        assert!(validate_attribute(&attribute("foo", None), &rules));
        assert!(validate_attribute(&attribute("foo", Some("")), &rules));
    }

    #[test]
    fn test_attribute_boolean() {
        let rules = attribute_rules(&json!({ "foo": [] }));
        assert!(validate_attribute(&attribute("foo", None), &rules));
        assert!(validate_attribute(&attribute("foo", Some("")), &rules));
        assert!(validate_attribute(&attribute("foo", Some("foo")), &rules));
        assert!(!validate_attribute(&attribute("foo", Some("bar")), &rules));
    }

    #[test]
    fn test_occurrences_optional() {
        let meta = Arc::new(MetaTable::html5().unwrap());
        let mut tree = DomTree::new(location());
        let foo = element(&mut tree, &meta, NodeId::ROOT, "foo");
        let rules = entries(&["foo?"]);
        assert!(validate_occurrences(&tree, foo, Some(&rules), 0));
        assert!(validate_occurrences(&tree, foo, Some(&rules), 1));
        assert!(!validate_occurrences(&tree, foo, Some(&rules), 2));
        assert!(!validate_occurrences(&tree, foo, Some(&rules), 7));
    }

    #[test]
    fn test_occurrences_unqualified_and_star() {
        let meta = MetaTable::html5().unwrap();
        let mut tree = DomTree::new(location());
        let foo = element(&mut tree, &meta, NodeId::ROOT, "foo");
        assert!(validate_occurrences(&tree, foo, Some(&entries(&["foo"])), 5));
        assert!(validate_occurrences(&tree, foo, Some(&entries(&["foo*"])), 5));
        assert!(validate_occurrences(&tree, foo, None, 5));
    }

    #[test]
    fn test_order_violation_reported_once() {
        let meta = MetaTable::html5().unwrap();
        let mut tree = DomTree::new(location());
        let bar = element(&mut tree, &meta, NodeId::ROOT, "bar");
        let foo = element(&mut tree, &meta, NodeId::ROOT, "foo");
        let rules = entries(&["foo", "bar"]);

        let mut calls = Vec::new();
        assert!(!validate_order(&tree, &[bar, foo], Some(&rules), |child, prev| calls.push((child, prev))));
        assert_eq!(calls, [(foo, Some(bar))]);

        calls.clear();
        assert!(validate_order(&tree, &[foo, bar], Some(&rules), |child, prev| calls.push((child, prev))));
        assert!(calls.is_empty());
    }

    #[test]
    fn test_order_skips_unconstrained_children() {
        let meta = MetaTable::html5().unwrap();
        let mut tree = DomTree::new(location());
        let foo = element(&mut tree, &meta, NodeId::ROOT, "foo");
        let other = element(&mut tree, &meta, NodeId::ROOT, "baz");
        let bar = element(&mut tree, &meta, NodeId::ROOT, "bar");
        let rules = entries(&["foo", "bar"]);
        assert!(validate_order(&tree, &[foo, other, bar], Some(&rules), |_, _| panic!("no violation")));
    }

    #[test]
    fn test_permitted_exclude() {
        let meta = MetaTable::html5().unwrap();
        let mut tree = DomTree::new(location());
        let span = element(&mut tree, &meta, NodeId::ROOT, "span");
        let button = element(&mut tree, &meta, NodeId::ROOT, "button");
        let rules = vec![PermittedEntry::Group(vec![
            "@flow".parse().unwrap(),
            PermittedEntry::Exclude(entries(&["@interactive"])),
        ])];
        assert!(validate_permitted(&tree, span, Some(&rules)));
        assert!(!validate_permitted(&tree, button, Some(&rules)));
    }

    #[test]
    fn test_category_without_meta() {
        let meta = MetaTable::html5().unwrap();
        let mut tree = DomTree::new(location());
        let custom = element(&mut tree, &meta, NodeId::ROOT, "my-element");
        assert!(validate_permitted(&tree, custom, Some(&entries(&["@phrasing"]))));
        let exclude = vec![PermittedEntry::Exclude(entries(&["@phrasing"]))];
        assert!(validate_permitted(&tree, custom, Some(&exclude)));
    }
}
