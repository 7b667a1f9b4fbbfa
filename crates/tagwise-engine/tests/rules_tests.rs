//! Tests for the bundled rules, each run on its own through the engine.

use serde_json::{Value, json};
use tagwise_engine::{Config, Engine, Message, Severity};
use tagwise_html::Source;

fn engine(rules: Value) -> Engine {
    Engine::from_config(&Config::from_value(json!({ "rules": rules })).unwrap()).unwrap()
}

/// Lint `markup` with only `rule` enabled.
fn lint(rule: &str, markup: &str) -> Vec<Message> {
    lint_with(json!({ rule: "error" }), markup)
}

fn lint_with(rules: Value, markup: &str) -> Vec<Message> {
    let mut report = engine(rules).lint(&[Source::inline(markup)]);
    assert_eq!(report.results.len(), 1);
    report.results.remove(0).messages
}

/// Message texts only.
fn texts(rule: &str, markup: &str) -> Vec<String> {
    lint(rule, markup).into_iter().map(|m| m.message).collect()
}

// ========== close-order ==========

#[test]
fn test_close_order_valid() {
    assert!(texts("close-order", "<div><p>lorem</p></div>").is_empty());
    assert!(texts("close-order", "<br><input>").is_empty());
}

#[test]
fn test_close_order_unmatched() {
    let messages = lint("close-order", "<div></div></p>");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "Unexpected close-tag, expected opening tag.");
    assert_eq!(messages[0].rule_id, "close-order");
    assert_eq!((messages[0].line, messages[0].column), (1, 12));
}

#[test]
fn test_close_order_ignores_void_end_tag() {
    assert!(texts("close-order", "<div><br></br></div>").is_empty());
}

#[test]
fn test_close_order_end_of_document() {
    let messages = lint("close-order", "<div>\n  <span>lorem</span>");
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].message,
        "Missing close-tag, expected '</div>' but document ended before it was found."
    );
    assert_eq!((messages[0].line, messages[0].column), (1, 1));
}

#[test]
fn test_close_order_mismatched() {
    assert_eq!(
        texts("close-order", "<div><span></div>"),
        ["Mismatched close-tag, expected '</span>' but found '</div>'."]
    );
}

#[test]
fn test_close_order_implicitly_closed_elements() {
    assert!(texts("close-order", "<ul><li></ul>").is_empty());
    assert!(texts("close-order", "<dl><dt>a<dd>b</dl>").is_empty());
    assert!(texts("close-order", "<table><tr><td>x</table>").is_empty());
}

// ========== void-style ==========

#[test]
fn test_void_style_omit() {
    assert!(texts("void-style", "<br><img src=\"a.png\">").is_empty());
    assert_eq!(
        texts("void-style", "<br/>"),
        ["Expected omitted end tag <br> instead of self-closing element <br/>"]
    );
}

#[test]
fn test_void_style_selfclose() {
    let rules = json!({ "void-style": ["error", { "style": "selfclose" }] });
    let messages: Vec<String> = lint_with(rules, "<br><hr/>").into_iter().map(|m| m.message).collect();
    assert_eq!(
        messages,
        ["Expected self-closing element <br/> instead of omitted end-tag <br>"]
    );

    let alias = json!({ "void-style": ["error", { "style": "selfclosing" }] });
    assert_eq!(lint_with(alias, "<br>").len(), 1);
}

#[test]
fn test_void_style_any() {
    let rules = json!({ "void-style": ["error", { "style": "any" }] });
    assert!(lint_with(rules, "<br><br/>").is_empty());
}

#[test]
fn test_void_style_end_tag() {
    assert_eq!(texts("void-style", "<br></br>"), ["End tag for <br> must be omitted"]);
}

#[test]
fn test_void_style_self_closed_non_void() {
    assert_eq!(texts("void-style", "<div/>"), ["End tag for <div> must not be omitted"]);
}

#[test]
fn test_void_style_ignores_foreign() {
    assert!(texts("void-style", "<svg><circle/></svg><math/>").is_empty());
}

// ========== deprecated ==========

#[test]
fn test_deprecated_with_message() {
    let messages = lint("deprecated", "<center>lorem</center>");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "<center> is deprecated: use CSS instead");
    assert_eq!(
        messages[0].context,
        Some(json!({ "element": "center", "message": "use CSS instead" }))
    );
}

#[test]
fn test_deprecated_without_message() {
    assert_eq!(texts("deprecated", "<blink>lorem</blink>"), ["<blink> is deprecated"]);
    assert!(texts("deprecated", "<span>lorem</span>").is_empty());
}

// ========== no-deprecated-attr ==========

#[test]
fn test_no_deprecated_attr() {
    assert_eq!(
        texts("no-deprecated-attr", "<img src=\"a.png\" ALIGN=\"left\">"),
        ["Attribute \"align\" is deprecated on <img> element"]
    );
    assert!(texts("no-deprecated-attr", "<img src=\"a.png\" alt=\"\">").is_empty());
}

// ========== no-dup-attr ==========

#[test]
fn test_no_dup_attr() {
    assert_eq!(
        texts("no-dup-attr", "<p class=\"a\" CLASS=\"b\"></p>"),
        ["Attribute \"class\" duplicated"]
    );
}

#[test]
fn test_no_dup_attr_resets_per_element() {
    assert!(texts("no-dup-attr", "<p id=\"a\"></p><p id=\"b\"></p>").is_empty());
}

// ========== no-dup-class ==========

#[test]
fn test_no_dup_class() {
    let messages = lint("no-dup-class", "<p class=\"foo bar foo\"></p>");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "Class \"foo\" duplicated");
    assert_eq!(messages[0].size, 3);
}

#[test]
fn test_no_dup_class_unique() {
    assert!(texts("no-dup-class", "<p class=\"foo foobar\"></p>").is_empty());
}

// ========== no-inline-style ==========

#[test]
fn test_no_inline_style() {
    assert_eq!(
        texts("no-inline-style", "<p style=\"color: red\"></p>"),
        ["Inline style is not allowed"]
    );
    assert!(texts("no-inline-style", "<p class=\"red\"></p>").is_empty());
}

// ========== no-unknown-elements ==========

#[test]
fn test_no_unknown_elements() {
    let messages = lint("no-unknown-elements", "<div><foo-bar></foo-bar></div>");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "Unknown element <foo-bar>");
    assert_eq!(messages[0].context, Some(json!("foo-bar")));
}

// ========== attribute-allowed-values ==========

#[test]
fn test_attribute_allowed_values_enum() {
    assert!(texts("attribute-allowed-values", "<input type=\"text\">").is_empty());
    assert_eq!(
        texts("attribute-allowed-values", "<input type=\"foo\">"),
        ["Attribute \"type\" has invalid value \"foo\""]
    );
}

#[test]
fn test_attribute_allowed_values_missing_value() {
    assert_eq!(
        texts("attribute-allowed-values", "<button type></button>"),
        ["Attribute \"type\" is missing value"]
    );
}

#[test]
fn test_attribute_allowed_values_boolean() {
    assert!(texts("attribute-allowed-values", "<input disabled>").is_empty());
    assert!(texts("attribute-allowed-values", "<input disabled=\"\">").is_empty());
    assert!(texts("attribute-allowed-values", "<input disabled=\"Disabled\">").is_empty());
    assert_eq!(
        texts("attribute-allowed-values", "<input disabled=\"yes\">"),
        ["Attribute \"disabled\" has invalid value \"yes\""]
    );
}

#[test]
fn test_attribute_allowed_values_context() {
    let messages = lint("attribute-allowed-values", "<form method=\"put\"></form>");
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].context,
        Some(json!({
            "element": "form",
            "attribute": "method",
            "value": "put",
            "allowed": ["get", "post", "dialog"],
        }))
    );
}

// ========== element-permitted-content ==========

#[test]
fn test_permitted_content_child() {
    assert!(texts("element-permitted-content", "<ul><li>lorem</li></ul>").is_empty());
    assert_eq!(
        texts("element-permitted-content", "<ul><div></div></ul>"),
        ["<div> element is not permitted as content under <ul>"]
    );
}

#[test]
fn test_permitted_content_descendant() {
    assert_eq!(
        texts("element-permitted-content", "<button><a href=\"#\">lorem</a></button>"),
        ["<a> element is not permitted as a descendant of <button>"]
    );
}

#[test]
fn test_permitted_content_transparent() {
    assert_eq!(
        texts("element-permitted-content", "<span><a href=\"#\"><div></div></a></span>"),
        ["<div> element is not permitted as content under <span>"]
    );
    assert!(texts("element-permitted-content", "<div><a href=\"#\"><div></div></a></div>").is_empty());
}

// ========== element-permitted-occurrences ==========

#[test]
fn test_permitted_occurrences() {
    assert!(texts("element-permitted-occurrences", "<table><caption></caption><tr></tr><tr></tr></table>").is_empty());
    assert_eq!(
        texts("element-permitted-occurrences", "<table><caption></caption><caption></caption></table>"),
        ["Element <caption> can only appear once under <table>"]
    );
}

// ========== element-permitted-order ==========

#[test]
fn test_permitted_order() {
    assert!(texts("element-permitted-order", "<table><caption></caption><tr></tr></table>").is_empty());
    assert_eq!(
        texts("element-permitted-order", "<table><tr></tr><caption></caption></table>"),
        ["Element <caption> must be used before <tr> in this context"]
    );
}

// ========== element-required-ancestor ==========

#[test]
fn test_required_ancestor() {
    assert!(texts("element-required-ancestor", "<ul><li>lorem</li></ul>").is_empty());
    assert_eq!(
        texts("element-required-ancestor", "<li>lorem</li>"),
        ["<li> element requires a <ul>, <ol>, <menu> or <template> ancestor"]
    );
}

#[test]
fn test_required_ancestor_selector() {
    assert!(texts("element-required-ancestor", "<dl><dt>a</dt><dd>b</dd></dl>").is_empty());
    assert_eq!(
        texts("element-required-ancestor", "<div><dd>lorem</dd></div>"),
        ["<dd> element requires a \"dl > dd\" or \"dl > div > dd\" ancestor"]
    );
}

// ========== element-required-content ==========

#[test]
fn test_required_content() {
    assert!(texts("element-required-content", "<details><summary>a</summary>b</details>").is_empty());
    assert_eq!(
        texts("element-required-content", "<details>lorem</details>"),
        ["<details> element must have <summary> as content"]
    );
}

#[test]
fn test_required_content_reports_each_missing() {
    assert_eq!(
        texts("element-required-content", "<html></html>"),
        [
            "<html> element must have <head> as content",
            "<html> element must have <body> as content",
        ]
    );
}

// ========== element-required-attributes ==========

#[test]
fn test_required_attributes() {
    assert!(texts("element-required-attributes", "<img src=\"a.png\">").is_empty());
    let messages = lint("element-required-attributes", "<img>");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, "<img> is missing required \"src\" attribute");
    assert_eq!(messages[0].severity, Severity::Error);
}

// ========== severity ==========

#[test]
fn test_warn_severity_keeps_report_valid() {
    let report = engine(json!({ "deprecated": "warn" })).lint(&[Source::inline("<center></center>")]);
    assert!(report.valid);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.error_count(), 0);
}

#[test]
fn test_off_rule_does_not_run() {
    assert!(lint_with(json!({ "deprecated": "off" }), "<center></center>").is_empty());
}
