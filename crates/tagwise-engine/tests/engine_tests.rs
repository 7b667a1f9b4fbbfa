//! Tests for the engine: directives, parser errors, reporting, dumps and plugins.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use tagwise_common::Location;
use tagwise_engine::{
    Config, Engine, Message, Plugin, Report, Reporter, Rule, RuleContext, RuleDocumentation, RuleRegistry, Severity,
};
use tagwise_html::{Event, EventHandler, Source};

fn engine(config: Value) -> Engine {
    Engine::from_config(&Config::from_value(config).unwrap()).unwrap()
}

fn messages(engine: &Engine, markup: &str) -> Vec<Message> {
    let mut report = engine.lint(&[Source::inline(markup)]);
    report.results.remove(0).messages
}

fn deprecated_engine() -> Engine {
    engine(json!({ "rules": { "deprecated": "error" } }))
}

fn loc(line: usize, column: usize) -> Location {
    Location::new("a.html", line, column, 0, 1)
}

// ========== directives ==========

#[test]
fn test_directive_disable() {
    let found = messages(
        &deprecated_engine(),
        "<center></center>\n<!-- [html-validate-disable deprecated] -->\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 1);
}

#[test]
fn test_directive_enable_off_rule() {
    let engine = engine(json!({ "rules": { "deprecated": "off" } }));
    let found = messages(
        &engine,
        "<center></center>\n<!-- [html-validate-enable deprecated] -->\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 3);
    assert_eq!(found[0].severity, Severity::Error);
}

#[test]
fn test_directive_disable_then_enable() {
    let found = messages(
        &deprecated_engine(),
        "<!-- [html-validate-disable deprecated] -->\n<center></center>\n<!-- [html-validate-enable deprecated] -->\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 4);
}

#[test]
fn test_directive_disable_block() {
    let found = messages(
        &deprecated_engine(),
        "<div>\n  <!-- [html-validate-disable-block deprecated] -->\n  <center></center>\n</div>\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 5);
}

#[test]
fn test_directive_disable_block_at_root_lasts_to_end() {
    let found = messages(
        &deprecated_engine(),
        "<!-- [html-validate-disable-block deprecated] -->\n<center></center>\n<center></center>",
    );
    assert!(found.is_empty());
}

#[test]
fn test_directive_disable_block_applies_to_tree_rules() {
    let engine = engine(json!({ "rules": { "element-required-content": "error" } }));
    let found = messages(
        &engine,
        "<div>\n  <!-- [html-validate-disable-block element-required-content] -->\n  <details></details>\n</div>\n<details></details>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 5);
}

#[test]
fn test_directive_disable_next() {
    let found = messages(
        &deprecated_engine(),
        "<!-- [html-validate-disable-next deprecated -- legacy markup] -->\n<center></center>\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 3);
}

#[test]
fn test_directive_disable_next_skips_enclosing_element() {
    let found = messages(
        &deprecated_engine(),
        "<center><!-- [html-validate-disable-next deprecated] --></center>\n<center></center>",
    );
    let lines: Vec<usize> = found.iter().map(|m| m.line).collect();
    assert_eq!(lines, [1, 2]);
}

#[test]
fn test_directive_disable_next_nested() {
    let found = messages(
        &deprecated_engine(),
        "<div>\n  <span>\n    <!-- [html-validate-disable-next deprecated] -->\n    <center></center>\n    <center></center>\n  </span>\n</div>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].line, found[0].column), (5, 5));
}

#[test]
fn test_directive_disable_next_ends_at_tag_end() {
    let found = messages(
        &deprecated_engine(),
        "<div><!-- [html-validate-disable-next deprecated] --></div>\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 2);
}

#[test]
fn test_directive_disable_next_covers_attributes() {
    let engine = engine(json!({ "rules": { "no-inline-style": "error" } }));
    let found = messages(
        &engine,
        "<!-- [html-validate-disable-next no-inline-style] -->\n<div style=\"a\"></div>\n<div style=\"b\"></div>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, 3);
}

#[test]
fn test_directive_multiple_rules() {
    let engine = engine(json!({ "rules": { "deprecated": "error", "no-inline-style": "error" } }));
    let found = messages(
        &engine,
        "<!-- [html-validate-disable deprecated, no-inline-style] -->\n<center style=\"color: red\"></center>",
    );
    assert!(found.is_empty());
}

#[test]
fn test_directive_unknown_rule_is_ignored() {
    let found = messages(
        &deprecated_engine(),
        "<!-- [html-validate-disable no-such-rule] -->\n<center></center>",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rule_id, "deprecated");
}

#[test]
fn test_unknown_directive() {
    let found = messages(&deprecated_engine(), "<!-- [html-validate-frobnicate deprecated] -->");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rule_id, "parser-error");
    assert_eq!(found[0].message, "Unknown directive \"frobnicate\"");
}

#[test]
fn test_directives_reset_between_sources() {
    let report = deprecated_engine().lint(&[
        Source::new("<!-- [html-validate-disable deprecated] --><center></center>", "a.html"),
        Source::new("<center></center>", "b.html"),
    ]);
    assert_eq!(report.results[0].messages.len(), 0);
    assert_eq!(report.results[1].messages.len(), 1);
}

// ========== parser errors ==========

#[test]
fn test_tokenizer_error_becomes_message() {
    let report = deprecated_engine().lint(&[
        Source::new("<div", "broken.html"),
        Source::new("<center></center>", "ok.html"),
    ]);
    assert!(!report.valid);
    assert_eq!(report.results.len(), 2);

    let broken = &report.results[0];
    assert_eq!(broken.file_path, "broken.html");
    assert_eq!(broken.messages.len(), 1);
    assert_eq!(broken.messages[0].rule_id, "parser-error");
    assert!(broken.messages[0].message.starts_with("Unterminated tag"));

    assert_eq!(report.results[1].messages[0].rule_id, "deprecated");
}

#[test]
fn test_strict_close() {
    let engine = engine(json!({ "strictClose": true }));
    let found = messages(&engine, "<div>\n<p>lorem</p>");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rule_id, "parser-error");
    assert_eq!(
        found[0].message,
        "Missing end tag for <div>: document ended while the element was still open"
    );
    assert_eq!((found[0].line, found[0].column), (1, 1));
}

#[test]
fn test_missing_rule() {
    let engine = engine(json!({ "rules": { "no-such-rule": "error" } }));
    let found = messages(&engine, "<p></p>");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rule_id, "no-such-rule");
    assert_eq!(found[0].message, "Definition for rule 'no-such-rule' was not found");
}

// ========== report ==========

#[test]
fn test_every_source_gets_a_result() {
    let report = Engine::from_config(&Config::default_config())
        .unwrap()
        .lint(&[Source::new("<p></p>", "a.html"), Source::new("<p></p>", "b.html")]);
    assert!(report.valid);
    let paths: Vec<&str> = report.results.iter().map(|r| r.file_path.as_str()).collect();
    assert_eq!(paths, ["a.html", "b.html"]);
    assert_eq!(report.results[0].source.as_deref(), Some("<p></p>"));
}

#[test]
fn test_default_config_finds_problems() {
    let engine = Engine::from_config(&Config::default_config()).unwrap();
    let report = engine.lint(&[Source::inline("<p>lorem</i>")]);
    assert!(!report.valid);
    assert!(report.error_count() >= 1);
}

#[test]
fn test_reporter_sorts_and_counts() {
    let mut reporter = Reporter::new();
    reporter.add("b", Severity::Warn, "second", &loc(2, 1), None);
    reporter.add("a", Severity::Error, "first", &loc(1, 5), None);
    reporter.add("c", Severity::Error, "third", &loc(2, 3), None);
    assert!(reporter.has_errors());

    let report = reporter.save(&[]);
    assert!(!report.valid);
    let result = &report.results[0];
    let order: Vec<&str> = result.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(order, ["first", "second", "third"]);
    assert_eq!(result.error_count, 2);
    assert_eq!(result.warning_count, 1);
    assert_eq!(result.source, None);
}

#[test]
fn test_reporter_warnings_only_is_valid() {
    let mut reporter = Reporter::new();
    reporter.add_manual("a.html", Message::new("x", Severity::Warn, "careful", &loc(1, 1)));
    assert!(!reporter.has_errors());
    assert!(reporter.save(&[]).valid);
}

#[test]
fn test_report_merge() {
    let mut first = Reporter::new();
    first.add("x", Severity::Warn, "later", &loc(3, 1), None);
    let mut second = Reporter::new();
    second.add("y", Severity::Error, "earlier", &loc(1, 1), None);
    let mut third = Reporter::new();
    third.add_file("b.html");

    let merged = Report::merge([first.save(&[]), second.save(&[]), third.save(&[])]);
    assert!(!merged.valid);
    assert_eq!(merged.results.len(), 2);
    assert_eq!(merged.results[0].messages[0].message, "earlier");
    assert_eq!(merged.results[0].error_count, 1);
    assert_eq!(merged.results[0].warning_count, 1);
    assert_eq!(merged.error_count(), 1);
    assert_eq!(merged.warning_count(), 1);
}

#[test]
fn test_report_serializes_camel_case() {
    let engine = engine(json!({ "rules": { "deprecated": "warn" } }));
    let report = engine.lint(&[Source::inline("<blink></blink>")]);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["valid"], json!(true));
    assert_eq!(value["results"][0]["filePath"], json!("inline"));
    assert_eq!(value["results"][0]["warningCount"], json!(1));
    assert_eq!(value["results"][0]["messages"][0]["ruleId"], json!("deprecated"));
    assert_eq!(value["results"][0]["messages"][0]["severity"], json!(1));
}

// ========== documentation ==========

#[test]
fn test_rule_documentation() {
    let engine = deprecated_engine();
    let context = json!({ "element": "center", "message": "use CSS instead" });
    let documentation = engine.get_rule_documentation("deprecated", Some(&context)).unwrap();
    assert_eq!(
        documentation.description,
        "The <center> element is deprecated and should not be used in new code.\n\nuse CSS instead"
    );
    assert!(engine.get_rule_documentation("deprecated", None).is_some());
    assert!(engine.get_rule_documentation("close-order", None).is_none());
}

// ========== dumps ==========

#[test]
fn test_dump_tokens() {
    let tokens = deprecated_engine().dump_tokens(&[Source::inline("<p>a</p>")]).unwrap();
    let kinds: Vec<&str> = tokens.iter().map(|t| t.token.as_str()).collect();
    assert_eq!(kinds, ["TAG_OPEN", "TAG_CLOSE", "TEXT", "TAG_OPEN", "TAG_CLOSE", "EOF"]);
    assert_eq!(tokens[0].data.as_deref(), Some("<p"));
    assert_eq!(tokens[0].location, "inline:1:1");
    assert_eq!(tokens[5].data, None);
}

#[test]
fn test_dump_tokens_error() {
    assert!(deprecated_engine().dump_tokens(&[Source::inline("<div")]).is_err());
}

#[test]
fn test_dump_events() {
    let events = deprecated_engine().dump_events(&[Source::inline("<p></p>")]).unwrap();
    let names: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
    assert_eq!(names.first(), Some(&"dom-load"));
    assert_eq!(names.last(), Some(&"dom-ready"));
    assert!(names.contains(&"tag-start"));
    assert!(names.contains(&"tag-end"));
}

#[test]
fn test_dump_tree() {
    let lines = deprecated_engine()
        .dump_tree(&Source::inline("<div id=\"a\"><p class=\"b\"></p></div>"))
        .unwrap();
    assert_eq!(lines, ["(root)", "└─┬ div#a", "  └── p.b"]);
}

// ========== plugins ==========

struct NoMarquee;

impl Rule for NoMarquee {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("Do not use <marquee>.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("tag-start", |ctx, event, tree| {
            if let Event::TagStart { target, .. } = event
                && tree.as_element(*target).is_some_and(|e| e.is("marquee"))
            {
                ctx.report(tree, Some(*target), "<marquee> is not allowed");
            }
        });
    }
}

#[derive(Default)]
struct TestPlugin {
    sources: AtomicUsize,
}

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        "test-plugin"
    }

    fn register_rules(&self, registry: &mut RuleRegistry) {
        registry.register("no-marquee", |_: &Value| Ok(Arc::new(NoMarquee) as Arc<dyn Rule>));
    }

    fn setup(&self, _source: &Source, _events: &EventHandler) {
        let _ = self.sources.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_plugin_rules_and_setup() {
    let plugin = Arc::new(TestPlugin::default());
    let config = Config::from_value(json!({
        "plugins": ["test-plugin"],
        "rules": { "no-marquee": "error" }
    }))
    .unwrap();
    let resolved = config
        .resolve_with_plugins(&[Arc::clone(&plugin) as Arc<dyn Plugin>])
        .unwrap();
    assert_eq!(resolved.plugins().len(), 1);

    let engine = Engine::new(resolved);
    let report = engine.lint(&[
        Source::new("<marquee>lorem</marquee>", "a.html"),
        Source::new("<p>lorem</p>", "b.html"),
    ]);
    assert_eq!(plugin.sources.load(Ordering::SeqCst), 2);
    assert_eq!(report.results[0].messages.len(), 1);
    assert_eq!(report.results[0].messages[0].message, "<marquee> is not allowed");
    assert!(report.results[1].messages.is_empty());
}

#[test]
fn test_plugin_rule_without_plugin_is_missing() {
    let found = messages(&engine(json!({ "rules": { "no-marquee": "error" } })), "<marquee></marquee>");
    assert_eq!(found[0].message, "Definition for rule 'no-marquee' was not found");
}
