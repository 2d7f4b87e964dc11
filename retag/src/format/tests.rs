use super::*;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
struct TestData {
    name: String,
    value: i32,
}

impl Formattable for TestData {
    fn format_pretty(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

fn data() -> TestData {
    TestData {
        name: "test".to_string(),
        value: 42,
    }
}

fn ctx(color: ColorChoice) -> AppContext {
    AppContext::build(color, VerbosityLevel::Normal)
}

#[test]
fn test_output_format_from_string() {
    assert_eq!(OutputFormat::from("pretty"), OutputFormat::Pretty);
    assert_eq!(OutputFormat::from("json"), OutputFormat::Json);
    assert_eq!(OutputFormat::from("YML"), OutputFormat::Yaml);
    assert_eq!(OutputFormat::from("invalid"), OutputFormat::Pretty);
}

#[test]
fn test_color_choice_from_string() {
    assert_eq!(ColorChoice::from("always"), ColorChoice::Always);
    assert_eq!(ColorChoice::from("Never"), ColorChoice::Never);
    assert_eq!(ColorChoice::from("auto"), ColorChoice::Auto);
    assert_eq!(ColorChoice::from("bogus"), ColorChoice::Auto);
}

#[test]
fn test_format_pretty() {
    let result = format_output(&data(), OutputFormat::Pretty);
    assert_eq!(result.unwrap(), "test: 42");
}

#[test]
fn test_format_json() {
    let result = format_output(&data(), OutputFormat::Json);
    let json: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
    assert_eq!(json["name"], "test");
    assert_eq!(json["value"], 42);
}

#[test]
fn test_format_yaml() {
    let result = format_output(&data(), OutputFormat::Yaml).unwrap();
    assert!(result.contains("name: test"));
    assert!(result.contains("value: 42"));
}

#[test]
fn test_should_color_follows_explicit_choice() {
    assert!(should_color(&ctx(ColorChoice::Always)));
    assert!(!should_color(&ctx(ColorChoice::Never)));
}

#[test]
fn test_marks_without_color() {
    let ctx = ctx(ColorChoice::Never);
    assert_eq!(checkmark(&ctx), "✓");
    assert_eq!(error_mark(&ctx), "✗");
}

#[test]
fn test_marks_with_color_keep_symbol() {
    let ctx = ctx(ColorChoice::Always);
    assert!(checkmark(&ctx).contains("✓"));
    assert_ne!(checkmark(&ctx), "✓");
    assert!(error_mark(&ctx).contains("✗"));
}

#[test]
fn test_escape_annotation() {
    assert_eq!(escape_annotation("plain"), "plain");
    assert_eq!(escape_annotation("100%\r\ndone"), "100%25%0D%0Adone");
}

#[test]
fn test_github_error_annotation() {
    assert_eq!(
        github_error_annotation("promote failed\nfor app-a"),
        "::error::promote failed%0Afor app-a"
    );
}

#[test]
fn test_print_respects_verbosity_hierarchy() {
    // Output goes to stderr; these only verify nothing panics.
    let ctx = AppContext::build(ColorChoice::Never, VerbosityLevel::Verbose);
    print(&ctx, VerbosityLevel::Normal, "never printed");
    print(&ctx, VerbosityLevel::Verbose, "printed");
    print(&ctx, VerbosityLevel::Trace, "suppressed");
}

#[test]
fn test_write_error_without_actions() {
    let mut out = Vec::new();
    write_error(&ctx(ColorChoice::Never), &mut out, "promote failed").unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "✗ promote failed\n");
}

#[test]
fn test_write_error_puts_annotation_on_same_stream() {
    let mut ctx = ctx(ColorChoice::Never);
    ctx.github_actions = true;

    let mut out = Vec::new();
    write_error(&ctx, &mut out, "repoint failed\nfor app-a").unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "✗ repoint failed\nfor app-a\n::error::repoint failed%0Afor app-a\n"
    );
}
