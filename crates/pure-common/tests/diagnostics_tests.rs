use super::*;

#[test]
fn test_error_display_matches_compiler_format() {
    let diag = Diagnostic::error(
        "inferenceTest.pure",
        SourceRange::new(4, 8, 4, 12),
        "The system can't find a match for the function: tt(_:Integer[1])",
        1006,
    );
    assert_eq!(
        diag.to_string(),
        "Compilation error at (resource:inferenceTest.pure line:4 column:8), \
         \"The system can't find a match for the function: tt(_:Integer[1])\""
    );
}

#[test]
fn test_related_information_is_appended() {
    let diag = Diagnostic::error("a.pure", SourceRange::point(1, 1), "boom", 1)
        .with_related("b.pure", SourceRange::point(2, 3), "declared here");
    assert_eq!(diag.related_information.len(), 1);
    assert_eq!(diag.related_information[0].file, "b.pure");
    assert_eq!(
        diag.related_information[0].category,
        DiagnosticCategory::Message
    );
}

#[test]
fn test_format_message_placeholders() {
    assert_eq!(
        format_message("Type argument mismatch for {0}; got: {1}", &["Pair<U, V>", "Pair<String>"]),
        "Type argument mismatch for Pair<U, V>; got: Pair<String>"
    );
}

#[test]
fn test_diagnostic_serializes_to_json() {
    let diag = Diagnostic::error("a.pure", SourceRange::point(1, 2), "msg", 7);
    let json = serde_json::to_string(&diag).expect("serializable");
    assert!(json.contains("\"code\":7"));
    assert!(json.contains("\"message_text\":\"msg\""));
}
