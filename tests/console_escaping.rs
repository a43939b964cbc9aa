// tests/console_escaping.rs

use jac::process::cmdline::{console_command_line, escape_for_console, quote_arg, quote_for_console};

#[test]
fn plain_tokens_pass_through() {
    assert_eq!(quote_for_console("-Xmx512m"), "-Xmx512m");
    assert_eq!(quote_for_console(r"C:\apps\billing.jar"), r"C:\apps\billing.jar");
}

#[test]
fn tokens_with_spaces_are_quoted_and_quotes_caret_escaped() {
    assert_eq!(quote_arg(r"C:\Program Files\app.jar"), r#""C:\Program Files\app.jar""#);
    assert_eq!(
        quote_for_console(r"C:\Program Files\app.jar"),
        r#"^"C:\Program Files\app.jar^""#
    );
}

#[test]
fn empty_token_survives_as_empty_quotes() {
    assert_eq!(quote_arg(""), r#""""#);
    assert_eq!(quote_for_console(""), r#"^"^""#);
}

#[test]
fn embedded_quotes_and_trailing_backslashes_follow_argv_rules() {
    assert_eq!(quote_arg(r#"say "hi""#), r#""say \"hi\"""#);
    assert_eq!(quote_arg(r"C:\dir with space\"), r#""C:\dir with space\\""#);
    assert_eq!(quote_arg(r#"a\"b c"#), r#""a\\\"b c""#);
}

#[test]
fn every_console_metacharacter_is_neutralised() {
    assert_eq!(escape_for_console("a&b|c<d>e"), "a^&b^|c^<d^>e");
    assert_eq!(escape_for_console("(x)^y"), "^(x^)^^y");
    assert_eq!(escape_for_console("%PATH%!v!"), "^%PATH^%^!v^!");
    assert_eq!(
        quote_for_console("-Dmsg=fish & chips"),
        r#"^"-Dmsg=fish ^& chips^""#
    );
}

#[test]
fn command_line_switches_code_page_first() {
    let args = vec!["-Dname=a&b".to_string(), "-jar".to_string(), r"C:\a b\x.jar".to_string()];
    assert_eq!(
        console_command_line("java", &args),
        r#"chcp 1251 & java -Dname=a^&b -jar ^"C:\a b\x.jar^""#
    );
}
