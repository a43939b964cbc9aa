// src/process/cmdline.rs

//! Command-line construction for the Windows console host.
//!
//! The interactive launch hands a single line to `cmd /K`. Every token goes
//! through two steps:
//!
//! 1. argv quoting, as the C runtime of the target program parses it
//!    ([`quote_arg`]);
//! 2. caret-escaping of every character the console host would interpret
//!    ([`escape_for_console`]), quotes included, so the host never enters
//!    quote mode and removes exactly one caret per character.
//!
//! `%` is caret-escaped like the rest rather than doubled: `%%` only stands
//! for a literal percent inside batch files, not on a `cmd /K` line.

/// Characters `cmd.exe` treats specially on a command line.
const CONSOLE_METACHARS: [char; 10] = ['(', ')', '%', '!', '^', '"', '<', '>', '&', '|'];

/// Code page selected before the worker starts so Cyrillic output renders.
pub const CONSOLE_CODE_PAGE: u32 = 1251;

/// Quote one argument so `CommandLineToArgvW`-style parsing yields it back
/// unchanged.
///
/// Tokens without whitespace or quotes are returned as-is.
pub fn quote_arg(token: &str) -> String {
    let needs_quotes = token.is_empty() || token.contains([' ', '\t', '\n', '"']);
    if !needs_quotes {
        return token.to_string();
    }

    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');

    let mut backslashes = 0usize;
    for c in token.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                // Backslashes before a quote are escaped, then the quote.
                out.extend(std::iter::repeat_n('\\', backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            c => {
                out.extend(std::iter::repeat_n('\\', backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    // Trailing backslashes would escape the closing quote.
    out.extend(std::iter::repeat_n('\\', backslashes * 2));
    out.push('"');
    out
}

/// Prefix every console metacharacter with a caret.
pub fn escape_for_console(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if CONSOLE_METACHARS.contains(&c) {
            out.push('^');
        }
        out.push(c);
    }
    out
}

/// Quote, then escape, one token for the console host.
pub fn quote_for_console(token: &str) -> String {
    escape_for_console(&quote_arg(token))
}

/// Build the full line run by `cmd /K`: select the code page, then run the
/// program with every token escaped.
///
/// The `&` separating the two commands is the only unescaped metacharacter.
pub fn console_command_line(program: &str, args: &[String]) -> String {
    let mut line = format!("chcp {CONSOLE_CODE_PAGE} & {}", quote_for_console(program));
    for arg in args {
        line.push(' ');
        line.push_str(&quote_for_console(arg));
    }
    line
}
