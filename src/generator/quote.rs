//! Quoting for emitted build files.
//!
//! Paths and flags reach three different parsers: the shell running a
//! recipe, `make` reading a variable or prerequisite list, and Lua reading
//! a string literal. Each gets its own escaping.

/// Quote a word for a POSIX shell using double quotes.
pub fn shell(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 2);
    out.push('"');
    for c in word.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Quote a word for a shell command inside a make recipe.
pub fn make_recipe(word: &str) -> String {
    shell(word).replace('$', "$$")
}

/// Quote a word for the right-hand side of a make variable assignment.
///
/// The value is expanded into recipes later, so it is shell-quoted, with
/// `$` doubled and `#` escaped so make does not read it as a comment.
pub fn make_value(word: &str) -> String {
    make_recipe(word).replace('#', "\\#")
}

/// Escape a word used as a make target or prerequisite.
pub fn make_prerequisite(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        match c {
            '$' => out.push_str("$$"),
            ' ' | '#' | ':' | '\\' | '%' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Quote a string as a Lua literal.
pub fn lua(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 2);
    out.push('"');
    for c in word.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
