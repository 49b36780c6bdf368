//! Classification of a submitted REPL line.

/// Keyword that ends the REPL without contacting the model.
pub const EXIT_KEYWORD: &str = "exit";

/// Whether `input` is the exit keyword (case-insensitive, surrounding
/// whitespace ignored).
pub fn is_exit_keyword(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_KEYWORD)
}
