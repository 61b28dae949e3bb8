/// One logical source line.
///
/// A logical line is usually a single physical line. When a double-quoted
/// string runs past the end of a physical line, the following physical lines
/// are joined onto it with `\n` until the string closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// The line text, including any embedded newlines.
    pub text:   String,
}

/// Result of scanning a piece of line text for strings and comments.
struct Scan {
    /// A double-quoted string is still open at the end of the text.
    open_string: bool,
    /// Byte offset where a `//` comment starts, or the text length.
    code_end:    usize,
}

/// Scans `text`, tracking quotes and backslash escapes, and stops at a `//`
/// outside of any string.
///
/// `inside_string` is the state carried over from the previous physical line
/// of the same logical line. Only double-quoted strings continue across line
/// breaks; a single-quoted string ends at the end of its line.
fn scan(text: &str, inside_string: bool) -> Scan {
    let mut quote = if inside_string { Some('"') } else { None };
    let mut escaped = false;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            },
            None => match c {
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                    return Scan { open_string: false,
                                  code_end:    offset, };
                },
                _ => {},
            },
        }
    }

    Scan { open_string: quote == Some('"'),
           code_end:    text.len(), }
}

/// Splits raw source text into logical lines.
///
/// Physical lines are split on `\n` with any trailing `\r` removed. A line
/// that leaves a double-quoted string open absorbs the following lines until
/// the string closes, so string literals may contain newlines. If the file ends
/// inside a string the partial line is kept as is and the lexer reports the
/// unclosed string when it executes.
///
/// # Example
/// ```
/// use slowpp::interpreter::source::break_lines;
///
/// let lines = break_lines("x = \"a\nb\"\nprint(x)");
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].text, "x = \"a\nb\"");
/// assert_eq!(lines[1].number, 3);
/// ```
#[must_use]
pub fn break_lines(source: &str) -> Vec<SourceLine> {
    let mut lines: Vec<SourceLine> = Vec::new();
    let mut open = false;

    for (index, physical) in source.split('\n').enumerate() {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);

        match lines.last_mut() {
            Some(current) if open => {
                current.text.push('\n');
                current.text.push_str(physical);
            },
            _ => lines.push(SourceLine { number: index + 1,
                                         text:   physical.to_string(), }),
        }

        open = scan(physical, open).open_string;
    }

    lines
}

/// Returns the code part of a logical line: the text before any `//` comment
/// that is not inside a string, trimmed.
///
/// # Example
/// ```
/// use slowpp::interpreter::source::code_part;
///
/// assert_eq!(code_part("  if (x) { // check"), "if (x) {");
/// assert_eq!(code_part("print(\"a // b\")"), "print(\"a // b\")");
/// ```
#[must_use]
pub fn code_part(text: &str) -> &str {
    let mut inside = false;
    let mut start = 0;

    // Joined lines restart the scan on every physical segment so strings
    // spanning lines are tracked.
    for segment in text.split('\n') {
        let result = scan(segment, inside);
        if result.code_end < segment.len() {
            return text[..start + result.code_end].trim();
        }
        inside = result.open_string;
        start += segment.len() + 1;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_keep_their_numbers() {
        let lines = break_lines("a = 1\r\nb = 2\n\nc = 3");
        let numbers: Vec<usize> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(lines[0].text, "a = 1");
        assert_eq!(lines[2].text, "");
    }

    #[test]
    fn strings_join_several_lines() {
        let lines = break_lines("s = \"one\ntwo\nthree\"\nprint(s)");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "s = \"one\ntwo\nthree\"");
        assert_eq!(lines[1], SourceLine { number: 4,
                                          text:   "print(s)".into(), });
    }

    #[test]
    fn escaped_and_single_quoted_quotes_do_not_open_strings() {
        let lines = break_lines("a = \"say \\\"hi\"\nb = '\"'\nc = 1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn quotes_in_comments_are_ignored() {
        let lines = break_lines("x = 1 // it's \"quoted\nprint(x)");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn code_part_strips_comments_outside_strings() {
        assert_eq!(code_part("} else { // fallback"), "} else {");
        assert_eq!(code_part("// only a comment"), "");
        assert_eq!(code_part("s = \"x\ny // z\" // tail"), "s = \"x\ny // z\"");
    }
}
