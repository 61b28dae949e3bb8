use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    error::{RuntimeError, SyntaxError},
    interpreter::{
        evaluator::core::EvalResult,
        source::{code_part, SourceLine},
    },
};

/// A hoisted user function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    /// The function name.
    pub name:   String,
    /// Parameter names in declaration order.
    pub params: Vec<String>,
    /// Index of the `func` header line.
    pub header: usize,
    /// Index of the closing `}` line. The body is `header + 1..end`.
    pub end:    usize,
}

/// The loaded program: logical lines plus everything the hoisting pass
/// derives from them.
#[derive(Debug, Default)]
pub struct Program {
    /// Logical lines, addressed by zero-based index.
    pub lines:          Vec<SourceLine>,
    /// User functions by name.
    pub functions:      FxHashMap<String, FunctionDef>,
    /// Indices of lines owned by functions (header, body and closing line).
    pub function_lines: BTreeSet<usize>,
    /// Maps each block-opening line to the line that closes it. For an
    /// `if`/`elif`/`else` chain the closing line of one branch is the opening
    /// line of the next.
    block_ends:         FxHashMap<usize, usize>,
    /// Number of leading flag header lines, which are never executed.
    pub header_len:     usize,
}

/// Returns `true` if `name` is a valid identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses a `func name(a, b) {` header. `code` is the comment-free, trimmed
/// line text.
fn parse_header(code: &str, line: usize) -> EvalResult<(String, Vec<String>)> {
    let invalid = || SyntaxError::InvalidFunctionDefinition { line };

    let rest = code.strip_prefix("func ").ok_or_else(invalid)?;
    let open = rest.find('(').ok_or_else(invalid)?;
    let close = rest.find(')').ok_or_else(invalid)?;
    if close < open || rest[close + 1..].trim() != "{" {
        return Err(invalid().into());
    }

    let name = rest[..open].trim();
    if !is_identifier(name) {
        return Err(invalid().into());
    }

    let inner = rest[open + 1..close].trim();
    let params: Vec<String> = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(|p| p.trim().to_string()).collect()
    };
    if !params.iter().all(|p| is_identifier(p)) {
        return Err(invalid().into());
    }

    Ok((name.to_string(), params))
}

impl Program {
    /// Hoists functions and builds the block table.
    ///
    /// Lines before `header_len` are flag headers and are ignored. Every line
    /// whose code ends with `{` opens a block and every line whose code starts
    /// with `}` closes the innermost open block. A line such as `} else {`
    /// does both. A top level block opened by a `func` header defines a
    /// function once it closes.
    ///
    /// # Errors
    /// - `UnopenedCurlyBracket` for a `}` line with no open block.
    /// - `UnmatchedCurlyBracket` for a block that is never closed.
    /// - `InvalidFunctionDefinition` for a malformed or nested `func` header.
    /// - `FunctionAlreadyDefined` when two functions share a name.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{program::Program, source::break_lines};
    ///
    /// let source = "func add(a, b) {\n\treturn a + b\n}\nprint(add(1, 2))";
    /// let program = Program::build(break_lines(source), 0).unwrap();
    ///
    /// let add = &program.functions["add"];
    /// assert_eq!(add.params, vec!["a", "b"]);
    /// assert_eq!((add.header, add.end), (0, 2));
    /// assert!(program.function_lines.contains(&1));
    /// assert!(!program.function_lines.contains(&3));
    /// ```
    pub fn build(lines: Vec<SourceLine>, header_len: usize) -> EvalResult<Self> {
        let mut program = Self { lines,
                                 header_len,
                                 ..Self::default() };

        let mut open_blocks: Vec<usize> = Vec::new();
        let mut pending: Option<(String, Vec<String>, usize)> = None;

        for index in header_len..program.lines.len() {
            let number = program.lines[index].number;
            let code = code_part(&program.lines[index].text);

            if code.starts_with("func ") {
                if !open_blocks.is_empty() {
                    return Err(SyntaxError::InvalidFunctionDefinition { line: number }.into());
                }
                let (name, params) = parse_header(code, number)?;
                if program.functions.contains_key(&name) {
                    return Err(RuntimeError::FunctionAlreadyDefined { name, line: number });
                }
                pending = Some((name, params, index));
            }

            if code.starts_with('}') {
                let opened = open_blocks.pop()
                                        .ok_or(SyntaxError::UnopenedCurlyBracket { line: number })?;
                program.block_ends.insert(opened, index);

                if open_blocks.is_empty() && !code.ends_with('{') {
                    if let Some((name, params, header)) = pending.take() {
                        debug!(name = %name, ?params, header, end = index, "hoisted function");
                        program.function_lines.extend(header..=index);
                        program.functions.insert(name.clone(),
                                                 FunctionDef { name,
                                                               params,
                                                               header,
                                                               end: index });
                    }
                }
            }

            if code.ends_with('{') {
                open_blocks.push(index);
            }
        }

        if let Some(&unclosed) = open_blocks.last() {
            let line = program.lines[unclosed].number;
            return Err(SyntaxError::UnmatchedCurlyBracket { line }.into());
        }

        Ok(program)
    }

    /// Returns the index of the line closing the block opened at `start`.
    #[must_use]
    pub fn block_end(&self, start: usize) -> Option<usize> {
        self.block_ends.get(&start).copied()
    }

    /// Returns the comment-free code of the line at `index`.
    #[must_use]
    pub fn code(&self, index: usize) -> &str {
        self.lines.get(index).map_or("", |l| code_part(&l.text))
    }

    /// Returns the physical line number of the line at `index`.
    #[must_use]
    pub fn number(&self, index: usize) -> usize {
        self.lines
            .get(index)
            .or_else(|| self.lines.last())
            .map_or(1, |l| l.number)
    }

    /// Returns the number of logical lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the program has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::source::break_lines;

    fn build(source: &str) -> EvalResult<Program> {
        Program::build(break_lines(source), 0)
    }

    #[test]
    fn nested_blocks_do_not_end_a_function() {
        let program = build("func f(x) {\n\tif (x) {\n\t\tprint(x)\n\t}\n\treturn x\n}\nf(1)")
                      .unwrap();
        let f = &program.functions["f"];
        assert_eq!((f.header, f.end), (0, 5));
        assert_eq!(program.block_end(1), Some(3));
        assert!(!program.function_lines.contains(&6));
    }

    #[test]
    fn empty_parameter_lists_have_no_parameters() {
        let program = build("func f() {\n}").unwrap();
        assert!(program.functions["f"].params.is_empty());
    }

    #[test]
    fn chains_link_each_branch_to_the_next() {
        let program = build("if (a) {\n\tx\n} elif (b) {\n\ty\n} else {\n\tz\n}").unwrap();
        assert_eq!(program.block_end(0), Some(2));
        assert_eq!(program.block_end(2), Some(4));
        assert_eq!(program.block_end(4), Some(6));
    }

    #[test]
    fn duplicate_functions_are_rejected() {
        let err = build("func f() {\n}\nfunc f() {\n}").unwrap_err();
        assert_eq!(err,
                   RuntimeError::FunctionAlreadyDefined { name: "f".into(),
                                                          line: 3, });
    }

    #[test]
    fn unbalanced_braces_are_rejected() {
        assert_eq!(build("if (a) {\nx").unwrap_err(),
                   RuntimeError::from(SyntaxError::UnmatchedCurlyBracket { line: 1 }));
        assert_eq!(build("x\n}").unwrap_err(),
                   RuntimeError::from(SyntaxError::UnopenedCurlyBracket { line: 2 }));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for source in ["func (a) {\n}", "func f(a b) {\n}", "func f(a)\n"] {
            assert_eq!(build(source).unwrap_err(),
                       RuntimeError::from(SyntaxError::InvalidFunctionDefinition { line: 1 }),
                       "{source:?}");
        }
    }

    #[test]
    fn comments_after_braces_are_ignored() {
        let program = build("while (x) { // spin\n\tx = 0\n} // done").unwrap();
        assert_eq!(program.block_end(0), Some(2));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("snake_case2"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("_x"));
    }
}
