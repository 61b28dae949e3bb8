use std::ops::Range;

use logos::Logos;

use crate::{
    error::SyntaxError,
    interpreter::token::{
        ArithmeticOp, AssignmentOp, ComparisonOp, Keyword, LogicalOp, Symbol, Token,
    },
};

/// Errors produced while scanning raw tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LexError {
    /// A character no token starts with. Becomes [`Token::Invalid`].
    #[default]
    InvalidCharacter,
    /// A quote was opened but never closed.
    UnclosedString,
}

/// Raw token from logos, before identifiers are classified into function
/// names, keywords and references.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    /// `// comments` end the line.
    #[regex(r"//[^\n]*")]
    Comment,
    /// Digit-leading runs, such as `42` or `3.14`.
    #[regex(r"[0-9][0-9.]*", |lex| lex.slice().to_string())]
    Number(String),
    /// Quoted strings, with backslash escapes already applied.
    #[token("\"", lex_string)]
    #[token("'", lex_string)]
    Str(String),
    /// Identifier-shaped words.
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Word(String),
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `=`
    #[token("=")]
    Equals,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `!`
    #[token("!")]
    Bang,
    /// `^`
    #[token("^")]
    Caret,
    /// `%`
    #[token("%")]
    Percent,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `|`
    #[token("|")]
    Pipe,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
}

/// Scans the body of a string literal after its opening quote.
///
/// Characters are taken verbatim until the matching unescaped quote. A
/// backslash makes the following character literal; there are no named escape
/// sequences.
fn lex_string(lex: &mut logos::Lexer<RawToken>) -> Result<String, LexError> {
    let quote = lex.slice().chars().next().unwrap_or('"');
    let mut content = String::new();
    let mut escaped = false;

    for (offset, c) in lex.remainder().char_indices() {
        if escaped {
            content.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            lex.bump(offset + c.len_utf8());
            return Ok(content);
        } else {
            content.push(c);
        }
    }

    lex.bump(lex.remainder().len());
    Err(LexError::UnclosedString)
}

/// Returns `true` if a `-` after this token must be subtraction rather than the
/// sign of a number.
const fn ends_operand(token: &Token) -> bool {
    token.is_operand() || matches!(token, Token::RParen | Token::RBracket | Token::RBrace)
}

/// Converts one logical source line into a flat sequence of tokens.
///
/// Words are classified against `is_callable` first (builtins, hoisted user
/// functions and aliases), then against the keyword list; anything else is a
/// reference. A `//` ends the line. A `-` written directly before a digit is
/// folded into the number when it cannot be subtraction, so `x = -3` and
/// `f(1, -2)` carry negative literals while `x -3` still subtracts.
///
/// # Parameters
/// - `line`: The logical line, possibly containing newlines inside strings.
/// - `line_number`: Line number for error reporting.
/// - `is_callable`: Tells whether a word names a callable.
///
/// # Errors
/// Returns `SyntaxError::UnclosedString` if a string literal is not closed.
///
/// # Example
/// ```
/// use slowpp::interpreter::{
///     lexer::tokenize,
///     token::{AssignmentOp, Token},
/// };
///
/// let tokens = tokenize("x = -3 // note", 1, |_| false).unwrap();
/// assert_eq!(tokens,
///            vec![Token::Reference("x".into()),
///                 Token::Assignment(AssignmentOp::Assign),
///                 Token::Number("-3".into())]);
/// ```
pub fn tokenize(line: &str,
                line_number: usize,
                is_callable: impl Fn(&str) -> bool)
                -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = RawToken::lexer(line);
    let mut tokens: Vec<Token> = Vec::new();
    let mut minus_span: Option<Range<usize>> = None;

    while let Some(raw) = lexer.next() {
        let span = lexer.span();

        let token = match raw {
            Ok(RawToken::Comment) => break,
            Ok(RawToken::Number(text)) => {
                let signed = minus_span.as_ref().is_some_and(|minus| minus.end == span.start)
                             && matches!(tokens.last(), Some(Token::Arithmetic(ArithmeticOp::Sub)))
                             && !tokens.iter()
                                       .rev()
                                       .nth(1)
                                       .is_some_and(ends_operand);
                if signed {
                    tokens.pop();
                    Token::Number(format!("-{text}"))
                } else {
                    Token::Number(text)
                }
            },
            Ok(RawToken::Str(text)) => Token::Str(text),
            Ok(RawToken::Word(word)) => classify_word(word, &is_callable),
            Ok(raw) => punctuation(raw).unwrap_or_else(|| Token::Invalid(lexer.slice().to_string())),
            Err(LexError::UnclosedString) => {
                return Err(SyntaxError::UnclosedString { line: line_number });
            },
            Err(LexError::InvalidCharacter) => Token::Invalid(lexer.slice().to_string()),
        };

        minus_span = matches!(token, Token::Arithmetic(ArithmeticOp::Sub)).then_some(span);
        tokens.push(token);
    }

    Ok(tokens)
}

/// Classifies an identifier-shaped word.
fn classify_word(word: String, is_callable: &impl Fn(&str) -> bool) -> Token {
    if is_callable(&word) {
        Token::Function(word)
    } else if let Some(keyword) = Keyword::from_word(&word) {
        Token::Keyword(keyword)
    } else {
        Token::Reference(word)
    }
}

/// Maps fixed-spelling raw tokens to their classified form. Tokens with a
/// payload have no fixed spelling and give `None`.
fn punctuation(raw: RawToken) -> Option<Token> {
    let token = match raw {
        RawToken::Plus => Token::Arithmetic(ArithmeticOp::Add),
        RawToken::Minus => Token::Arithmetic(ArithmeticOp::Sub),
        RawToken::Star => Token::Arithmetic(ArithmeticOp::Mul),
        RawToken::Slash => Token::Arithmetic(ArithmeticOp::Div),
        RawToken::PlusAssign => Token::Assignment(AssignmentOp::AddAssign),
        RawToken::MinusAssign => Token::Assignment(AssignmentOp::SubAssign),
        RawToken::StarAssign => Token::Assignment(AssignmentOp::MulAssign),
        RawToken::SlashAssign => Token::Assignment(AssignmentOp::DivAssign),
        RawToken::Equals => Token::Assignment(AssignmentOp::Assign),
        RawToken::EqualEqual => Token::Comparison(ComparisonOp::Equal),
        RawToken::Less => Token::Comparison(ComparisonOp::Less),
        RawToken::LessEqual => Token::Comparison(ComparisonOp::LessEqual),
        RawToken::Greater => Token::Comparison(ComparisonOp::Greater),
        RawToken::GreaterEqual => Token::Comparison(ComparisonOp::GreaterEqual),
        RawToken::Bang => Token::Logical(LogicalOp::Not),
        RawToken::Caret => Token::Logical(LogicalOp::Xor),
        RawToken::Percent => Token::Logical(LogicalOp::Mod),
        RawToken::Ampersand => Token::Logical(LogicalOp::And),
        RawToken::Pipe => Token::Logical(LogicalOp::Or),
        RawToken::LParen => Token::LParen,
        RawToken::RParen => Token::RParen,
        RawToken::LBracket => Token::LBracket,
        RawToken::RBracket => Token::RBracket,
        RawToken::LBrace => Token::LBrace,
        RawToken::RBrace => Token::RBrace,
        RawToken::Comma => Token::Comma,
        RawToken::Colon => Token::Symbol(Symbol::Colon),
        RawToken::Dot => Token::Symbol(Symbol::Dot),
        RawToken::Comment | RawToken::Number(_) | RawToken::Str(_) | RawToken::Word(_) => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::core::Value;

    fn lex(line: &str) -> Vec<Token> {
        tokenize(line, 1, |name| name == "print").unwrap()
    }

    #[test]
    fn integer_literals_round_trip() {
        for n in [0_i64, 7, 42, 1_000_000, -5, i64::MAX] {
            let tokens = lex(&n.to_string());
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].literal(1).unwrap(), Some(Value::Integer(n)));
        }
    }

    #[test]
    fn comments_truncate_the_line() {
        assert!(lex("// nothing here").is_empty());
        assert_eq!(lex("x // y z"), vec![Token::Reference("x".into())]);
    }

    #[test]
    fn strings_keep_escaped_quotes() {
        assert_eq!(lex(r#""say \"hi\"""#), vec![Token::Str("say \"hi\"".into())]);
        assert_eq!(lex("'it''s'"), vec![Token::Str("it".into()), Token::Str("s".into())]);
        assert_eq!(lex(r#""a\\b""#), vec![Token::Str("a\\b".into())]);
    }

    #[test]
    fn string_literals_are_string_tokens() {
        assert_eq!(lex("print(\"hi\", 'x')"),
                   vec![Token::Function("print".into()),
                        Token::LParen,
                        Token::Str("hi".into()),
                        Token::Comma,
                        Token::Str("x".into()),
                        Token::RParen]);
        assert_eq!(lex("{\"k\": 1}")[1], Token::Str("k".into()));
    }

    #[test]
    fn strings_may_contain_newlines() {
        assert_eq!(lex("\"one\ntwo\""), vec![Token::Str("one\ntwo".into())]);
    }

    #[test]
    fn unclosed_strings_are_fatal() {
        assert_eq!(tokenize("x = \"oops", 9, |_| false),
                   Err(SyntaxError::UnclosedString { line: 9 }));
    }

    #[test]
    fn words_are_classified() {
        assert_eq!(lex("print if total"),
                   vec![Token::Function("print".into()),
                        Token::Keyword(Keyword::If),
                        Token::Reference("total".into())]);
    }

    #[test]
    fn operators_widen_with_equals() {
        assert_eq!(lex("+= == <= >= < = /"),
                   vec![Token::Assignment(AssignmentOp::AddAssign),
                        Token::Comparison(ComparisonOp::Equal),
                        Token::Comparison(ComparisonOp::LessEqual),
                        Token::Comparison(ComparisonOp::GreaterEqual),
                        Token::Comparison(ComparisonOp::Less),
                        Token::Assignment(AssignmentOp::Assign),
                        Token::Arithmetic(ArithmeticOp::Div)]);
    }

    #[test]
    fn minus_is_a_sign_only_without_a_left_operand() {
        assert_eq!(lex("x -3"),
                   vec![Token::Reference("x".into()),
                        Token::Arithmetic(ArithmeticOp::Sub),
                        Token::Number("3".into())]);
        assert_eq!(lex("(-3)"),
                   vec![Token::LParen, Token::Number("-3".into()), Token::RParen]);
        assert_eq!(lex("- 3"),
                   vec![Token::Arithmetic(ArithmeticOp::Sub), Token::Number("3".into())]);
    }

    #[test]
    fn unknown_characters_become_invalid_tokens() {
        assert_eq!(lex("x @"), vec![Token::Reference("x".into()), Token::Invalid("@".into())]);
    }
}
