#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while lexing a line or laying out the
/// block structure of a program.
pub enum SyntaxError {
    /// A string literal was not closed before the end of the line.
    UnclosedString {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An opening parenthesis `(` has no matching `)`, or a `)` has no opener.
    UnmatchedParenthesis {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An opening square bracket `[` has no matching `]`.
    UnmatchedSquareBracket {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A closing square bracket `]` appeared without an opener.
    UnopenedSquareBracket {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An opening curly bracket `{` has no matching `}`.
    UnmatchedCurlyBracket {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A closing curly bracket `}` appeared without an opener.
    UnopenedCurlyBracket {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `for` header did not have the shape `for x(start, end, step) {`.
    InvalidForLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A dict literal pair was missing its `:` separator.
    MissingColon {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `func` header was malformed.
    InvalidFunctionDefinition {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A numeric literal could not be parsed, such as `1.2.3`.
    InvalidNumber {
        /// The literal text.
        literal: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl SyntaxError {
    /// Returns the line the error occurred on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnclosedString { line }
            | Self::UnmatchedParenthesis { line }
            | Self::UnmatchedSquareBracket { line }
            | Self::UnopenedSquareBracket { line }
            | Self::UnmatchedCurlyBracket { line }
            | Self::UnopenedCurlyBracket { line }
            | Self::InvalidForLoop { line }
            | Self::MissingColon { line }
            | Self::InvalidFunctionDefinition { line }
            | Self::InvalidNumber { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnclosedString { line } => write!(f, "Error on line {line}: Unclosed string."),
            Self::UnmatchedParenthesis { line } => {
                write!(f, "Error on line {line}: Unmatched parentheses.")
            },
            Self::UnmatchedSquareBracket { line } => {
                write!(f, "Error on line {line}: Unmatched square brackets.")
            },
            Self::UnopenedSquareBracket { line } => {
                write!(f, "Error on line {line}: Unopened square bracket.")
            },
            Self::UnmatchedCurlyBracket { line } => {
                write!(f, "Error on line {line}: Unmatched curly brackets.")
            },
            Self::UnopenedCurlyBracket { line } => {
                write!(f, "Error on line {line}: Unopened curly bracket.")
            },
            Self::InvalidForLoop { line } => write!(f,
                                                    "Error on line {line}: Invalid for loop parameters. Example: for i(0, 10, 1) {{"),
            Self::MissingColon { line } => write!(f,
                                                  "Error on line {line}: Dict entry is missing a ':' between key and value."),
            Self::InvalidFunctionDefinition { line } => write!(f,
                                                               "Error on line {line}: Invalid function definition. Example: func add(a, b) {{"),
            Self::InvalidNumber { literal, line } => {
                write!(f, "Error on line {line}: Invalid number literal '{literal}'.")
            },
        }
    }
}

impl std::error::Error for SyntaxError {}
