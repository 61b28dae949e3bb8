use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during execution.
pub enum RuntimeError {
    /// A syntax error discovered while tokenizing or laying out a line.
    Syntax(SyntaxError),
    /// Tried to use an undefined variable.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Called a name that is neither a builtin, a user function nor an alias.
    UndefinedFunction {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Attempted to define a function that already exists.
    FunctionAlreadyDefined {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The left-hand side of an assignment was not a variable name.
    InvalidAssignment {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to subscript a value that is not a string, list or dict.
    InvalidSubscript {
        /// The type name of the subscripted value.
        type_name: &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// Tried to take the length of a value that is not a string, list or dict.
    InvalidLength {
        /// The type name of the value.
        type_name: &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Attempted division or modulo by zero.
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Integer arithmetic overflowed.
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to access a string or list element outside its bounds.
    IndexOutOfBounds {
        /// The requested index.
        index: i64,
        /// The length of the indexed value.
        len:   usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A dict lookup used a key the dict does not contain.
    KeyNotFound {
        /// The rendered key.
        key:  String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A list search did not find the requested value.
    ValueNotFound {
        /// The rendered value.
        value: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The wrong number of arguments was supplied to a function.
    ArgumentCountMismatch {
        /// The name of the function.
        name:     String,
        /// The number of arguments the function accepts.
        expected: String,
        /// The number of arguments that were supplied.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// An expression that must produce a value produced none.
    MissingValue {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An operator was left without one of its operands.
    MissingOperand {
        /// The operator text.
        operator: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A keyword was used where it has no statement form.
    UnexpectedKeyword {
        /// The keyword text.
        keyword: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// `break` or `continue` outside of a loop body.
    LoopControlOutsideLoop {
        /// The offending statement.
        statement: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A chain of aliases leads back to itself.
    AliasCycle {
        /// The alias that started the lookup.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// User function calls nested deeper than the interpreter allows.
    RecursionLimit {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `#flag` header line was malformed.
    InvalidFlag {
        /// The header line.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Reading input or writing output failed.
    Io {
        /// Details reported by the operating system.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl RuntimeError {
    /// Returns the line the error occurred on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Syntax(e) => e.line(),
            Self::UndefinedVariable { line, .. }
            | Self::UndefinedFunction { line, .. }
            | Self::FunctionAlreadyDefined { line, .. }
            | Self::InvalidAssignment { line }
            | Self::InvalidSubscript { line, .. }
            | Self::InvalidLength { line, .. }
            | Self::TypeError { line, .. }
            | Self::DivisionByZero { line }
            | Self::Overflow { line }
            | Self::IndexOutOfBounds { line, .. }
            | Self::KeyNotFound { line, .. }
            | Self::ValueNotFound { line, .. }
            | Self::ArgumentCountMismatch { line, .. }
            | Self::MissingValue { line }
            | Self::MissingOperand { line, .. }
            | Self::UnexpectedKeyword { line, .. }
            | Self::LoopControlOutsideLoop { line, .. }
            | Self::AliasCycle { line, .. }
            | Self::RecursionLimit { line }
            | Self::InvalidFlag { line, .. }
            | Self::Io { line, .. } => *line,
        }
    }
}

impl From<SyntaxError> for RuntimeError {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{e}"),
            Self::UndefinedVariable { name, line } => {
                write!(f, "Error on line {line}: Undefined variable name '{name}'.")
            },
            Self::UndefinedFunction { name, line } => {
                write!(f, "Error on line {line}: Function '{name}' is not defined.")
            },
            Self::FunctionAlreadyDefined { name, line } => write!(f,
                                                                  "Error on line {line}: Function '{name}' is already defined."),
            Self::InvalidAssignment { line } => write!(f,
                                                       "Error on line {line}: Invalid assignment, only variable names can be assigned to."),
            Self::InvalidSubscript { type_name, line } => {
                write!(f, "Error on line {line}: Invalid subscript operation on {type_name}.")
            },
            Self::InvalidLength { type_name, line } => {
                write!(f, "Error on line {line}: Invalid length operation on {type_name}.")
            },
            Self::TypeError { details, line } => {
                write!(f, "Error on line {line}: Type error: {details}.")
            },
            Self::DivisionByZero { line } => write!(f, "Error on line {line}: Division by zero."),
            Self::Overflow { line } => write!(f,
                                              "Error on line {line}: Integer overflow while trying to compute result."),
            Self::IndexOutOfBounds { index, len, line } => write!(f,
                                                                  "Error on line {line}: Index {index} is out of bounds for length {len}."),
            Self::KeyNotFound { key, line } => {
                write!(f, "Error on line {line}: Key {key} not found.")
            },
            Self::ValueNotFound { value, line } => {
                write!(f, "Error on line {line}: Value {value} is not in the list.")
            },
            Self::ArgumentCountMismatch { name,
                                          expected,
                                          found,
                                          line, } => write!(f,
                                                            "Error on line {line}: Function '{name}' takes {expected} argument(s) but {found} were given."),
            Self::MissingValue { line } => write!(f, "Error on line {line}: Value missing."),
            Self::MissingOperand { operator, line } => {
                write!(f, "Error on line {line}: Operator '{operator}' is missing an operand.")
            },
            Self::UnexpectedKeyword { keyword, line } => {
                write!(f, "Error on line {line}: Unexpected keyword '{keyword}'.")
            },
            Self::LoopControlOutsideLoop { statement, line } => {
                write!(f, "Error on line {line}: '{statement}' outside of a loop.")
            },
            Self::AliasCycle { name, line } => {
                write!(f, "Error on line {line}: Alias '{name}' refers back to itself.")
            },
            Self::RecursionLimit { line } => {
                write!(f, "Error on line {line}: Maximum recursion depth exceeded.")
            },
            Self::InvalidFlag { details, line } => {
                write!(f, "Error on line {line}: Invalid flag: {details}.")
            },
            Self::Io { details, line } => write!(f, "Error on line {line}: I/O error: {details}."),
        }
    }
}

impl std::error::Error for RuntimeError {}
