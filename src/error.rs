/// Syntax errors.
///
/// Defines the errors raised while turning source text into tokens and blocks:
/// unclosed strings, unbalanced brackets, malformed `for` headers, dict pairs
/// without a `:` and malformed function headers.
pub mod syntax_error;
/// Runtime errors.
///
/// Contains all error types that can be raised while a script executes.
/// Runtime errors include undefined names, invalid assignments, type
/// mismatches, bad subscripts and failed builtin calls. Syntax errors found
/// mid-execution are wrapped so a single error type flows through the
/// evaluator.
pub mod runtime_error;

pub use runtime_error::RuntimeError;
pub use syntax_error::SyntaxError;

/// A fatal script failure together with the source text of the failing line.
///
/// This is what the public entry points return. The `Display` output names the
/// line number, the message and the offending source line, which is what the
/// command line front end prints before exiting.
#[derive(Debug)]
pub struct ScriptError {
    /// The underlying error.
    pub error: RuntimeError,
    /// The logical source line the error occurred on, if it could be located.
    pub text:  Option<String>,
}

impl ScriptError {
    /// Returns the 1-based line number of the failure.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.error.line()
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(text) = &self.text {
            write!(f, "\n    {}", text.trim())?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
