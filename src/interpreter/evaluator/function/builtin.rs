use std::{
    hash::{Hash, Hasher},
    io::{BufRead, Write},
};

use rustc_hash::FxHasher;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Io},
        value::{core::Value, dict_key::DictKey},
    },
    util::num::usize_to_i64_checked,
};

/// Converts a stream failure into a script error on `line`.
fn io_error(error: &std::io::Error, line: usize) -> RuntimeError {
    RuntimeError::Io { details: error.to_string(),
                       line }
}

/// Writes the arguments separated by single spaces, then a newline.
///
/// # Example
/// ```
/// use std::io;
///
/// use slowpp::interpreter::{
///     evaluator::{core::Io, function::builtin::print},
///     value::core::Value,
/// };
///
/// let mut io = Io::new(Vec::new(), io::empty());
/// let result = print(&mut io, &[Value::from("x ="), Value::Integer(3)], 1).unwrap();
/// assert_eq!(result, None);
/// ```
pub fn print(io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let text: Vec<String> = args.iter().map(ToString::to_string).collect();
    writeln!(io.output, "{}", text.join(" ")).map_err(|e| io_error(&e, line))?;
    Ok(None)
}

/// Writes the optional prompt and reads one line of input without its line
/// terminator. At end of input the result is an empty string.
pub fn input(io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    if let Some(prompt) = args.first() {
        write!(io.output, "{prompt}").map_err(|e| io_error(&e, line))?;
        io.output.flush().map_err(|e| io_error(&e, line))?;
    }

    let mut buffer = String::new();
    io.input.read_line(&mut buffer).map_err(|e| io_error(&e, line))?;

    let text = buffer.strip_suffix('\n').unwrap_or(&buffer);
    let text = text.strip_suffix('\r').unwrap_or(text);
    Ok(Some(Value::from(text)))
}

/// Returns a deterministic hash of a hashable value.
///
/// # Errors
/// `TypeError` for lists and dicts.
pub fn hash(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let key = DictKey::from_value(&args[0], line)?;
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);

    Ok(Some(Value::Integer(i64::from_ne_bytes(hasher.finish().to_ne_bytes()))))
}

/// Returns the length of a string, list or dict.
pub fn len(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let len = args[0].len(line)?;
    Ok(Some(Value::Integer(usize_to_i64_checked(len, line)?)))
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io, rc::Rc};

    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn print_joins_with_spaces() {
        let out = Shared::default();
        let mut io = Io::new(out.clone(), io::empty());
        let list = Value::from(vec![Value::from("a"), Value::Real(1.0)]);
        print(&mut io, &[Value::from("v:"), list, Value::None], 1).unwrap();
        print(&mut io, &[], 2).unwrap();
        assert_eq!(String::from_utf8(out.0.borrow().clone()).unwrap(), "v: ['a', 1.0] None\n\n");
    }

    #[test]
    fn input_prompts_and_strips_the_terminator() {
        let out = Shared::default();
        let mut io = Io::new(out.clone(), io::Cursor::new("Ada\r\nrest\n"));
        let name = input(&mut io, &[Value::from("name? ")], 1).unwrap();
        assert_eq!(name, Some(Value::from("Ada")));
        assert_eq!(input(&mut io, &[], 1).unwrap(), Some(Value::from("rest")));
        assert_eq!(input(&mut io, &[], 1).unwrap(), Some(Value::from("")));
        assert_eq!(String::from_utf8(out.0.borrow().clone()).unwrap(), "name? ");
    }

    #[test]
    fn hashing_is_deterministic() {
        let mut io = Io::new(io::sink(), io::empty());
        let a = hash(&mut io, &[Value::from("key")], 1).unwrap();
        let b = hash(&mut io, &[Value::from("key")], 1).unwrap();
        assert_eq!(a, b);
        assert!(matches!(hash(&mut io, &[Value::from(vec![])], 1),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn lengths() {
        let mut io = Io::new(io::sink(), io::empty());
        assert_eq!(len(&mut io, &[Value::from("abc")], 1).unwrap(), Some(Value::Integer(3)));
        assert_eq!(len(&mut io, &[Value::Integer(1)], 4).unwrap_err(),
                   RuntimeError::InvalidLength { type_name: "int",
                                                 line:      4, });
    }
}
