use std::collections::BTreeMap;

use crate::{
    error::{RuntimeError, SyntaxError},
    interpreter::{
        evaluator::core::{find_close, split_top_level, Context, EvalResult},
        token::{AssignmentOp, Symbol, Token},
        value::{core::Value, dict_key::DictKey},
    },
    util::num::resolve_index,
};

/// Returns the position of the first `:` not nested in any bracket.
fn top_level_colon(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0_i32;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
            Token::Symbol(Symbol::Colon) if depth == 0 => return Some(index),
            _ => {},
        }
    }
    None
}

impl Context {
    /// Evaluates comma separated expressions in order.
    ///
    /// Used for call arguments and list literals. A single trailing comma is
    /// allowed; any other empty element is a `MissingValue` error.
    pub fn eval_arguments(&mut self, tokens: &[Token], line: usize) -> EvalResult<Vec<Value>> {
        let mut parts = split_top_level(tokens);
        if parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }

        parts.into_iter()
             .map(|part| self.eval_value(part.to_vec(), line))
             .collect()
    }

    /// Reduces the `[` at `i`.
    ///
    /// After an operand it is a subscript: `x[i]` reads an element, and
    /// `x[i] = v` (or a compound form) writes one. Anywhere else it opens a
    /// list literal.
    pub(crate) fn reduce_bracket(&mut self,
                                 tokens: &mut Vec<Token>,
                                 i: usize,
                                 line: usize)
                                 -> EvalResult<()> {
        let close = find_close(tokens, i).ok_or(SyntaxError::UnmatchedSquareBracket { line })?;

        if i == 0 || !tokens[i - 1].is_operand() {
            let items = self.eval_arguments(&tokens[i + 1..close], line)?;
            tokens.splice(i..=close, [Token::Value(Value::from(items))]);
            return Ok(());
        }

        let container = self.operand(&tokens[i - 1], line)?;
        let index = self.eval_value(tokens[i + 1..close].to_vec(), line)?;

        if let Some(Token::Assignment(op)) = tokens.get(close + 1) {
            let op = *op;
            let rhs = tokens.split_off(close + 2);
            let stored = self.assign_index(&container, &index, op, rhs, line)?;
            tokens.truncate(i - 1);
            tokens.push(Token::Value(stored));
            return Ok(());
        }

        let element = container.get_index(&index, line)?;
        tokens.splice(i - 1..=close, [Token::Value(element)]);
        Ok(())
    }

    /// Writes `container[index]`, combining with the current element for
    /// compound operators.
    ///
    /// # Returns
    /// The stored value.
    fn assign_index(&mut self,
                    container: &Value,
                    index: &Value,
                    op: AssignmentOp,
                    rhs: Vec<Token>,
                    line: usize)
                    -> EvalResult<Value> {
        let mut value = self.eval_value(rhs, line)?;
        if let Some(arithmetic) = op.arithmetic() {
            let current = container.get_index(index, line)?;
            value = Self::eval_arithmetic(arithmetic, &current, &value, line)?;
        }

        match container {
            Value::List(list) => {
                let mut items = list.borrow_mut();
                let position = resolve_index(index.as_integer(line)?, items.len(), line)?;
                items[position] = value.clone();
            },
            Value::Dict(dict) => {
                let key = DictKey::from_value(index, line)?;
                dict.borrow_mut().insert(key, value.clone());
            },
            other => {
                return Err(RuntimeError::InvalidSubscript { type_name: other.type_name(),
                                                            line })
            },
        }

        Ok(value)
    }

    /// Reduces the dict literal opened by the `{` at `i`.
    ///
    /// Each comma separated entry must have a top level `:` between its key
    /// and its value. Later entries overwrite earlier ones with the same key.
    pub(crate) fn reduce_dict(&mut self,
                              tokens: &mut Vec<Token>,
                              i: usize,
                              line: usize)
                              -> EvalResult<()> {
        let close = find_close(tokens, i).ok_or(SyntaxError::UnmatchedCurlyBracket { line })?;
        let inner = tokens[i + 1..close].to_vec();

        let mut entries = BTreeMap::new();
        let mut parts = split_top_level(&inner);
        if parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }

        for part in parts {
            let colon = top_level_colon(part).ok_or(SyntaxError::MissingColon { line })?;
            let key = self.eval_value(part[..colon].to_vec(), line)?;
            let value = self.eval_value(part[colon + 1..].to_vec(), line)?;
            entries.insert(DictKey::from_value(&key, line)?, value);
        }

        tokens.splice(i..=close, [Token::Value(Value::from(entries))]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{
        config::Config,
        interpreter::{
            evaluator::core::Io, lexer::tokenize, program::Program, source::break_lines,
        },
    };

    fn run(lines: &[&str]) -> EvalResult<Option<Value>> {
        let program = Program::build(break_lines(""), 0)?;
        let mut context = Context::new(program, Config::default(), Io::new(io::sink(), io::empty()));
        let mut last = None;
        for (number, line) in lines.iter().enumerate() {
            let tokens = tokenize(line, number + 1, |_| false)?;
            last = context.eval_optional(tokens, number + 1)?;
        }
        Ok(last)
    }

    #[test]
    fn nested_lists() {
        let value = run(&["[1, 2, [3, 4]]"]).unwrap().unwrap();
        assert_eq!(value.to_string(), "[1, 2, [3, 4]]");
        assert_eq!(run(&["[]"]).unwrap().unwrap().to_string(), "[]");
        assert_eq!(run(&["[1, 2,]"]).unwrap().unwrap().to_string(), "[1, 2]");
    }

    #[test]
    fn dict_literals() {
        let value = run(&["{\"b\": 2, \"a\": [1], 3: {}}"]).unwrap().unwrap();
        assert_eq!(value.to_string(), "{3: {}, 'a': [1], 'b': 2}");
        assert_eq!(run(&["{1 2}"]).unwrap_err(),
                   RuntimeError::from(SyntaxError::MissingColon { line: 1 }));
        assert!(matches!(run(&["{[1]: 2}"]), Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn subscripts_read_and_write_in_place() {
        let value = run(&["x = [1, [2, 3]]", "y = x", "x[1][0] = 9", "y[1][0] + y[-2]"]).unwrap();
        assert_eq!(value, Some(Value::Integer(10)));

        let value = run(&["d = {\"n\": 1}", "d[\"n\"] += 4", "d[\"m\"] = d[\"n\"]", "d"]).unwrap();
        assert_eq!(value.unwrap().to_string(), "{'m': 5, 'n': 5}");
    }

    #[test]
    fn strings_are_read_only() {
        assert_eq!(run(&["s = \"abc\"", "s[1]"]).unwrap(), Some(Value::from("b")));
        assert_eq!(run(&["s = \"abc\"", "s[0] = \"z\""]).unwrap_err(),
                   RuntimeError::InvalidSubscript { type_name: "str",
                                                    line:      2, });
    }

    #[test]
    fn bad_subscripts() {
        assert!(matches!(run(&["[1][5]"]),
                         Err(RuntimeError::IndexOutOfBounds { index: 5, len: 1, line: 1 })));
        assert_eq!(run(&["[1, 2"]).unwrap_err(),
                   RuntimeError::from(SyntaxError::UnmatchedSquareBracket { line: 1 }));
    }
}
