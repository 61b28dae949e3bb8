use tracing::debug;

use crate::{
    error::SyntaxError,
    interpreter::{
        evaluator::core::{find_close, split_top_level, Context, EvalResult, Signal},
        token::{Keyword, Token},
        value::core::Value,
    },
};

impl Context {
    /// Runs a `for` loop whose header is the line at `index`.
    ///
    /// The header has the shape `for name(start, end, step) {`. The three
    /// bounds are evaluated once, must be integers, and describe the half-open
    /// range `[start, end)` walked by `step`, which may be negative. On each
    /// iteration the loop variable is bound in the innermost frame (or the
    /// globals at top level) and the body runs. `break` leaves the loop,
    /// `continue` starts the next iteration and `return` propagates.
    ///
    /// # Parameters
    /// - `index`: Index of the header line.
    /// - `tokens`: The tokens of the header line.
    ///
    /// # Returns
    /// `Signal::Next` pointing past the loop's closing line, or the `return`
    /// raised by the body.
    ///
    /// # Errors
    /// `InvalidForLoop` for a malformed header, non-integer bounds or a zero
    /// step, and any error raised by the bounds or the body.
    pub(crate) fn run_for(&mut self, index: usize, tokens: &[Token]) -> EvalResult<Signal> {
        let line = self.program.number(index);
        let invalid = || SyntaxError::InvalidForLoop { line };

        let [Token::Keyword(Keyword::For), Token::Reference(var), Token::LParen, inner @ .., Token::RParen, Token::LBrace] =
            tokens
        else {
            return Err(invalid().into());
        };
        if find_close(tokens, 2) != Some(tokens.len() - 2) {
            return Err(invalid().into());
        }

        let parts = split_top_level(inner);
        let [start, end, step] = parts.as_slice() else {
            return Err(invalid().into());
        };

        let mut bounds = [0_i64; 3];
        for (slot, part) in bounds.iter_mut().zip([start, end, step]) {
            match self.eval_optional(part.to_vec(), line)? {
                Some(Value::Integer(n)) => *slot = n,
                _ => return Err(invalid().into()),
            }
        }
        let [start, end, step] = bounds;
        if step == 0 {
            return Err(invalid().into());
        }

        let close = self.block_end_or_err(index)?;
        debug!(var = %var, start, end, step, line, "for loop");

        let mut current = start;
        while (step > 0 && current < end) || (step < 0 && current > end) {
            self.bind_local(var, Value::Integer(current));

            match self.run_block(index + 1, close)? {
                Signal::Next(_) | Signal::Continue(_) => {},
                Signal::Break(_) => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
            }

            match current.checked_add(step) {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(Signal::Next(close + 1))
    }

    /// Runs a `while` loop whose header is the line at `index`.
    ///
    /// The condition is tokenized again from the source line before every
    /// iteration, so it always sees the current callable names and values.
    pub(crate) fn run_while(&mut self, index: usize) -> EvalResult<Signal> {
        let line = self.program.number(index);
        let close = self.block_end_or_err(index)?;
        debug!(line, "while loop");

        loop {
            self.cursor = index;
            let tokens = self.tokenize_line(index)?;
            let [Token::Keyword(Keyword::While), condition @ .., Token::LBrace] = tokens.as_slice() else {
                return Err(SyntaxError::UnmatchedCurlyBracket { line }.into());
            };

            let holds = self.eval_optional(condition.to_vec(), line)?.is_some_and(|v| v.is_truthy());
            if !holds {
                break;
            }

            match self.run_block(index + 1, close)? {
                Signal::Next(_) | Signal::Continue(_) => {},
                Signal::Break(_) => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
            }
        }

        Ok(Signal::Next(close + 1))
    }
}
