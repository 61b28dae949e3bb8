use tracing::{debug, trace};

use crate::{
    error::{RuntimeError, SyntaxError},
    interpreter::{
        evaluator::core::{Context, EvalResult, Outcome, Signal},
        token::{Keyword, Token},
    },
};

/// Returns `true` if `code` starts with the whole word `word`.
fn starts_with_word(code: &str, word: &str) -> bool {
    code.strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
}

impl Context {
    /// Executes the line at `index`.
    ///
    /// `break` and `continue` lines, and `if`, `for` and `while` headers are
    /// dispatched here; anything else is evaluated as an expression.
    ///
    /// # Returns
    /// The index of the next line to run, or the control transfer the line
    /// caused.
    pub fn exec_line(&mut self, index: usize) -> EvalResult<Signal> {
        self.cursor = index;
        let line = self.program.number(index);
        let code = self.program.code(index).to_string();
        trace!(line, code = %code, "exec");

        match code.as_str() {
            "" => return Ok(Signal::Next(index + 1)),
            "break" => return Ok(Signal::Break(line)),
            "continue" => return Ok(Signal::Continue(line)),
            _ => {},
        }

        if code.starts_with('}') {
            if self.program.block_end(index).is_some() {
                return Ok(Signal::Next(self.chain_end(index)? + 1));
            }
            return Ok(Signal::Next(index + 1));
        }

        let tokens = self.tokenize_line(index)?;
        match tokens.first() {
            Some(Token::Keyword(Keyword::If)) => self.run_if(index),
            Some(Token::Keyword(Keyword::Elif | Keyword::Else)) => {
                Ok(Signal::Next(self.chain_end(index)? + 1))
            },
            Some(Token::Keyword(Keyword::For)) => self.run_for(index, &tokens),
            Some(Token::Keyword(Keyword::While)) => self.run_while(index),
            _ => match self.eval_tokens(tokens, line)? {
                Outcome::Value(_) => Ok(Signal::Next(index + 1)),
                Outcome::Return(value) => Ok(Signal::Return(value)),
            },
        }
    }

    /// Runs the lines `start..end`.
    ///
    /// # Returns
    /// `Signal::Next(end)` when the lines ran to completion, otherwise the
    /// first `break`, `continue` or `return` they produced.
    pub fn run_block(&mut self, start: usize, end: usize) -> EvalResult<Signal> {
        let mut index = start;
        while index < end {
            match self.exec_line(index)? {
                Signal::Next(next) => index = next,
                other => return Ok(other),
            }
        }
        Ok(Signal::Next(end))
    }

    /// Runs the program from the first line after the flag header.
    ///
    /// Lines owned by function definitions are skipped. A top level `return`
    /// ends the run successfully.
    ///
    /// # Errors
    /// The first error raised by any line. `break` and `continue` outside of
    /// a loop are `LoopControlOutsideLoop`.
    pub fn run(&mut self) -> EvalResult<()> {
        let mut index = self.program.header_len;

        while index < self.program.len() {
            if self.program.function_lines.contains(&index) {
                index += 1;
                continue;
            }

            match self.exec_line(index)? {
                Signal::Next(next) => index = next,
                Signal::Return(_) => {
                    debug!(line = self.program.number(index), "top level return");
                    return Ok(());
                },
                Signal::Break(line) => {
                    return Err(RuntimeError::LoopControlOutsideLoop { statement: "break".to_string(),
                                                                      line })
                },
                Signal::Continue(line) => {
                    return Err(RuntimeError::LoopControlOutsideLoop { statement: "continue".to_string(),
                                                                      line })
                },
            }
        }

        Ok(())
    }

    /// Returns the line closing the block opened at `start`.
    pub(crate) fn block_end_or_err(&self, start: usize) -> EvalResult<usize> {
        self.program
            .block_end(start)
            .ok_or_else(|| SyntaxError::UnmatchedCurlyBracket { line: self.program.number(start) }.into())
    }

    /// Returns the line opening the `elif`/`else` branch that follows the
    /// block closed at `close`, if any. The branch either shares the closing
    /// line (`} else {`) or starts on the next line.
    fn branch_after(&self, close: usize) -> Option<usize> {
        let is_branch = |code: &str| starts_with_word(code, "elif") || starts_with_word(code, "else");

        let closing = self.program.code(close);
        if let Some(rest) = closing.strip_prefix('}') {
            if is_branch(rest.trim_start()) && self.program.block_end(close).is_some() {
                return Some(close);
            }
        }

        let next = close + 1;
        (next < self.program.len()
         && is_branch(self.program.code(next))
         && self.program.block_end(next).is_some()).then_some(next)
    }

    /// Returns the closing line of the last branch of the `if` chain whose
    /// branch opens at `start`.
    fn chain_end(&self, start: usize) -> EvalResult<usize> {
        let mut opener = start;
        loop {
            let close = self.block_end_or_err(opener)?;
            match self.branch_after(close) {
                Some(next) if next != opener => opener = next,
                _ => return Ok(close),
            }
        }
    }

    /// Returns the condition tokens of the branch opened at `index`, or
    /// `None` for an `else` branch.
    fn branch_condition(&self, index: usize) -> EvalResult<Option<Vec<Token>>> {
        let line = self.program.number(index);
        let mut tokens = self.tokenize_line(index)?;

        if tokens.first() == Some(&Token::RBrace) {
            tokens.remove(0);
        }
        if tokens.last() == Some(&Token::LBrace) {
            tokens.pop();
        }

        match tokens.first() {
            Some(Token::Keyword(Keyword::If | Keyword::Elif)) => Ok(Some(tokens.split_off(1))),
            Some(Token::Keyword(Keyword::Else)) => Ok(None),
            _ => Err(RuntimeError::MissingValue { line }),
        }
    }

    /// Runs an `if`/`elif`/`else` chain starting at `index`.
    ///
    /// Conditions are tested in order and the first true branch runs. When
    /// the branch completes, execution resumes after the whole chain.
    fn run_if(&mut self, index: usize) -> EvalResult<Signal> {
        let mut opener = index;

        loop {
            self.cursor = opener;
            let line = self.program.number(opener);
            let close = self.block_end_or_err(opener)?;

            let taken = match self.branch_condition(opener)? {
                Some(condition) => self.eval_optional(condition, line)?.is_some_and(|v| v.is_truthy()),
                None => true,
            };

            if taken {
                debug!(line, "branch taken");
                return match self.run_block(opener + 1, close)? {
                    Signal::Next(_) => Ok(Signal::Next(self.chain_end(opener)? + 1)),
                    other => Ok(other),
                };
            }

            match self.branch_after(close) {
                Some(next) if next != opener => opener = next,
                _ => return Ok(Signal::Next(close + 1)),
            }
        }
    }
}
