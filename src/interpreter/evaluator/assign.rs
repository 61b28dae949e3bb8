use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        token::{AssignmentOp, Keyword, Token},
    },
};

/// Returns the name carried by a reference or function token.
fn name_of(token: Option<&Token>) -> Option<&str> {
    match token {
        Some(Token::Reference(name) | Token::Function(name)) => Some(name),
        _ => None,
    }
}

impl Context {
    /// Reduces the assignment operator at `i`.
    ///
    /// The token left of the operator must be a variable name. Everything to
    /// the right is evaluated as the new value; compound operators first read
    /// the current value and combine it with the right-hand side. The name,
    /// the operator and the right-hand side collapse into the stored value,
    /// so assignments chain (`a = b = 1`) and can be used inside expressions.
    ///
    /// # Errors
    /// `InvalidAssignment` if the left-hand side is not a name, and any error
    /// raised while evaluating the right-hand side.
    pub(crate) fn reduce_assignment(&mut self,
                                    tokens: &mut Vec<Token>,
                                    i: usize,
                                    op: AssignmentOp,
                                    line: usize)
                                    -> EvalResult<()> {
        let Some(Token::Reference(name)) = i.checked_sub(1).and_then(|left| tokens.get(left)) else {
            return Err(RuntimeError::InvalidAssignment { line });
        };
        let name = name.clone();

        let current = match op.arithmetic() {
            Some(arithmetic) => Some((arithmetic, self.lookup(&name, line)?)),
            None => None,
        };

        let rhs = tokens.split_off(i + 1);
        let mut value = self.eval_value(rhs, line)?;
        if let Some((arithmetic, current)) = current {
            value = Self::eval_arithmetic(arithmetic, &current, &value, line)?;
        }

        self.assign(&name, value.clone());
        tokens.truncate(i - 1);
        tokens.push(Token::Value(value));
        Ok(())
    }

    /// Defines an alias from the `alias` keyword at `i`.
    ///
    /// Both `target alias name` and `alias name target` are accepted. The
    /// alias is resolved when it is called, so the target may itself be an
    /// alias. The statement produces no value.
    ///
    /// # Errors
    /// - `MissingOperand` if either side is not a name.
    /// - `AliasCycle` if a name is aliased to itself.
    pub(crate) fn define_alias(&mut self,
                               tokens: &mut Vec<Token>,
                               i: usize,
                               line: usize)
                               -> EvalResult<()> {
        let (span, name, target) = if i == 0 {
            (0..=2, name_of(tokens.get(1)), name_of(tokens.get(2)))
        } else {
            (i - 1..=i + 1, name_of(tokens.get(i + 1)), name_of(tokens.get(i - 1)))
        };

        let (Some(name), Some(target)) = (name, target) else {
            return Err(RuntimeError::MissingOperand { operator: Keyword::Alias.as_str().to_string(),
                                                      line });
        };
        if name == target {
            return Err(RuntimeError::AliasCycle { name: name.to_string(),
                                                  line });
        }

        debug!(alias = name, target, line, "alias defined");
        self.aliases.insert(name.to_string(), target.to_string());
        tokens.drain(span);
        Ok(())
    }
}
