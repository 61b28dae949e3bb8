use std::io::{self, Write};

use crate::{
    config::FAMILIES,
    interpreter::{
        evaluator::{
            core::{Context, Scope},
            function::core::BUILTIN_FUNCTIONS,
        },
        value::core::Value,
    },
};

/// Renders a namespace as `{'name': value, ...}`, sorted by name.
fn render_scope(scope: Option<&Scope>) -> String {
    let mut entries: Vec<(&String, &Value)> = scope.map(|s| s.iter().collect()).unwrap_or_default();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let body: Vec<String> = entries.iter()
                                   .map(|(name, value)| format!("{}: {}", Value::from(name.as_str()).repr(), value.repr()))
                                   .collect();
    format!("{{{}}}", body.join(", "))
}

/// Renders names as a list of quoted strings.
fn render_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let values: Vec<Value> = names.into_iter().map(Value::from).collect();
    Value::from(values).to_string()
}

impl Context {
    /// Writes the diagnostics selected by the debugging flags.
    ///
    /// Sections appear in a fixed order, each only when its flag is on:
    /// `showfams`, `showflags`, `showvars`, `showlocals`, `pel`, `funcnames`,
    /// `funclines` and `funcargs`. The dump is written after every run,
    /// including failed ones, so it shows the state the run stopped in.
    ///
    /// # Example
    /// ```
    /// use std::io;
    ///
    /// use slowpp::{
    ///     config::Config,
    ///     interpreter::{evaluator::core::{Context, Io}, program::Program, source::break_lines},
    /// };
    ///
    /// let mut config = Config::default();
    /// config.set("pel", true);
    /// let program = Program::build(break_lines("x = 1"), 0).unwrap();
    /// let mut context = Context::new(program, config, Io::new(io::sink(), io::empty()));
    /// context.run().unwrap();
    ///
    /// let mut out = Vec::new();
    /// context.dump(&mut out).unwrap();
    /// assert_eq!(String::from_utf8(out).unwrap(), "1\n");
    /// ```
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.config.enabled("showfams") {
            for (family, _) in FAMILIES {
                let on = if self.config.family_enabled(family) { "True" } else { "False" };
                writeln!(out, "{family} : {on}")?;
            }
        }
        if self.config.enabled("showflags") {
            for (name, value) in self.config.flags() {
                writeln!(out, "{name} : {}", Value::Bool(value))?;
            }
        }
        if self.config.enabled("showvars") {
            writeln!(out, "{}", render_scope(Some(&self.globals)))?;
        }
        if self.config.enabled("showlocals") {
            writeln!(out, "{}", render_scope(self.frames.last()))?;
        }
        if self.config.enabled("pel") {
            writeln!(out, "{}", self.program.number(self.cursor))?;
        }
        if self.config.enabled("funcnames") {
            writeln!(out, "{}", render_names(self.callable_names().iter().map(String::as_str)))?;
        }
        if self.config.enabled("funclines") {
            let numbers: Vec<String> = self.program
                                           .function_lines
                                           .iter()
                                           .map(|&index| self.program.number(index).to_string())
                                           .collect();
            writeln!(out, "[{}]", numbers.join(", "))?;
        }
        if self.config.enabled("funcargs") {
            let mut functions: Vec<_> = self.program.functions.values().collect();
            functions.sort_by(|a, b| a.name.cmp(&b.name));
            let entries: Vec<String> =
                functions.iter()
                         .map(|f| {
                             format!("{}: {}",
                                     Value::from(f.name.as_str()).repr(),
                                     render_names(f.params.iter().map(String::as_str)))
                         })
                         .collect();
            writeln!(out, "{{{}}}", entries.join(", "))?;
        }
        Ok(())
    }

    /// Returns every callable name: registered builtins in table order, then
    /// user functions and aliases, each sorted.
    #[must_use]
    pub fn callable_names(&self) -> Vec<String> {
        let mut functions: Vec<&String> = self.program.functions.keys().collect();
        functions.sort();
        let mut aliases: Vec<&String> = self.aliases.keys().collect();
        aliases.sort();

        BUILTIN_FUNCTIONS.iter()
                         .filter(|name| self.builtin(name).is_some())
                         .map(|name| (*name).to_string())
                         .chain(functions.into_iter().cloned())
                         .chain(aliases.into_iter().cloned())
                         .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        interpreter::{evaluator::core::Io, program::Program, source::break_lines},
    };

    fn dump_after(source: &str, flags: &[&str]) -> String {
        let mut config = Config::default();
        config.set_family("TMP", false);
        for flag in flags {
            config.apply(flag, true);
        }
        let program = Program::build(break_lines(source), 0).unwrap();
        let mut context = Context::new(program, config, Io::new(io::sink(), io::empty()));
        let _ = context.run();

        let mut out = Vec::new();
        context.dump(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn nothing_by_default() {
        assert_eq!(dump_after("x = 1", &[]), "");
    }

    #[test]
    fn variables_and_functions() {
        let source = "func add(a, b) {\n\treturn a + b\n}\nprint alias show\nx = add(1, 2)";
        let out = dump_after(source, &["showvars", "funcnames", "funclines", "funcargs"]);
        assert_eq!(out,
                   "{'False': False, 'None': None, 'True': True, 'x': 3}\n\
                    ['print', 'input', 'hash', 'len', 'add', 'show']\n\
                    [1, 2, 3]\n\
                    {'add': ['a', 'b']}\n");
    }

    #[test]
    fn failed_runs_keep_the_callee_state() {
        let source = "func f(a) {\n\treturn a + missing\n}\nf(5)";
        let out = dump_after(source, &["showlocals", "pel"]);
        assert_eq!(out, "{'a': 5}\n2\n");
    }

    #[test]
    fn families() {
        let out = dump_after("", &["!FUNCS", "showfams"]);
        assert!(out.starts_with("ALL : False\nFUNCS : True\nVARS : False\nDEBUG : False\nTMP : False\n"));
        assert!(out.ends_with("['print', 'input', 'hash', 'len']\n[]\n{}\n"));
    }
}
