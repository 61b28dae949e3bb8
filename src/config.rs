use tracing::{debug, warn};

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, source::SourceLine},
};

/// Debugging flags. Each one enables a section of the diagnostics dump.
pub const DEBUG_FLAGS: &[&str] = &["showfams",
                                   "showflags",
                                   "showvars",
                                   "showlocals",
                                   "pel",
                                   "funcnames",
                                   "funclines",
                                   "funcargs"];

/// Flags that register the list wrapper builtins.
pub const TMP_LIST_FLAGS: &[&str] = &["tmp-list-join",
                                      "tmp-list-append",
                                      "tmp-list-pop",
                                      "tmp-list-insert",
                                      "tmp-list-count",
                                      "tmp-list-extend",
                                      "tmp-list-index",
                                      "tmp-list-copy",
                                      "tmp-list-reverse"];

/// Flags that register the dict wrapper builtins.
pub const TMP_DICT_FLAGS: &[&str] = &["tmp-dict-update",
                                      "tmp-dict-pop",
                                      "tmp-dict-copy",
                                      "tmp-dict-keys",
                                      "tmp-dict-items",
                                      "tmp-dict-values"];

/// Named groups of flags. A member starting with `!` names a nested family.
/// `ALL` is implicit and covers every flag.
pub const FAMILIES: &[(&str, &[&str])] =
    &[("ALL", &[]),
      ("FUNCS", &["funcnames", "funclines", "funcargs"]),
      ("VARS", &["showvars", "showlocals"]),
      ("DEBUG", &["!FUNCS", "!VARS", "pel", "showflags", "showfams"]),
      ("TMP", &["!TMP-LIST", "!TMP-DICT"]),
      ("TMP-LIST", TMP_LIST_FLAGS),
      ("TMP-DICT", TMP_DICT_FLAGS)];

/// Parses a flag value. Accepts `True`/`False` as written in scripts and the
/// lowercase forms for the command line.
///
/// # Example
/// ```
/// use slowpp::config::parse_flag_value;
///
/// assert_eq!(parse_flag_value("True"), Some(true));
/// assert_eq!(parse_flag_value("false"), Some(false));
/// assert_eq!(parse_flag_value("1"), None);
/// ```
#[must_use]
pub fn parse_flag_value(text: &str) -> Option<bool> {
    match text.trim() {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}

/// Interpreter flags.
///
/// Debugging flags default to off, the list and dict wrapper flags to on.
/// Flags keep their declaration order so dumps are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    flags: Vec<(&'static str, bool)>,
}

impl Default for Config {
    fn default() -> Self {
        let debug = DEBUG_FLAGS.iter().map(|&name| (name, false));
        let tmp = TMP_LIST_FLAGS.iter().chain(TMP_DICT_FLAGS).map(|&name| (name, true));

        Self { flags: debug.chain(tmp).collect() }
    }
}

impl Config {
    /// Returns the value of a flag, or `None` if no such flag exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
    }

    /// Returns `true` if the flag exists and is on.
    #[must_use]
    pub fn enabled(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    /// Iterates over every flag in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.flags.iter().copied()
    }

    /// Sets a single flag. Returns `false` if the flag does not exist.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        match self.flags.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    /// Sets every flag of a family, recursing into nested families. Returns
    /// `false` if the family does not exist.
    pub fn set_family(&mut self, family: &str, value: bool) -> bool {
        let Some(&(_, members)) = FAMILIES.iter().find(|(name, _)| *name == family) else {
            return false;
        };

        if family == "ALL" {
            for (_, slot) in &mut self.flags {
                *slot = value;
            }
            return true;
        }

        for member in members {
            match member.strip_prefix('!') {
                Some(nested) => self.set_family(nested, value),
                None => self.set(member, value),
            };
        }
        true
    }

    /// Sets a flag, or a family when `name` starts with `!`.
    ///
    /// # Example
    /// ```
    /// use slowpp::config::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.apply("!DEBUG", true));
    /// assert!(config.enabled("funcargs"));
    /// assert!(!config.apply("nonsense", true));
    /// ```
    pub fn apply(&mut self, name: &str, value: bool) -> bool {
        match name.strip_prefix('!') {
            Some(family) => self.set_family(family, value),
            None => self.set(name, value),
        }
    }

    /// Returns `true` if every member of the family is on.
    #[must_use]
    pub fn family_enabled(&self, family: &str) -> bool {
        if family == "ALL" {
            return self.flags.iter().all(|&(_, v)| v);
        }

        FAMILIES.iter()
                .find(|(name, _)| *name == family)
                .is_some_and(|(_, members)| {
                    members.iter().all(|member| match member.strip_prefix('!') {
                        Some(nested) => self.family_enabled(nested),
                        None => self.enabled(member),
                    })
                })
    }

    /// Applies the flag header at the top of a program.
    ///
    /// The header is the run of leading lines starting with `#`, optionally
    /// interleaved with `//` comment lines. `#name True` sets one flag and
    /// `#!FAMILY False` sets a family. Unknown names are skipped with a
    /// warning.
    ///
    /// # Returns
    /// The number of header lines, which the driver never executes.
    ///
    /// # Errors
    /// `InvalidFlag` if a header line has no value or a value other than
    /// `True`/`False`.
    pub fn apply_header(&mut self, lines: &[SourceLine]) -> EvalResult<usize> {
        let mut consumed = 0;

        for line in lines {
            let text = line.text.trim();

            if text.starts_with("//") {
                consumed += 1;
                continue;
            }
            let Some(setting) = text.strip_prefix('#') else {
                break;
            };

            let invalid = || RuntimeError::InvalidFlag { details: text.to_string(),
                                                         line:    line.number, };
            let (name, value) = setting.split_once(char::is_whitespace).ok_or_else(invalid)?;
            let value = parse_flag_value(value).ok_or_else(invalid)?;

            if self.apply(name, value) {
                debug!(flag = name, value, "header flag");
            } else {
                warn!(flag = name, line = line.number, "unknown flag ignored");
            }
            consumed += 1;
        }

        Ok(consumed)
    }
}
