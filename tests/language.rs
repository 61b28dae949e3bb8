use std::{
    cell::RefCell,
    fs,
    io::{self, Cursor, Write},
    rc::Rc,
};

use pretty_assertions::assert_eq;
use slowpp::{
    error::{RuntimeError, ScriptError},
    interpreter::evaluator::core::Io,
    run_source_with,
};
use walkdir::WalkDir;

/// A writer whose contents can be read back after the run.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs a script with the given input and returns the result and everything
/// it printed.
fn run_with_input(src: &str, input: &str) -> (Result<(), ScriptError>, String) {
    let output = SharedBuffer::default();
    let io = Io::new(output.clone(), Cursor::new(input.as_bytes().to_vec()));
    let result = run_source_with(src, &[], io, &mut io::sink());
    (result, output.contents())
}

fn assert_success(src: &str, expected: &str) {
    match run_with_input(src, "") {
        (Ok(()), output) => assert_eq!(output, expected),
        (Err(e), _) => panic!("Script failed: {e}"),
    }
}

fn assert_failure(src: &str) -> ScriptError {
    match run_with_input(src, "") {
        (Ok(()), _) => panic!("Script succeeded but was expected to fail"),
        (Err(e), _) => e,
    }
}

#[test]
fn operators_apply_left_to_right() {
    assert_success("print(1 + 2 * 3)", "9\n");
    assert_success("print(1 + (2 * 3))", "7\n");
    assert_success("print(7 / 2, 4 / 2)", "3.5 2.0\n");
    assert_success("print(5 ^ 3, -7 % 3, 7 % -3)", "6 2 -2\n");
}

#[test]
fn strings_and_repetition() {
    assert_success("print(\"ab\" + \"cd\", \"x\" * 3)", "abcd xxx\n");
    assert_success("print([0] * 3)", "[0, 0, 0]\n");
    assert_success("x = \"two\nlines\"\nprint(x)", "two\nlines\n");
    assert_success("x = \"it's fine\"\ny = x\nprint(y)", "it's fine\n");
}

#[test]
fn compound_assignments() {
    assert_success("x = 2\nx += 3\nx *= 4\nprint(x)", "20\n");
    assert_success("s = \"a\"\ns += \"b\"\nprint(s)", "ab\n");
}

#[test]
fn for_loops() {
    assert_success("t = 0\nfor i(0, 5, 1) {\n\tt += i\n}\nprint(t)", "10\n");
    assert_success("for i(3, 0, -1) {\n\tprint(i)\n}", "3\n2\n1\n");
}

#[test]
fn if_chains() {
    let src = "for x(0, 3, 1) {\n\tif (x == 0) {\n\t\tprint(\"zero\")\n\t} elif (x == 1) {\n\t\tprint(\"one\")\n\t} else {\n\t\tprint(\"more\")\n\t}\n}";
    assert_success(src, "zero\none\nmore\n");
}

#[test]
fn break_and_continue() {
    let src = "for i(0, 10, 1) {\n\tif (i == 4) {\n\t\tbreak\n\t}\n\tif (i == 1) {\n\t\tcontinue\n\t}\n\tprint(i)\n}";
    assert_success(src, "0\n2\n3\n");
    assert_success("n = 0\nwhile (True) {\n\tn += 1\n\tif (n == 3) {\n\t\tbreak\n\t}\n}\nprint(n)",
                   "3\n");
}

#[test]
fn user_defined_functions() {
    assert_success("func add(a, b) {\n\treturn a + b\n}\nprint(add(2, 3))", "5\n");
    assert_success("func add(a, b) {\n\treturn a + b\n}\nprint(add(\"x\", \"y\"))", "xy\n");
    assert_success("func hello() {\n\tprint(\"hi\")\n}\nhello()\nhello()", "hi\nhi\n");
}

#[test]
fn recursion() {
    let src = "func fact(n) {\n\tif (n < 2) {\n\t\treturn 1\n\t}\n\treturn n * fact(n - 1)\n}\nprint(fact(10))";
    assert_success(src, "3628800\n");
}

#[test]
fn locals_do_not_leak() {
    let src = "a = 1\nfunc f(a) {\n\ta = a + 10\n\treturn a\n}\nprint(f(5), a)";
    assert_success(src, "15 1\n");
}

#[test]
fn nested_collections() {
    assert_success("m = [[1, 2], [3, 4]]\nprint(m[1][0], m[-1])", "3 [3, 4]\n");
    assert_success("d = {\"a\": 1}\nd[\"b\"] = 2\nprint(d, d[\"b\"])", "{'a': 1, 'b': 2} 2\n");
}

#[test]
fn aliases() {
    assert_success("print alias say\nsay(\"hi\")", "hi\n");
    assert_success("alias p print\np(1, 2)", "1 2\n");
}

#[test]
fn list_and_dict_builtins() {
    assert_success("xs = [3, 1]\nys = xs\nlappend(ys, 2)\nlreverse(xs)\nprint(xs, len(ys))",
                   "[2, 1, 3] 3\n");
    assert_success("d = {\"b\": 2, \"a\": 1}\nprint(dkeys(d), dvalues(d), dpop(d, \"a\"), d)",
                   "['a', 'b'] [1, 2] 1 {'b': 2}\n");
    assert_success("print(ljoin([\"a\", \"b\", \"c\"], \"-\"))", "a-b-c\n");
}

#[test]
fn input_reads_one_line() {
    let (result, output) = run_with_input("name = input(\"who? \")\nprint(\"hi \" + name)", "bob\nalice\n");
    result.unwrap();
    assert_eq!(output, "who? hi bob\n");
}

#[test]
fn top_level_return_ends_the_run() {
    assert_success("print(1)\nreturn\nprint(2)", "1\n");
}

#[test]
fn flag_header_controls_builtins() {
    assert_failure("#!TMP-LIST False\nxs = []\nlappend(xs, 1)");
    assert_failure("#showvars maybe\nx = 1");
}

#[test]
fn diagnostics_follow_overrides() {
    let mut dump = Vec::new();
    let overrides = [("pel".to_string(), true)];
    let result = run_source_with("x = 1\ny = x + nope",
                                 &overrides,
                                 Io::new(io::sink(), io::empty()),
                                 &mut dump);

    assert!(result.is_err());
    assert_eq!(String::from_utf8(dump).unwrap(), "2\n");
}

#[test]
fn errors_name_the_line() {
    let e = assert_failure("x = 1\ny = z + 1");
    assert_eq!(e.line(), 2);
    assert_eq!(e.error,
               RuntimeError::UndefinedVariable { name: "z".into(),
                                                 line: 2, });
    assert_eq!(e.to_string(),
               "Error on line 2: Undefined variable name 'z'.\n    y = z + 1");
}

#[test]
fn failures() {
    assert!(matches!(assert_failure("x = 1 / 0").error, RuntimeError::DivisionByZero { line: 1 }));
    assert!(matches!(assert_failure("func f(a) {\n\treturn a\n}\nf(1, 2)").error,
                     RuntimeError::ArgumentCountMismatch { .. }));
    assert!(matches!(assert_failure("func f() {\n}\nfunc f() {\n}").error,
                     RuntimeError::FunctionAlreadyDefined { .. }));
    assert!(matches!(assert_failure("continue").error, RuntimeError::LoopControlOutsideLoop { .. }));
    assert!(matches!(assert_failure("x = [1, 2]\nprint(x[5])").error,
                     RuntimeError::IndexOutOfBounds { index: 5, len: 2, line: 2 }));
}

#[test]
fn unbounded_recursion_is_an_error() {
    let src = "func f(n) {\n\treturn f(n + 1)\n}\nf(0)";
    assert_eq!(assert_failure(src).error, RuntimeError::RecursionLimit { line: 2 });
}

#[test]
fn recursion_up_to_the_call_limit() {
    let src = "func down(n) {\n\tif (n == 0) {\n\t\treturn 0\n\t}\n\treturn down(n - 1)\n}\nprint(down(250))";
    assert_success(src, "0\n");
}

#[test]
fn self_containing_list_prints() {
    assert_success("a = [1]\nlappend(a, a)\nprint(a)\nprint(a == a)", "[1, [...]]\nTrue\n");
}

#[test]
fn equal_numbers_are_the_same_dict_key() {
    assert_success("d = {1: 10}\nprint(d[1.0])", "10\n");
    assert_success("print({1: \"a\", True: \"b\"})", "{1: 'b'}\n");
}

#[test]
fn demos_run() {
    let mut count = 0;

    for entry in WalkDir::new("demos").into_iter()
                                      .filter_map(Result::ok)
                                      .filter(|e| e.path().extension().is_some_and(|ext| ext == "slow"))
    {
        let path = entry.path();
        let src = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        count += 1;

        if let (Err(e), output) = run_with_input(&src, "") {
            panic!("Demo {path:?} failed:\n{e}\nOutput so far:\n{output}");
        }
    }

    assert!(count > 0, "No demos found in demos/");
}

#[test]
fn fizzbuzz_demo_output() {
    let src = fs::read_to_string("demos/fizzbuzz.slow").unwrap();
    let (result, output) = run_with_input(&src, "");
    result.unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 15);
    assert_eq!(&lines[..5], ["1", "2", "Fizz", "4", "Buzz"]);
    assert_eq!(lines[14], "FizzBuzz");
}
