//! Shared harness for the program tests.
//!
//! Every case runs twice: once with the adaptive defaults and once with
//! specialization turned off, and both runs must agree with the expectation.

use molt::{CompilationOptions, Engine, EngineOptions, Error, Value};

/// What a program produced: its value, or the diagnostic code it failed with.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Value(Value),
    Failed(String),
}

pub fn engines() -> [Engine; 2] {
    let generic = EngineOptions {
        default_compilation_options: CompilationOptions {
            specialize_constant_comparisons: false,
            recognize_return_tail: false,
        },
        ..EngineOptions::default()
    };
    [Engine::new(EngineOptions::default()), Engine::new(generic)]
}

/// Compiles `source` into each engine, binds `bindings`, and runs it.
pub fn run(source: &str, bindings: &[(&str, Value)]) -> [Outcome; 2] {
    engines().map(|mut engine| {
        for (name, value) in bindings {
            engine.set(*name, value.clone()).unwrap();
        }
        let program = match engine.compile(source) {
            Ok(program) => program,
            Err(err) => return failed(err),
        };
        match engine.run(&program) {
            Ok(value) => Outcome::Value(value),
            Err(err) => failed(err),
        }
    })
}

fn failed(err: Error) -> Outcome {
    let code = err
        .diagnostics()
        .first()
        .and_then(|diagnostic| diagnostic.code.clone())
        .unwrap_or_else(|| err.to_string());
    Outcome::Failed(code)
}

macro_rules! test_case {
    (
        name: $name:ident,
        input: { $input:expr },
        $(bindings: { $($var:literal => $val:expr),* $(,)? },)?
        value: { $value:expr } $(,)?
    ) => {
        #[test]
        fn $name() {
            let bindings: Vec<(&str, molt::Value)> = vec![$($(($var, $val)),*)?];
            let [adaptive, generic] = crate::cases::run($input, &bindings);
            pretty_assertions::assert_eq!(adaptive, crate::cases::Outcome::Value($value));
            pretty_assertions::assert_eq!(generic, crate::cases::Outcome::Value($value));
        }
    };
    (
        name: $name:ident,
        input: { $input:expr },
        $(bindings: { $($var:literal => $val:expr),* $(,)? },)?
        error: { $code:expr } $(,)?
    ) => {
        #[test]
        fn $name() {
            let bindings: Vec<(&str, molt::Value)> = vec![$($(($var, $val)),*)?];
            let [adaptive, generic] = crate::cases::run($input, &bindings);
            let expected = crate::cases::Outcome::Failed($code.to_string());
            pretty_assertions::assert_eq!(adaptive, expected);
            pretty_assertions::assert_eq!(generic, expected);
        }
    };
}
