//! Host options: the only I/O surface the evaluator ever touches. Expressed
//! as a small struct of optional callbacks rather than an open,
//! dynamically-typed configuration object, since the host language here is
//! Rust and the recognized options are fixed.

use crate::errors::EvalError;

/// Host-supplied stdout/stdin hooks. Absence of `stdout` silently drops
/// writes; absence of `stdin` causes `console.read` to raise
/// `EvalError::StdinMissing`.
pub struct HostOptions {
    stdout: Option<Box<dyn FnMut(&str)>>,
    stdin: Option<Box<dyn FnMut() -> String>>,
}

impl HostOptions {
    pub fn new() -> Self {
        Self {
            stdout: None,
            stdin: None,
        }
    }

    pub fn with_stdout(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.stdout = Some(Box::new(f));
        self
    }

    pub fn with_stdin(mut self, f: impl FnMut() -> String + 'static) -> Self {
        self.stdin = Some(Box::new(f));
        self
    }

    pub fn write_stdout(&mut self, text: &str) {
        if let Some(f) = &mut self.stdout {
            f(text);
        }
    }

    pub fn read_stdin(&mut self) -> Result<String, EvalError> {
        match &mut self.stdin {
            Some(f) => Ok(f()),
            None => Err(EvalError::StdinMissing),
        }
    }
}

impl Default for HostOptions {
    fn default() -> Self {
        Self::new()
    }
}
