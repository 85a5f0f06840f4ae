use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use buildd::exec::env::resolve_overlay;
use buildd::exec::{CommandOutput, Invocation, ProcessRunner};

/// Custom behaviour hook: return `Some` to answer a command yourself, `None`
/// to fall through to the scripted defaults.
pub type Handler = dyn for<'a, 'b> Fn(&'a Invocation<'b>) -> Option<CommandOutput> + Send + Sync;

/// One command the fake runner was asked to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Command with the secret already masked.
    pub command: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
}

/// A fake process runner that:
/// - records every invocation
/// - never spawns a process, but acts out a tiny scripted shell against the
///   real filesystem so workspace handling can be observed.
///
/// Scripted commands:
/// - `git clone <url> <target>` creates `<cwd>/<target>`
/// - `git checkout missing` fails, any other `git` command succeeds
/// - `echo <args..>` prints its arguments and a newline
/// - `false` fails with `exit status 1`
/// - `write <path> <content>` writes a file relative to the working dir
/// - `printenv <NAME>` prints the resolved overlay value of `NAME`
/// - anything else succeeds silently
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    handler: Option<Arc<Handler>>,
}

impl std::fmt::Debug for FakeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeRunner")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult `handler` before the scripted defaults.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Option<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::default(),
            handler: Some(Arc::new(handler)),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        invocation: Invocation<'a>,
    ) -> Pin<Box<dyn Future<Output = CommandOutput> + Send + 'a>> {
        self.calls.lock().unwrap().push(RecordedCall {
            command: invocation.redacted_command(),
            cwd: invocation.cwd.to_path_buf(),
            env: invocation.env.clone(),
        });

        let output = self
            .handler
            .as_ref()
            .and_then(|h| h(&invocation))
            .unwrap_or_else(|| scripted(&invocation));

        Box::pin(async move { output })
    }
}

fn scripted(invocation: &Invocation<'_>) -> CommandOutput {
    let args: Vec<&str> = invocation.command.iter().map(String::as_str).collect();
    let cwd = invocation.cwd;

    match args.as_slice() {
        [] => CommandOutput::failed("empty command"),
        ["git", "clone", _, target] => match fs::create_dir_all(cwd.join(target)) {
            Ok(()) => CommandOutput::ok(""),
            Err(err) => CommandOutput::failed(err.to_string()),
        },
        ["git", "checkout", "missing"] => CommandOutput {
            stderr: "error: pathspec 'missing' did not match any file(s) known to git\n".into(),
            error: Some("exit status 1".into()),
            ..Default::default()
        },
        ["git", ..] => CommandOutput::ok(""),
        ["echo", rest @ ..] => CommandOutput::ok(format!("{}\n", rest.join(" "))),
        ["false"] => CommandOutput::failed("exit status 1"),
        ["write", path, content] => {
            let path = cwd.join(path);
            let written = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|()| fs::write(&path, content));
            match written {
                Ok(()) => CommandOutput::ok(""),
                Err(err) => CommandOutput::failed(err.to_string()),
            }
        }
        ["printenv", name] => {
            let value = resolve_overlay(invocation.env, cwd)
                .into_iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .unwrap_or_default();
            CommandOutput::ok(format!("{value}\n"))
        }
        _ => CommandOutput::ok(""),
    }
}
