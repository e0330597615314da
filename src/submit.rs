//! Assembling the `qsub` job-array invocation.
//!
//! Nothing here talks to the scheduler. [`SubmitRequest::render`] produces a
//! self-contained shell snippet (the `qsub` call plus an inline dispatch
//! script) that the user pipes to `sh` to actually submit.

use std::fmt::Write;

use crate::flags::FlagMap;

/// Everything the scheduler needs for one job-array submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub name: String,
    pub flags: FlagMap,
    /// One shell command per array task, already bundled.
    pub tasks: Vec<String>,
    /// Environment modules loaded before each task.
    pub modules: Vec<String>,
    /// Predecessor-job dependency specifier (`-hold_jid`).
    pub hold: Option<String>,
    /// Limit on concurrently running array tasks (`-tc`).
    pub max_concurrent: Option<u32>,
}

impl SubmitRequest {
    /// The `qsub` argument vector, in a deterministic order: name and array
    /// range first, then the optional concurrency/dependency flags, then the
    /// translated flag map in key order.
    pub fn qsub_args(&self) -> Vec<String> {
        let mut args = vec![
            "-N".to_string(),
            self.name.clone(),
            "-t".to_string(),
            format!("1-{}", self.tasks.len()),
        ];
        if let Some(tc) = self.max_concurrent {
            args.push("-tc".to_string());
            args.push(tc.to_string());
        }
        if let Some(hold) = &self.hold {
            args.push("-hold_jid".to_string());
            args.push(hold.clone());
        }
        for (flag, value) in self.flags.iter() {
            args.push(flag.to_string());
            // A value like "make-dedicated 2" is two argv words.
            args.extend(value.split_whitespace().map(String::from));
        }
        args.push("-S".to_string());
        args.push("/bin/sh".to_string());
        args
    }

    /// Render the full submission as a shell snippet.
    ///
    /// The here-doc delimiter is quoted so `$SGE_TASK_ID` survives until the
    /// scheduler runs the script.
    pub fn render(&self) -> String {
        let mut out = String::from("qsub");
        for arg in self.qsub_args() {
            out.push(' ');
            out.push_str(&shell_quote(&arg));
        }
        out.push_str(" <<'END_OF_TASKS'\n");
        for module in &self.modules {
            writeln!(out, "module load {module}").unwrap();
        }
        writeln!(out, "case \"$SGE_TASK_ID\" in").unwrap();
        for (i, task) in self.tasks.iter().enumerate() {
            writeln!(out, "{}) {task} ;;", i + 1).unwrap();
        }
        writeln!(out, "esac").unwrap();
        out.push_str("END_OF_TASKS\n");
        out
    }
}

/// Quote a word for POSIX sh. Plain words pass through untouched.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=,:".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}
