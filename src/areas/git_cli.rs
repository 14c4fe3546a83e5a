//! External VCS tool boundary
//!
//! The engine never shells out on the hot read path. The git binary is
//! invoked only for: expanding packfiles into loose objects at startup,
//! producing a textual diff for a validated commit reference, and
//! fetch/pull during maintenance.
//!
//! Every invocation runs in the repository's working directory with a
//! bounded read of stdout. Commit references are validated against a strict
//! hex pattern before they ever reach an argument vector, and a tool failure
//! degrades to a warning plus empty output, so callers must treat an empty
//! result as "nothing to show".

use anyhow::Context;
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::warn;

/// Maximum number of stdout bytes read from a delegated invocation
pub const GIT_MAX_OUTPUT: usize = 65536;

/// Marker appended when a diff hits the output bound
const DIFF_TRUNCATED_MARKER: &str = "\n\n[-- DIFF TOO LONG --]";

/// Full-length lowercase hex digest, the only commit reference accepted
const COMMIT_REF_PATTERN: &str = r"^[0-9a-f]{40}$";

fn commit_ref_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(COMMIT_REF_PATTERN).expect("commit ref pattern is valid"))
}

/// Check a commit reference before it is allowed near an argument vector
pub fn is_valid_commit_ref(commit: &str) -> bool {
    commit_ref_regex().is_match(commit)
}

/// Wrapper for the git command line, scoped to one working directory
#[derive(Debug)]
pub struct GitCli {
    work_dir: Box<Path>,
}

impl GitCli {
    pub fn new(work_dir: Box<Path>) -> Self {
        GitCli { work_dir }
    }

    /// Textual diff for a validated commit reference (`git show`)
    ///
    /// Over-long output is cut at the read bound and marked as truncated.
    pub fn diff(&self, commit: &str) -> String {
        if !is_valid_commit_ref(commit) {
            warn!("Rejecting malformed commit reference {:?}", commit);
            return String::new();
        }

        let output = self.run(&["show", commit], None);
        if output.len() >= GIT_MAX_OUTPUT {
            format!("{}{}", output, DIFF_TRUNCATED_MARKER)
        } else {
            output
        }
    }

    /// Fetch changes from the default origin repository
    pub fn fetch(&self) -> String {
        self.run(&["fetch"], None)
    }

    /// Pull changes from the default origin repository
    pub fn pull(&self) -> String {
        self.run(&["pull"], None)
    }

    /// Re-fetch tags after the local tag cache was dropped
    pub fn fetch_tags(&self) -> String {
        self.run(&["fetch", "--tags"], None)
    }

    /// Expand one packfile into loose objects
    ///
    /// The packfile must already have been moved out of `objects/pack`,
    /// otherwise git considers its objects present and unpacks nothing.
    pub fn unpack_objects(&self, pack: &Path) -> anyhow::Result<()> {
        let pack_file = std::fs::File::open(pack)
            .with_context(|| format!("Unable to open packfile {:?}", pack))?;
        self.exec(&["unpack-objects"], Some(pack_file))?;
        Ok(())
    }

    /// Run a delegated command, degrading failure to warn + empty output
    fn run(&self, args: &[&str], stdin: Option<std::fs::File>) -> String {
        match self.exec(args, stdin) {
            Ok(output) => String::from_utf8_lossy(&output).into_owned(),
            Err(e) => {
                warn!("git {:?} failed: {}", args, e);
                String::new()
            }
        }
    }

    /// Execute git in the working directory with a bounded stdout read
    fn exec(&self, args: &[&str], stdin: Option<std::fs::File>) -> anyhow::Result<Vec<u8>> {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(match stdin {
                Some(file) => Stdio::from(file),
                None => Stdio::null(),
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to run git {:?}", args))?;

        let stdout = child
            .stdout
            .take()
            .context("Child process exposed no stdout")?;
        let mut limited = stdout.take(GIT_MAX_OUTPUT as u64);
        let mut output = Vec::new();
        limited.read_to_end(&mut output)?;

        // Drain anything past the bound so the child is not blocked on a
        // full pipe before wait()
        std::io::copy(&mut limited.into_inner(), &mut std::io::sink())?;

        let status = child.wait()?;
        if !status.success() {
            anyhow::bail!("git {:?} exited with {}", args, status);
        }

        Ok(output)
    }
}
