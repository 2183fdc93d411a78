use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

const OUTPUT_PLACEHOLDER: &str = "{output}";
const DATABASE_PLACEHOLDER: &str = "{database}";
/// File stem of the compiled search executable.
const BINARY_STEM: &str = "search";

/// An external program that compiles `search.db` into a standalone search
/// executable.
///
/// `{output}` and `{database}` in `args` are replaced with the executable's
/// path and the database's path before the program runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBinary {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// How the search binary step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchBinaryOutcome {
    Built(PathBuf),
    /// The program is not installed. The markdown tree and search database
    /// are still usable.
    ToolMissing { program: String, remediation: String },
    Failed { reason: String },
}
impl SearchBinaryOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }
}

impl SearchBinary {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect() }
    }

    /// Where the executable is expected inside `output_dir`.
    pub fn output_path(output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{BINARY_STEM}{}", std::env::consts::EXE_SUFFIX))
    }

    fn arguments(&self, output: &Path, database: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        let database = database.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output).replace(DATABASE_PLACEHOLDER, &database))
            .collect()
    }

    /// Run the program. Never fails: every problem is reported through the
    /// returned outcome.
    #[instrument(name = "building search binary", skip(self), fields(program = %self.program))]
    pub async fn build(&self, output_dir: &Path, database: &Path) -> SearchBinaryOutcome {
        let Ok(program) = which::which(&self.program) else {
            tracing::warn!("search binary toolchain not found in PATH");
            return SearchBinaryOutcome::ToolMissing {
                program: self.program.clone(),
                remediation: format!("install `{}` and make sure it is on PATH, then convert again", self.program),
            };
        };
        let output = Self::output_path(output_dir);
        tracing::debug!(program = %program.display(), output = %output.display(), "running search binary build");
        let result = tokio::process::Command::new(&program)
            .args(self.arguments(&output, database))
            .current_dir(output_dir)
            .output()
            .await;
        let reason = match result {
            Err(e) => format!("could not run {}: {e}", self.program),
            Ok(out) if !out.status.success() => {
                format!("{} exited with {}: {}", self.program, out.status, String::from_utf8_lossy(&out.stderr).trim())
            },
            Ok(_) if !tokio::fs::try_exists(&output).await.unwrap_or(false) => {
                format!("{} did not produce {}", self.program, output.display())
            },
            Ok(_) => {
                tracing::info!(output = %output.display(), "search binary built");
                return SearchBinaryOutcome::Built(output);
            },
        };
        tracing::warn!(%reason, "search binary build failed");
        SearchBinaryOutcome::Failed { reason }
    }
}
