/// kubectl process invocation
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured output of a finished kubectl run.
pub struct KubectlOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl KubectlOutput {
    fn from_output(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }

    /// Stdout on success, otherwise an error carrying stderr.
    pub fn into_result(self) -> Result<String> {
        if self.success {
            Ok(self.stdout)
        } else {
            anyhow::bail!("{}", self.stderr.trim())
        }
    }
}

/// Builder for a single kubectl invocation.
///
/// Stdout and stderr are always piped. Each built command spawns exactly one
/// process and blocks the caller until it exits; there is no retry and no
/// timeout beyond what kubectl itself applies.
pub struct Kubectl {
    command: Command,
    context_msg: Option<String>,
}

impl Kubectl {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        let mut command = Command::new(program);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        Self {
            command,
            context_msg: None,
        }
    }

    /// Add a single argument
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.command.arg(arg);
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command.args(args);
        self
    }

    /// Scope the invocation to a namespace.
    pub fn namespace(self, ns: &str) -> Self {
        self.arg(format!("--namespace={}", ns))
    }

    /// Export KUBECONFIG for the invocation when a path is configured.
    pub fn kubeconfig(mut self, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            self.command.env("KUBECONFIG", path);
        }
        self
    }

    /// Set context message for error reporting.
    pub fn context<S: Into<String>>(mut self, msg: S) -> Self {
        self.context_msg = Some(msg.into());
        self
    }

    /// Execute and return the captured output.
    pub async fn output(mut self) -> Result<KubectlOutput> {
        let output = if let Some(ctx) = &self.context_msg {
            self.command.output().await.context(ctx.clone())?
        } else {
            self.command.output().await?
        };
        Ok(KubectlOutput::from_output(output))
    }

    /// Execute and return stdout on success, error on failure.
    pub async fn run(self) -> Result<String> {
        self.output().await?.into_result()
    }

    /// Execute caring only about the exit status.
    pub async fn run_silent(self) -> Result<()> {
        self.output().await?.into_result().map(|_| ())
    }

    #[cfg(test)]
    fn argv(&self) -> Vec<String> {
        self.command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }
}

/// Check that the kubectl binary is runnable.
pub async fn check_kubectl_installed(program: &str) -> Result<()> {
    let output = Kubectl::new(program)
        .args(["version", "--client"])
        .output()
        .await;

    match output {
        Ok(out) if out.success => Ok(()),
        _ => anyhow::bail!(
            "{} is not installed or not in PATH. Please install from https://kubernetes.io/docs/tasks/tools/",
            program
        ),
    }
}
