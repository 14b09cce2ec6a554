//! Container runtime inspection.
//!
//! The stack's containers are only observed, never managed. [`DockerCli`]
//! shells out to the `docker` binary but asks it for JSON (`{{json .State}}`)
//! and decodes it into typed structs rather than scraping the human-readable
//! status column.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// Result of the container's own healthcheck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerHealth {
    Healthy,
    Starting,
    Unhealthy,
    /// The image defines no healthcheck
    None,
}

impl ContainerHealth {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "healthy" => ContainerHealth::Healthy,
            "starting" => ContainerHealth::Starting,
            "unhealthy" => ContainerHealth::Unhealthy,
            _ => ContainerHealth::None,
        }
    }

    /// A running container without a healthcheck is assumed healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, ContainerHealth::Healthy | ContainerHealth::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running(ContainerHealth),
    Stopped,
    NotFound,
    /// The runtime could not be queried (CLI missing, socket not mounted, ...)
    Unavailable,
}

impl ContainerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running(_))
    }

    pub fn is_running_and_healthy(&self) -> bool {
        matches!(self, ContainerState::Running(health) if health.is_healthy())
    }
}

/// Read-only view of the container runtime
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn inspect(&self, name: &str) -> ContainerState;

    /// Run `cmd` inside the container; combined stdout+stderr, `None` if it could not run
    async fn exec(&self, name: &str, cmd: &[&str]) -> Option<String>;

    /// Runtime version string, e.g. `24.0.7`
    async fn version(&self) -> Option<String>;
}

pub type SharedRuntime = Arc<dyn ContainerRuntime>;

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Health", default)]
    health: Option<InspectHealth>,
}

#[derive(Debug, Deserialize)]
struct InspectHealth {
    #[serde(rename = "Status", default)]
    status: String,
}

/// Decode `docker inspect --format '{{json .State}}'` output
pub fn parse_inspect_state(raw: &str) -> Option<ContainerState> {
    let state: InspectState = match serde_json::from_str(raw.trim()) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("Unrecognised container state output: {}", e);
            return None;
        }
    };

    // `restarting`, `created`, `exited` and `dead` all read as stopped
    let status = state.status.to_ascii_lowercase();
    if status == "running" || status == "paused" {
        let health = state
            .health
            .map(|h| ContainerHealth::parse(&h.status))
            .unwrap_or(ContainerHealth::None);
        Some(ContainerState::Running(health))
    } else {
        Some(ContainerState::Stopped)
    }
}

/// Extract the version number from `docker --version`
/// (`Docker version 24.0.7, build afdd53b`)
pub fn parse_docker_version(raw: &str) -> Option<String> {
    let mut words = raw.split_whitespace();
    words.find(|w| w.eq_ignore_ascii_case("version"))?;
    let version = words
        .next()?
        .trim_end_matches(',')
        .trim_start_matches('v')
        .to_string();

    if version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        Some(version)
    } else {
        None
    }
}

/// [`ContainerRuntime`] backed by the `docker` command line
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    timeout: Duration,
}

struct CommandOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl DockerCli {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binary: "docker".to_string(),
            timeout,
        }
    }

    /// Use a different executable (e.g. `podman`, or a wrapper script)
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn run(&self, args: &[&str]) -> Option<CommandOutput> {
        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Some(CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(e)) => {
                tracing::debug!("Failed to run {} {:?}: {}", self.binary, args, e);
                None
            }
            Err(_) => {
                tracing::warn!("{} {:?} timed out after {:?}", self.binary, args, self.timeout);
                None
            }
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn inspect(&self, name: &str) -> ContainerState {
        let Some(output) = self
            .run(&["inspect", "--type", "container", "--format", "{{json .State}}", name])
            .await
        else {
            return ContainerState::Unavailable;
        };

        if !output.success {
            // docker: "No such container"; podman: "no such container"
            if output.stderr.to_ascii_lowercase().contains("no such") {
                return ContainerState::NotFound;
            }
            tracing::debug!("docker inspect {} failed: {}", name, output.stderr.trim());
            return ContainerState::Unavailable;
        }

        parse_inspect_state(&output.stdout).unwrap_or(ContainerState::Unavailable)
    }

    async fn exec(&self, name: &str, cmd: &[&str]) -> Option<String> {
        let mut args = vec!["exec", name];
        args.extend_from_slice(cmd);

        let output = self.run(&args).await?;
        Some(format!("{}{}", output.stdout, output.stderr))
    }

    async fn version(&self) -> Option<String> {
        let output = self.run(&["--version"]).await?;
        if !output.success {
            return None;
        }
        parse_docker_version(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_running_with_healthcheck() {
        let raw = r#"{"Status":"running","Running":true,"Paused":false,"Health":{"Status":"healthy","FailingStreak":0,"Log":[]}}"#;
        assert_eq!(
            parse_inspect_state(raw),
            Some(ContainerState::Running(ContainerHealth::Healthy))
        );
    }

    #[test]
    fn test_parse_running_without_healthcheck() {
        let raw = r#"{"Status":"running","Running":true,"Paused":false}"#;
        let state = parse_inspect_state(raw).unwrap();

        assert_eq!(state, ContainerState::Running(ContainerHealth::None));
        assert!(state.is_running_and_healthy());
    }

    #[test]
    fn test_parse_running_but_unhealthy() {
        let raw = r#"{"Status":"running","Running":true,"Health":{"Status":"unhealthy"}}"#;
        let state = parse_inspect_state(raw).unwrap();

        assert!(state.is_running());
        assert!(!state.is_running_and_healthy());
    }

    #[test]
    fn test_parse_exited() {
        let raw = "{\"Status\":\"exited\",\"Running\":false,\"ExitCode\":137}\n";
        assert_eq!(parse_inspect_state(raw), Some(ContainerState::Stopped));
    }

    #[test]
    fn test_parse_restarting_is_stopped() {
        let raw = r#"{"Status":"restarting","Running":true,"Restarting":true}"#;
        assert_eq!(parse_inspect_state(raw), Some(ContainerState::Stopped));
    }

    #[test]
    fn test_parse_paused_is_running() {
        let raw = r#"{"Status":"paused","Running":true,"Paused":true}"#;
        assert_eq!(
            parse_inspect_state(raw),
            Some(ContainerState::Running(ContainerHealth::None))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_inspect_state("Up 3 minutes (healthy)"), None);
        assert_eq!(parse_inspect_state(""), None);
    }

    #[test]
    fn test_container_health_parse() {
        assert_eq!(ContainerHealth::parse("healthy"), ContainerHealth::Healthy);
        assert_eq!(ContainerHealth::parse(" Starting\n"), ContainerHealth::Starting);
        assert_eq!(ContainerHealth::parse("unhealthy"), ContainerHealth::Unhealthy);
        assert_eq!(ContainerHealth::parse(""), ContainerHealth::None);
        assert!(!ContainerHealth::Starting.is_healthy());
    }

    #[test]
    fn test_parse_docker_version() {
        assert_eq!(
            parse_docker_version("Docker version 24.0.7, build afdd53b\n"),
            Some("24.0.7".to_string())
        );
        assert_eq!(
            parse_docker_version("podman version 4.9.3"),
            Some("4.9.3".to_string())
        );
        assert_eq!(parse_docker_version("command not found"), None);
        assert_eq!(parse_docker_version("Docker version unknown"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let cli = DockerCli::new(Duration::from_secs(2))
            .with_binary("wander-definitely-not-a-real-binary");

        assert_eq!(cli.inspect("wander-postgres").await, ContainerState::Unavailable);
        assert_eq!(cli.exec("wander-redis", &["redis-cli", "ping"]).await, None);
        assert_eq!(cli.version().await, None);
    }

    /// Executable shell script standing in for the docker CLI
    #[cfg(unix)]
    fn fake_cli(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("docker");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_no_such_container_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_secs(5)).with_binary(fake_cli(
            &dir,
            "echo 'Error response from daemon: No such container: wander-redis' >&2\nexit 1",
        ));

        assert_eq!(cli.inspect("wander-redis").await, ContainerState::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_podman_style_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_secs(5)).with_binary(fake_cli(
            &dir,
            "echo 'Error: no such container wander-redis' >&2\nexit 125",
        ));

        assert_eq!(cli.inspect("wander-redis").await, ContainerState::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_other_failure_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_secs(5)).with_binary(fake_cli(
            &dir,
            "echo 'Cannot connect to the Docker daemon at unix:///var/run/docker.sock' >&2\nexit 1",
        ));

        assert_eq!(cli.inspect("wander-redis").await, ContainerState::Unavailable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_non_json_output_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_secs(5))
            .with_binary(fake_cli(&dir, "echo 'Up 3 minutes (healthy)'"));

        assert_eq!(cli.inspect("wander-redis").await, ContainerState::Unavailable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_decodes_json_state() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_secs(5)).with_binary(fake_cli(
            &dir,
            r#"echo '{"Status":"running","Running":true,"Health":{"Status":"starting"}}'"#,
        ));

        assert_eq!(
            cli.inspect("wander-postgres").await,
            ContainerState::Running(ContainerHealth::Starting)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_timeout_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_millis(200)).with_binary(fake_cli(&dir, "sleep 5"));

        let started = std::time::Instant::now();
        assert_eq!(cli.inspect("wander-redis").await, ContainerState::Unavailable);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_combines_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let cli = DockerCli::new(Duration::from_secs(5))
            .with_binary(fake_cli(&dir, "echo 'PONG'\necho 'warning' >&2\nexit 1"));

        let output = cli.exec("wander-redis", &["redis-cli", "ping"]).await.unwrap();
        assert!(output.contains("PONG"));
        assert!(output.contains("warning"));
    }
}
