use std::path::PathBuf;
use std::process::{Command, Stdio};

use promoter_core::sanitize;

use crate::{Host, HostReply, ProcessError};

const STDERR_SNIPPET: usize = 200;
/// Lines starting with this are the collaborator's own failure reports.
/// Only a leading marker counts; a promotion that merely mentions "Error" is kept.
const ERROR_MARKER: &str = "Error";

/// Turns a URL into promotion text on a given host. Blocking, no timeout.
pub trait Processor: Send + Sync {
    fn process(&self, host: &Host, url: &str) -> HostReply;
}

impl<F> Processor for F
where
    F: Fn(&Host, &str) -> HostReply + Send + Sync,
{
    fn process(&self, host: &Host, url: &str) -> HostReply {
        self(host, url)
    }
}

#[derive(Debug, Clone)]
pub struct CommandSettings {
    pub program: PathBuf,
    /// Arguments placed before the host and URL.
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./promote.sh"),
            args: Vec::new(),
            env: vec![("TERM".to_string(), "dumb".to_string())],
        }
    }
}

/// Runs `<program> [args...] <host> <url>` and reads the promotion from stdout.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    settings: CommandSettings,
}

impl CommandProcessor {
    pub fn new(settings: CommandSettings) -> Self {
        Self { settings }
    }
}

impl Processor for CommandProcessor {
    fn process(&self, host: &Host, url: &str) -> HostReply {
        let program = self.settings.program.display().to_string();
        let output = Command::new(&self.settings.program)
            .args(&self.settings.args)
            .arg(host.as_str())
            .arg(url)
            .envs(self.settings.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .map_err(|err| ProcessError::Spawn {
                program,
                message: err.to_string(),
            })?;

        if !output.status.success() {
            let stderr = sanitize(&String::from_utf8_lossy(&output.stderr));
            return Err(ProcessError::ExitStatus {
                status: output.status.to_string(),
                stderr: stderr.chars().take(STDERR_SNIPPET).collect(),
            });
        }

        first_meaningful_line(&String::from_utf8_lossy(&output.stdout))
    }
}

fn first_meaningful_line(stdout: &str) -> HostReply {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| !sanitize(line).is_empty())
        .ok_or(ProcessError::EmptyOutput)?;
    if sanitize(line).starts_with(ERROR_MARKER) {
        return Err(ProcessError::Reported(line.to_string()));
    }
    Ok(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::{first_meaningful_line, CommandProcessor, CommandSettings, Processor};
    use crate::{Host, HostReply, ProcessError};

    #[test]
    fn skips_blank_and_escape_only_lines() {
        let stdout = "\n   \n\x1b[0m\nA fine article.\nsecond line\n";
        assert_eq!(first_meaningful_line(stdout).unwrap(), "A fine article.");
    }

    #[test]
    fn empty_output_is_an_error() {
        assert_eq!(first_meaningful_line("\n \n"), Err(ProcessError::EmptyOutput));
    }

    #[test]
    fn error_lines_are_reported_failures() {
        assert!(matches!(
            first_meaningful_line("Error fetching URL: 404\n"),
            Err(ProcessError::Reported(_))
        ));
    }

    #[test]
    fn error_later_in_the_text_is_kept() {
        assert_eq!(
            first_meaningful_line("Fixing the Error budget in practice\n").unwrap(),
            "Fixing the Error budget in practice"
        );
    }

    #[test]
    fn closures_are_processors() {
        let processor = |host: &Host, url: &str| -> HostReply { Ok(format!("{host}:{url}")) };
        assert_eq!(
            processor.process(&Host::new("a"), "u").unwrap(),
            "a:u".to_string()
        );
    }

    #[cfg(unix)]
    fn shell(script: &str) -> CommandProcessor {
        CommandProcessor::new(CommandSettings {
            program: "sh".into(),
            args: vec!["-c".to_string(), script.to_string()],
            ..CommandSettings::default()
        })
    }

    #[cfg(unix)]
    #[test]
    fn command_receives_host_and_url() {
        // `sh -c script host url` binds the host to $0 and the URL to $1.
        let processor = shell(r#"printf '\n\nPromo for %s on %s\nextra\n' "$1" "$0""#);
        let reply = processor.process(&Host::new("gpu-1"), "https://a.example");
        assert_eq!(reply.unwrap(), "Promo for https://a.example on gpu-1");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_failure() {
        let processor = shell("echo boom >&2; exit 3");
        match processor.process(&Host::new("h"), "https://a.example") {
            Err(ProcessError::ExitStatus { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn dumb_terminal_is_requested() {
        let processor = shell(r#"echo "term=$TERM""#);
        assert_eq!(
            processor.process(&Host::new("h"), "u").unwrap(),
            "term=dumb"
        );
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let processor = CommandProcessor::new(CommandSettings {
            program: "./definitely-not-a-real-program".into(),
            ..CommandSettings::default()
        });
        assert!(matches!(
            processor.process(&Host::new("h"), "u"),
            Err(ProcessError::Spawn { .. })
        ));
    }
}
