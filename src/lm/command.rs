//! Local command backend.
//!
//! Delegates generation to a user-configured command (`llm`, `ollama run`, a
//! wrapper script). The prompt is written to stdin and stdout is the answer.
use super::TextGenerator;
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

pub struct CommandGenerator {
    program: PathBuf,
    args: Vec<String>,
    label: String,
}

impl CommandGenerator {
    /// Parse `command` with shell quoting rules and resolve its program.
    pub fn new(command: &str) -> Result<Self> {
        let mut args =
            shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;
        if args.is_empty() {
            return Err(anyhow!("LM command is empty"));
        }
        let name = args.remove(0);
        let program =
            which::which(&name).with_context(|| format!("resolve LM command {name}"))?;
        Ok(Self {
            program,
            args,
            label: command.to_string(),
        })
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn LM command: {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .context("write prompt to LM stdin")?;
        }

        let output = child.wait_with_output().context("wait for LM command")?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            elapsed_ms,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm invoke complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let text = String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")?;
        Ok(text.trim().to_string())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_command() {
        let err = CommandGenerator::new("   ").err().expect("empty command");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_unknown_program() {
        assert!(CommandGenerator::new("faqgen-no-such-program --flag").is_err());
    }

    #[test]
    fn echoes_prompt_through_cat() {
        let Ok(generator) = CommandGenerator::new("cat") else {
            return;
        };
        let text = generator.generate("  What is it?\n").expect("run cat");
        assert_eq!(text, "What is it?");
        assert_eq!(generator.label(), "cat");
    }

    #[test]
    fn surfaces_non_zero_exit() {
        let Ok(generator) = CommandGenerator::new("sh -c 'cat >/dev/null; echo boom >&2; exit 3'")
        else {
            return;
        };
        let err = generator.generate("prompt").expect_err("failing command");
        assert!(format!("{err:#}").contains("boom"));
    }
}
