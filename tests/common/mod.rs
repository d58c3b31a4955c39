//! Shared test infrastructure for CLI integration tests.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn fixture(name: &str) -> PathBuf {
    manifest_dir().join("tests/fixtures").join(name)
}

/// The mock backend runs under `sh`; tests skip when it is unavailable.
pub fn skip_if_sh_missing() -> bool {
    let missing = which::which("sh").is_err();
    if missing {
        eprintln!("Skipping: sh not available");
    }
    missing
}

/// `--lm` value that runs tests/mock-lm.sh.
pub fn mock_lm() -> String {
    let script = manifest_dir().join("tests/mock-lm.sh").display().to_string();
    shell_words::join(["sh", script.as_str()])
}

/// Isolated scratch directory with its own config home.
pub struct Workspace {
    pub dir: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Write `value` as a product record and return its path.
    pub fn write_product(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, serde_json::to_vec_pretty(value).expect("serialize"))
            .expect("write product");
        path
    }

    /// A faqgen command that ignores the caller's config and LM environment.
    pub fn faqgen(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_faqgen"));
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("FAQGEN_LM_COMMAND")
            .env_remove("FAQGEN_COMPARISON_LM_COMMAND")
            .env_remove("MOCK_LM_FAIL_ON")
            .env_remove("MOCK_LM_ANSWER")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `faqgen run` over `product` and `competitor` with the mock backend.
    pub fn run(&self, product: &Path, competitor: &Path, extra: &[&str]) -> Output {
        self.run_with(product, competitor, extra, |_| {})
    }

    pub fn run_with(
        &self,
        product: &Path,
        competitor: &Path,
        extra: &[&str],
        configure: impl FnOnce(&mut Command),
    ) -> Output {
        let mut cmd = self.faqgen();
        cmd.arg("run")
            .arg("--product")
            .arg(product)
            .arg("--competitor")
            .arg(competitor)
            .arg("--out")
            .arg(self.out_dir())
            .arg("--lm")
            .arg(mock_lm())
            .args(extra);
        configure(&mut cmd);
        cmd.output().expect("run faqgen")
    }

    pub fn read_output(&self, name: &str) -> Value {
        let path = self.out_dir().join(name);
        let bytes = std::fs::read(&path)
            .unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
        serde_json::from_slice(&bytes).expect("parse output JSON")
    }
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
