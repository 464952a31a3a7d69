use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use parlor_composer::{ComposerConfig, ShortcodeTable, UploadPolicy};
use parlor_logging::{FileConfig, LogConfig, RotationStrategy};

#[derive(Debug, Parser)]
#[command(
    name = "parlor-replay",
    about = "Replay a scripted composer session and print the result as JSON"
)]
pub struct Cli {
    /// Session script, one JSON step per line (`-` reads stdin)
    #[arg(long)]
    pub script: PathBuf,

    /// Composer configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial upload policy (JSON)
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Shortcode table (JSON object of name → glyph), merged over the built-in one
    #[arg(long)]
    pub shortcodes: Option<PathBuf>,

    /// Room id
    #[arg(long, default_value = "GENERAL")]
    pub rid: String,

    /// Thread id
    #[arg(long)]
    pub tmid: Option<String>,

    /// Human-readable logs and report
    #[arg(long)]
    pub pretty: bool,

    /// Also write JSONL logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        let mut config = if self.pretty {
            LogConfig::development()
        } else {
            LogConfig::default()
        };
        config.default_level = self.log_level.clone();
        config.file = self.log_file.as_deref().map(file_config);
        config
    }

    pub fn composer_config(&self) -> anyhow::Result<ComposerConfig> {
        match &self.config {
            Some(path) => ComposerConfig::from_file(path)
                .with_context(|| format!("loading composer config {}", path.display())),
            None => Ok(ComposerConfig::default()),
        }
    }

    pub fn upload_policy(&self) -> anyhow::Result<UploadPolicy> {
        match &self.policy {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading policy {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("parsing policy {}", path.display()))
            }
            None => Ok(UploadPolicy::default()),
        }
    }

    pub fn shortcode_table(&self) -> anyhow::Result<ShortcodeTable> {
        let mut table = ShortcodeTable::builtin();
        if let Some(path) = &self.shortcodes {
            let extra = ShortcodeTable::from_file(path)
                .with_context(|| format!("loading shortcodes {}", path.display()))?;
            table.merge(extra);
        }
        Ok(table)
    }

    pub fn read_script(&self) -> anyhow::Result<String> {
        if self.script == Path::new("-") {
            return std::io::read_to_string(std::io::stdin()).context("reading script from stdin");
        }
        std::fs::read_to_string(&self.script)
            .with_context(|| format!("reading script {}", self.script.display()))
    }
}

/// `logs/session.jsonl` → directory `logs`, file `session.log`, truncated per run
fn file_config(path: &Path) -> FileConfig {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let prefix = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "parlor".to_string());
    FileConfig {
        directory,
        prefix,
        rotation: RotationStrategy::Never,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("parlor-replay").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--script", "session.jsonl"]);
        assert_eq!(cli.rid, "GENERAL");
        assert!(cli.tmid.is_none());
        assert!(!cli.pretty);

        let log = cli.log_config();
        assert!(!log.console.pretty);
        assert!(log.file.is_none());
        assert_eq!(log.default_level, "info");
    }

    #[test]
    fn test_pretty_and_log_file() {
        let cli = parse(&[
            "--script",
            "-",
            "--pretty",
            "--log-file",
            "logs/session.jsonl",
            "--log-level",
            "debug",
        ]);
        let log = cli.log_config();
        assert!(log.console.pretty);
        assert_eq!(log.default_level, "debug");

        let file = log.file.unwrap();
        assert_eq!(file.directory, PathBuf::from("logs"));
        assert_eq!(file.prefix, "session");
        assert_eq!(file.rotation, RotationStrategy::Never);
    }

    #[test]
    fn test_bare_log_file_uses_current_dir() {
        let file = file_config(Path::new("replay.jsonl"));
        assert_eq!(file.directory, PathBuf::from("."));
        assert_eq!(file.prefix, "replay");
    }

    #[test]
    fn test_missing_optional_files_use_defaults() {
        let cli = parse(&["--script", "session.jsonl"]);
        assert_eq!(cli.composer_config().unwrap(), ComposerConfig::default());
        assert_eq!(cli.upload_policy().unwrap(), UploadPolicy::default());
        assert!(!cli.shortcode_table().unwrap().is_empty());
    }

    #[test]
    fn test_policy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(
            &path,
            r#"{"allow_list":["image/*"],"max_file_size_bytes":1024}"#,
        )
        .unwrap();

        let cli = parse(&["--script", "s.jsonl", "--policy", path.to_str().unwrap()]);
        let policy = cli.upload_policy().unwrap();
        assert_eq!(policy.allow_list, vec!["image/*".to_string()]);
        assert_eq!(policy.max_file_size_bytes, Some(1024));
        assert!(policy.permission_to_upload_file);
    }
}
