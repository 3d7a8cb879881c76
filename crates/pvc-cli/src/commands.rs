use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use pvc_diff::{ChunkKind, Comparison, DiffEngine};
use pvc_sdk::RepoConfig;
use pvc_types::Version;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        config,
        ..
    } = cli;
    let config = load_config(config.as_deref())?;
    match command {
        Command::Compare(args) => cmd_compare(args, &config, format),
        Command::NextVersion(args) => cmd_next_version(args, &config, format),
        Command::Config => cmd_config(&config, format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RepoConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            RepoConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(RepoConfig::default()),
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn cmd_compare(args: CompareArgs, config: &RepoConfig, format: OutputFormat) -> anyhow::Result<()> {
    let old = read_text(&args.old)?;
    let new = read_text(&args.new)?;
    let engine = match args.context {
        Some(words) => DiffEngine::new(words),
        None => config.diff_engine(),
    };
    let comparison = engine.compare(&old, &new);
    debug!(chunks = comparison.chunks.len(), "compared prompt files");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
        OutputFormat::Text => {
            println!("{}", render_chunks(&comparison));
            println!("{}", render_summary(&comparison));
        }
    }
    Ok(())
}

fn render_chunks(comparison: &Comparison) -> String {
    let mut out = String::new();
    let mut prev = None;
    for chunk in &comparison.chunks {
        if prev == Some(ChunkKind::Removed) && chunk.kind == ChunkKind::Added {
            out.push(' ');
        }
        let styled = match chunk.kind {
            ChunkKind::Unchanged => chunk.value.normal(),
            ChunkKind::Removed => chunk.value.red().strikethrough(),
            ChunkKind::Added => chunk.value.green().underline(),
        };
        out.push_str(&styled.to_string());
        prev = Some(chunk.kind);
    }
    out
}

fn render_summary(comparison: &Comparison) -> String {
    if comparison.is_identical() {
        return format!("{} No changes.", "✓".green());
    }
    format!(
        "{} {}, {}",
        "Δ".yellow().bold(),
        format!("+{} words", comparison.stats.words_added).green(),
        format!("-{} words", comparison.stats.words_removed).red()
    )
}

#[derive(Serialize)]
struct NextVersionOutput {
    latest: Option<Version>,
    next: Version,
}

fn cmd_next_version(
    args: NextVersionArgs,
    config: &RepoConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output = NextVersionOutput {
        latest: pvc_types::VersionAllocator::latest(&args.labels),
        next: config.allocator().next(&args.labels)?,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => match output.latest {
            Some(latest) => println!(
                "{} -> {}",
                latest.to_string().dimmed(),
                output.next.to_string().green().bold()
            ),
            None => println!("{}", output.next.to_string().green().bold()),
        },
    }
    Ok(())
}

fn cmd_config(config: &RepoConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();
        file
    }

    #[test]
    fn compare_files_text_and_json() {
        let old = write_file("You are a helpful assistant.");
        let new = write_file("You are a concise assistant.");
        for format in [OutputFormat::Text, OutputFormat::Json] {
            let args = CompareArgs {
                old: old.path().to_path_buf(),
                new: new.path().to_path_buf(),
                context: Some(1),
            };
            cmd_compare(args, &RepoConfig::default(), format).unwrap();
        }
    }

    #[test]
    fn compare_missing_file_fails() {
        let args = CompareArgs {
            old: PathBuf::from("/no/such/old.txt"),
            new: PathBuf::from("/no/such/new.txt"),
            context: None,
        };
        let err = cmd_compare(args, &RepoConfig::default(), OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("old.txt"));
    }

    #[test]
    fn rendering_keeps_words() {
        let cmp = pvc_diff::compare("keep this", "keep that");
        let text = render_chunks(&cmp);
        assert!(text.contains("this"));
        assert!(text.contains("that"));
        assert!(render_summary(&cmp).contains("+1 words"));
        assert!(render_summary(&pvc_diff::compare("same", "same")).contains("No changes"));
    }

    #[test]
    fn next_version_and_config_commands() {
        let args = NextVersionArgs {
            labels: vec!["v1.0.0".into(), "PROD".into(), "v2.0.0".into()],
        };
        cmd_next_version(args, &RepoConfig::default(), OutputFormat::Json).unwrap();

        let exhausted = NextVersionArgs {
            labels: vec![format!("v1.0.{}", u64::MAX)],
        };
        let err = cmd_next_version(exhausted, &RepoConfig::default(), OutputFormat::Text)
            .unwrap_err();
        assert!(err.to_string().contains("exhausted"));
        cmd_config(&RepoConfig::default(), OutputFormat::Text).unwrap();
    }

    #[test]
    fn config_file_is_loaded() {
        let file = write_file("[release]\ninitial_version = \"v0.0.1\"\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(
            config.allocator().next(Vec::<String>::new()).unwrap(),
            Version::new(0, 0, 1)
        );
        assert_eq!(load_config(None).unwrap(), RepoConfig::default());
        assert!(load_config(Some(Path::new("/no/such/pvc.toml"))).is_err());
    }
}
