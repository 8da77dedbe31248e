//! `mg check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mg_config::Config;
use mg_directives::scan::splice;
use mg_directives::{Diagnostic, DirectiveEngine};
use rayon::prelude::*;

use crate::error::CliError;
use crate::frontmatter::parse_document;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markdown files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover margin.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any file has problems.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let engine = DirectiveEngine::with_builtins(config.directives.engine_config())?;

        let results: Vec<_> = self
            .files
            .par_iter()
            .map(|path| (path, check_file(&engine, path)))
            .collect();

        let mut failing = 0;
        for (path, result) in &results {
            match result {
                Ok(diagnostics) if diagnostics.is_empty() => {
                    tracing::debug!(path = %path.display(), "No directive problems");
                }
                Ok(diagnostics) => {
                    failing += 1;
                    for diagnostic in diagnostics {
                        output.warning(&format!("{}: {diagnostic}", path.display()));
                    }
                }
                Err(e) => {
                    failing += 1;
                    output.error(&e.to_string());
                }
            }
        }

        if failing > 0 {
            return Err(CliError::Check(format!(
                "{failing} of {} file(s) have directive problems",
                results.len()
            )));
        }
        output.success(&format!("Checked {} file(s), no problems found", results.len()));
        Ok(())
    }
}

/// Run the synchronous engine over one file and collect its diagnostics.
///
/// `::ai` spans belong to the AI pass. They are blanked to the same number of
/// lines so reported line numbers still match the body.
fn check_file(engine: &DirectiveEngine, path: &Path) -> Result<Vec<Diagnostic>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&text).map_err(|source| CliError::Frontmatter {
        path: path.to_path_buf(),
        source,
    })?;

    let body = blank_ai_spans(engine, document.body);
    Ok(engine.process(&body, &document.page_data).diagnostics)
}

fn blank_ai_spans(engine: &DirectiveEngine, body: &str) -> String {
    let replacements: Vec<_> = mg_ai::find_ai_directives(body, engine.config().line_rules())
        .into_iter()
        .map(|directive| {
            let newlines = body[directive.span.clone()].matches('\n').count();
            (directive.span, "\n".repeat(newlines))
        })
        .collect();
    splice(body, &replacements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_directives::EngineConfig;
    use pretty_assertions::assert_eq;

    fn engine() -> DirectiveEngine {
        DirectiveEngine::with_builtins(EngineConfig::default()).unwrap()
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_clean_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "ok.md", "::columns\nA\n---\nB\n::end\n");
        assert_eq!(check_file(&engine(), &path).unwrap(), Vec::new());
    }

    #[test]
    fn test_ai_lines_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "ai.md", "::ai Write a tagline\ntext\n");
        assert!(check_file(&engine(), &path).unwrap().is_empty());
    }

    #[test]
    fn test_ai_block_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "ai.md", "::ai model=x\nWrite an intro\n::end\n");
        assert_eq!(check_file(&engine(), &path).unwrap(), Vec::new());
    }

    #[test]
    fn test_lines_kept_after_ai_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "ai.md", "::ai\nWrite\nan intro\n::end\n::nope\n");
        let diagnostics = check_file(&engine(), &path).unwrap();
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Unprocessed {
                name: "nope".to_owned(),
                lines: vec![5],
            }]
        );
    }

    #[test]
    fn test_blank_ai_spans() {
        let body = "a\n::ai\nprompt\n::end\nb\n::ai inline\nc";
        assert_eq!(blank_ai_spans(&engine(), body), "a\n\n\n\nb\n\nc");
    }

    #[test]
    fn test_unknown_and_unterminated_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.md", "::colums 2\nA\n::end\n");
        let diagnostics = check_file(&engine(), &path).unwrap();
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::Unprocessed {
                    name: "colums".to_owned(),
                    lines: vec![1],
                },
                Diagnostic::Unprocessed {
                    name: "end".to_owned(),
                    lines: vec![3],
                },
            ]
        );
    }

    #[test]
    fn test_lines_counted_from_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "fm.md", "---\ntitle: X\n---\n::nope\n");
        let diagnostics = check_file(&engine(), &path).unwrap();
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Unprocessed {
                name: "nope".to_owned(),
                lines: vec![1],
            }]
        );
    }

    #[test]
    fn test_execute_fails_with_problems() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "margin.toml", "");
        let good = write(dir.path(), "good.md", "text\n");
        let bad = write(dir.path(), "bad.md", "::unknown\n");

        let args = CheckArgs {
            files: vec![good.clone()],
            config: Some(config.clone()),
        };
        assert!(args.execute().is_ok());

        let args = CheckArgs {
            files: vec![good, bad],
            config: Some(config),
        };
        let err = args.execute().unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 file(s) have directive problems");
    }
}
