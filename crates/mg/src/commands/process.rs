//! `mg process` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use mg_config::{CliSettings, Config};
use mg_directives::UnknownDirectivePolicy;
use pulldown_cmark::{Options, Parser};

use crate::error::CliError;
use crate::frontmatter::{Document, parse_document};
use crate::output::Output;
use crate::pipeline::{Pipeline, PipelineOutput};

/// Arguments for the process command.
#[derive(Args)]
pub(crate) struct ProcessArgs {
    /// Markdown file to process.
    file: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render the result to HTML.
    #[arg(long)]
    html: bool,

    /// Remove unprocessed directive lines (overrides config).
    #[arg(long)]
    strip_unknown: bool,

    /// Replace `::ai` directives with a disabled marker (overrides config).
    #[arg(long)]
    no_ai: bool,

    /// Path to configuration file (default: auto-discover margin.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ProcessArgs {
    /// Execute the process command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading, or writing fails.
    /// Directive problems are reported as warnings only.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            unknown: self.strip_unknown.then_some(UnknownDirectivePolicy::Strip),
            ai_enabled: self.no_ai.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let pipeline = Pipeline::from_config(&config)?;

        let text = std::fs::read_to_string(&self.file).map_err(|source| CliError::Read {
            path: self.file.clone(),
            source,
        })?;
        let document = parse_document(&text).map_err(|source| CliError::Frontmatter {
            path: self.file.clone(),
            source,
        })?;

        let runtime = tokio::runtime::Runtime::new()?;
        let result = runtime.block_on(pipeline.run(document.body, &document.page_data));

        report(&output, &self.file, &result);
        let rendered = render(&document, &result.processed.content, self.html);

        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => std::io::stdout().lock().write_all(rendered.as_bytes())?,
        }
        Ok(())
    }
}

fn report(output: &Output, file: &std::path::Path, result: &PipelineOutput) {
    let resolution = &result.resolution;
    if resolution.failed > 0 {
        output.warning(&format!(
            "{}: {} AI directive(s) failed",
            file.display(),
            resolution.failed
        ));
    }
    for diagnostic in &result.processed.diagnostics {
        output.warning(&format!("{}: {diagnostic}", file.display()));
    }
}

/// Final document text: Markdown with its frontmatter, or an HTML body.
fn render(document: &Document<'_>, content: &str, html: bool) -> String {
    if !html {
        return format!("{}{content}", document.frontmatter);
    }
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let mut out = String::with_capacity(content.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut out, Parser::new_ext(content, options));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_markdown_keeps_frontmatter() {
        let document = parse_document("---\ntitle: X\n---\n::divider\n").unwrap();
        let out = render(&document, "<hr class=\"divider\">\n", false);
        assert_eq!(out, "---\ntitle: X\n---\n<hr class=\"divider\">\n");
    }

    #[test]
    fn test_render_html_drops_frontmatter() {
        let document = parse_document("---\ntitle: X\n---\n# Hi\n").unwrap();
        let out = render(&document, "# Hi\n\n<div class=\"card\">\n\n**bold**\n\n</div>\n", true);
        assert!(out.starts_with("<h1>Hi</h1>"));
        assert!(out.contains("<div class=\"card\">"));
        assert!(out.contains("<strong>bold</strong>"));
        assert!(!out.contains("title: X"));
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("margin.toml");
        std::fs::write(&config, "[directives]\nunknown = \"warn\"\n").unwrap();
        let input = dir.path().join("page.md");
        std::fs::write(
            &input,
            "---\nshow: true\n---\n::if show\nVisible\n::end\n::ai Tagline\n::mystery\n",
        )
        .unwrap();
        let out_path = dir.path().join("page.out.md");

        let args = ProcessArgs {
            file: input,
            output: Some(out_path.clone()),
            html: false,
            strip_unknown: true,
            no_ai: true,
            config: Some(config),
        };
        args.execute().unwrap();

        let written = std::fs::read_to_string(out_path).unwrap();
        assert!(written.starts_with("---\nshow: true\n---\n"));
        assert!(written.contains("Visible"));
        assert!(written.contains("[AI disabled]"));
        assert!(!written.contains("::mystery"));
    }

    #[test]
    fn test_execute_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("margin.toml");
        std::fs::write(&config, "").unwrap();
        let args = ProcessArgs {
            file: dir.path().join("missing.md"),
            output: None,
            html: false,
            strip_unknown: false,
            no_ai: true,
            config: Some(config),
        };
        let err = args.execute().unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
        assert!(err.to_string().contains("missing.md"));
    }
}
