//! `mg list` command implementation.

use mg_directives::{DirectiveEngine, EngineConfig, HandlerRegistry};

use crate::error::CliError;
use crate::output::Output;

/// Execute the list command.
pub(crate) fn execute() -> Result<(), CliError> {
    let output = Output::new();
    let engine = DirectiveEngine::with_builtins(EngineConfig::default())?;

    let mut rows = table(engine.registry()).into_iter();
    if let Some(header) = rows.next() {
        output.header(&header);
    }
    for row in rows {
        output.line(&row);
    }
    output.info("::ai is resolved before the directive pass (see [ai] in margin.toml)");
    Ok(())
}

/// Header plus one row per registration, in execution order.
fn table(registry: &HandlerRegistry) -> Vec<String> {
    let width = registry
        .entries()
        .map(|r| r.name().len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    std::iter::once(format!("{:<width$}  {:<6}  PRIORITY", "NAME", "KIND"))
        .chain(registry.sorted().into_iter().map(|r| {
            format!(
                "{:<width$}  {:<6}  {}",
                r.name(),
                r.kind().to_string(),
                r.priority()
            )
        }))
        .collect()
}
