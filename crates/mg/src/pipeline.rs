//! Two-phase document pipeline.
//!
//! The AI pass runs to completion on the body first; the synchronous
//! directive pass then rewrites its output.

use mg_ai::{
    AiResolver, ConfiguredService, DisabledService, HttpCompletionService, Resolution,
};
use mg_config::Config;
use mg_directives::{DirectiveEngine, PageData, Processed};

use crate::error::CliError;

/// Result of running both passes over one document body.
#[derive(Debug)]
pub(crate) struct PipelineOutput {
    pub(crate) resolution: Resolution,
    pub(crate) processed: Processed,
}

/// AI resolver and directive engine built from one configuration.
#[derive(Debug)]
pub(crate) struct Pipeline {
    engine: DirectiveEngine,
    resolver: AiResolver<ConfiguredService>,
}

impl Pipeline {
    /// Build the pipeline with the built-in directives.
    pub(crate) fn from_config(config: &Config) -> Result<Self, CliError> {
        let engine_config = config.directives.engine_config();
        let rules = engine_config.line_rules();
        let engine = DirectiveEngine::with_builtins(engine_config)?;

        let service = if config.ai.enabled {
            tracing::info!(endpoint = %config.ai.endpoint, model = %config.ai.model, "AI resolution enabled");
            ConfiguredService::Http(HttpCompletionService::new(
                &config.ai.endpoint,
                config.ai.api_key().map(str::to_owned),
                config.ai.model.clone(),
                config.ai.timeout(),
            ))
        } else {
            ConfiguredService::Disabled(DisabledService)
        };
        let resolver = AiResolver::new(service)
            .with_timeout(config.ai.timeout())
            .with_line_rules(rules);

        Ok(Self { engine, resolver })
    }

    /// Resolve `::ai` directives, then run the directive engine.
    pub(crate) async fn run(&self, body: &str, page_data: &PageData) -> PipelineOutput {
        let resolution = self.resolver.resolve(body).await;
        let processed = self.engine.process(&resolution.content, page_data);
        PipelineOutput {
            resolution,
            processed,
        }
    }
}
