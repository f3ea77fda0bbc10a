use super::context::Context;
use async_trait::async_trait;

/// A message handler.
///
/// Only [`handle`](Command::handle) is required. Errors and panics are
/// logged under [`name`](Command::name) and never stop the pipeline.
#[async_trait]
pub trait Command: Send + Sync {
    async fn handle(&self, ctx: &Context) -> anyhow::Result<()>;

    /// Called once when the command is registered.
    fn setup(&mut self) {}

    /// One-line help text, shown by the help command.
    fn describe(&self) -> Option<String> {
        None
    }

    /// Name used in logs. Defaults to the type name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}
