use thiserror::Error;

/// Turn-level error taxonomy.
///
/// Tool adapter failures are not represented here: they are recovered
/// locally by the controller and folded into the transcript as synthetic
/// tool results.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A reasoning-step call failed or timed out. Fatal for the turn;
    /// nothing is persisted.
    #[error("Reasoning step failed: {0}")]
    Reasoning(#[source] anyhow::Error),

    /// Conversation store failure (including NotFound on resume)
    #[error(transparent)]
    Store(#[from] scout_store::StoreError),
}
