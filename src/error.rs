/// Errors of sink start-up.
///
/// Both are fatal for the caller: there is no way to run a sink without its drain task.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, thiserror::Error)]
pub enum Error {
    /// The platform failed to create the drain task.
    #[error("failed to create the drain task")]
    Spawn,
    /// The sink is already drained by another [`Drainer`](crate::Drainer).
    #[error("sink already has a drain loop")]
    DrainerTaken,
}
