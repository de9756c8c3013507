use crate::Result;

/// Common interface of a runnable server
///
/// Implemented by [`crate::http::InspectServer`]; lets callers start a server
/// and stop it later without knowing its concrete type.
pub trait InspectServerTrait {
    /// Starts the server and serves connections until shut down
    async fn run(&self) -> Result<()>;

    /// Returns a shutdown signal sender that can be used to gracefully shutdown the server
    fn shutdown_signal(&self) -> tokio::sync::broadcast::Sender<()>;
}
