//! Background story fetching
//!
//! Runs provider requests on tokio tasks and hands the results back to the UI
//! loop over a channel, so the terminal stays responsive (and further category
//! selections can be made) while a request is in flight.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::data::{FetchError, StoryProvider, StorySummary};
use crate::feed::FetchTicket;

/// A finished fetch, tagged with the ticket it was started for
#[derive(Debug)]
pub struct FetchMessage {
    pub ticket: FetchTicket,
    pub result: Result<Vec<StorySummary>, FetchError>,
}

/// Spawns fetch tasks and collects their results
pub struct FetchHandle {
    receiver: mpsc::Receiver<FetchMessage>,
    sender: mpsc::Sender<FetchMessage>,
}

impl FetchHandle {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self { receiver, sender }
    }

    /// Starts fetching the ticket's category on a background task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P>(&self, provider: Arc<P>, ticket: FetchTicket) -> JoinHandle<()>
    where
        P: StoryProvider + 'static,
    {
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let result = provider.fetch_top_stories(ticket.category()).await;
            debug!(
                category = %ticket.category(),
                generation = ticket.generation(),
                ok = result.is_ok(),
                "Fetch finished"
            );
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(FetchMessage { ticket, result }).await;
        })
    }

    /// Waits for the next finished fetch
    pub async fn recv(&mut self) -> Option<FetchMessage> {
        self.receiver.recv().await
    }

    /// Returns a finished fetch without blocking, if one is waiting
    pub fn try_recv(&mut self) -> Option<FetchMessage> {
        self.receiver.try_recv().ok()
    }
}

impl Default for FetchHandle {
    fn default() -> Self {
        Self::new()
    }
}
