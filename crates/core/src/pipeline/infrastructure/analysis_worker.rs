use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::analysis::domain::analysis_client::AnalysisClient;
use crate::analysis::domain::analysis_error::AnalysisError;
use crate::analysis::domain::analysis_result::{AnalysisOutcome, Timed};
use crate::session::session_state::RequestTicket;
use crate::shared::captured_image::CapturedImage;

/// A finished exchange, tagged with the request it answers.
#[derive(Debug)]
pub struct WorkerMessage {
    pub ticket: RequestTicket,
    pub result: Result<Timed<AnalysisOutcome>, AnalysisError>,
}

/// Runs one analysis on its own thread and reports through `tx`.
///
/// The worker holds its own handle on the image, so a newer capture never
/// disturbs it. If the receiving side is gone the result is dropped.
pub fn spawn(
    client: Arc<dyn AnalysisClient>,
    image: CapturedImage,
    ticket: RequestTicket,
    tx: Sender<WorkerMessage>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        log::debug!(
            "Worker started: {} on generation {}",
            ticket.task,
            ticket.generation
        );
        let result = client.analyze(&image, ticket.task);
        if tx.send(WorkerMessage { ticket, result }).is_err() {
            log::debug!("Session gone, dropping {} result", ticket.task);
        }
    })
}
