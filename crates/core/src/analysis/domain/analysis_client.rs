use crate::analysis::domain::analysis_error::AnalysisError;
use crate::analysis::domain::analysis_result::{AnalysisOutcome, Timed};
use crate::analysis::domain::analysis_task::AnalysisTask;
use crate::shared::captured_image::CapturedImage;

/// Domain interface to the remote analysis service.
///
/// One call is one request/response exchange: at most one attempt, no
/// retry. Implementations are shared across worker threads.
pub trait AnalysisClient: Send + Sync {
    fn analyze(
        &self,
        image: &CapturedImage,
        task: AnalysisTask,
    ) -> Result<Timed<AnalysisOutcome>, AnalysisError>;
}
