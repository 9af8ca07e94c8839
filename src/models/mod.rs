pub mod binary_blob;
pub mod report_result;
pub mod task_record;

// Re-export core models for easy access
pub use binary_blob::{BinaryBlob, ResultFormat, TASK_RESULTS_BLOB_NAME};
pub use report_result::{NewReportResult, ReportResult};
pub use task_record::{
    DeleteOutcome, DeleteRefusal, NewTaskRecord, PurgeFilter, TaskRecord, WaitOptions,
};
