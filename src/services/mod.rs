pub mod dispatch;
pub mod job;

pub use dispatch::{
    ActionDispatcher, ActionRequest, CallbackDescriptor, QueueGateway, QueueSubmission,
};
pub use job::{CancelOutcome, JobGateway, NoJobs};
