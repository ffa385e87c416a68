pub(crate) mod job;
pub(crate) mod metadata;
pub(crate) mod orchestrator;
