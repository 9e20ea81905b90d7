use crate::model::{AdvisorId, ProjectId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),
    #[error("advisor {0} not found")]
    AdvisorNotFound(AdvisorId),
    #[error("unknown committee role {0:?}, expected main, second or third")]
    UnknownRole(String),
}
