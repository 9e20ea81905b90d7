pub use self::advisor::{Advisor, AdvisorId, Quotas};
pub use self::project::{
    Committee, CommitteeRole, DefenseSlot, MajorId, Project, ProjectId, ScheduleState, Scores,
    Student,
};
pub use self::roster::{CommitteeCounts, RoleCounts, Roster};
pub use self::settings::{DefenseSettings, GradeBoundary, ScoringSettings, parse_time_slots};

mod advisor;
mod project;
mod roster;
mod settings;
