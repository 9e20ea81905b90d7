use super::*;
use crate::error::Error;
use std::collections::HashMap;

/// In-memory snapshot of every advisor and project the engine works on.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    pub advisors: Vec<Advisor>,
    pub projects: Vec<Project>,
}

impl Roster {
    pub fn new(advisors: Vec<Advisor>, projects: Vec<Project>) -> Roster {
        Roster { advisors, projects }
    }

    pub fn advisor(&self, id: &AdvisorId) -> Option<&Advisor> {
        self.advisors.iter().find(|a| &a.id == id)
    }

    pub fn advisor_named(&self, name: &str) -> Option<&Advisor> {
        self.advisors.iter().find(|a| a.name == name)
    }

    pub fn require_advisor(&self, id: &AdvisorId) -> Result<&Advisor, Error> {
        self.advisor(id)
            .ok_or_else(|| Error::AdvisorNotFound(id.clone()))
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn require_project(&self, id: &ProjectId) -> Result<&Project, Error> {
        self.project(id)
            .ok_or_else(|| Error::ProjectNotFound(id.clone()))
    }

    pub fn require_project_mut(&mut self, id: &ProjectId) -> Result<&mut Project, Error> {
        self.projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.clone()))
    }

    /// Display name of an advisor, falling back to its id when it is not
    /// part of the roster.
    pub fn advisor_label(&self, id: &AdvisorId) -> String {
        self.advisor(id)
            .map_or_else(|| id.to_string(), |a| a.name.clone())
    }

    /// Indices into `projects`, ordered by ascending project id.
    pub fn project_order(&self) -> Vec<usize> {
        let mut order = (0..self.projects.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| self.projects[a].id.cmp(&self.projects[b].id));
        order
    }

    pub fn filter_projects<F>(&self, condition: F) -> Vec<&Project>
    where
        F: Fn(&Project) -> bool,
    {
        self.project_order()
            .into_iter()
            .map(|i| &self.projects[i])
            .filter(|p| condition(p))
            .collect()
    }

    pub fn committee_counts(&self) -> CommitteeCounts {
        CommitteeCounts::compute(self)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RoleCounts {
    pub supervising: u32,
    pub main: u32,
    pub second: u32,
    pub third: u32,
}

impl RoleCounts {
    pub fn get(&self, role: CommitteeRole) -> u32 {
        match role {
            CommitteeRole::Main => self.main,
            CommitteeRole::Second => self.second,
            CommitteeRole::Third => self.third,
        }
    }

    fn get_mut(&mut self, role: CommitteeRole) -> &mut u32 {
        match role {
            CommitteeRole::Main => &mut self.main,
            CommitteeRole::Second => &mut self.second,
            CommitteeRole::Third => &mut self.third,
        }
    }
}

/// Live assignment counts per advisor, derived from the projects.
///
/// Nothing is cached across calls: counts are recomputed from the roster
/// every time they are requested so they can never drift from the actual
/// assignments.
#[derive(Clone, Debug, Default)]
pub struct CommitteeCounts {
    counts: HashMap<AdvisorId, RoleCounts>,
}

impl CommitteeCounts {
    pub fn compute(roster: &Roster) -> CommitteeCounts {
        let mut counts = CommitteeCounts::default();
        for project in &roster.projects {
            if let Some(advisor) = roster.advisor_named(&project.advisor_name) {
                counts.entry(&advisor.id).supervising += 1;
            }
            for (role, advisor) in project.committee.members() {
                counts.increment(advisor, role);
            }
        }
        counts
    }

    fn entry(&mut self, advisor: &AdvisorId) -> &mut RoleCounts {
        self.counts.entry(advisor.clone()).or_default()
    }

    pub fn of(&self, advisor: &AdvisorId) -> RoleCounts {
        self.counts.get(advisor).copied().unwrap_or_default()
    }

    pub fn count(&self, advisor: &AdvisorId, role: CommitteeRole) -> u32 {
        self.of(advisor).get(role)
    }

    pub fn increment(&mut self, advisor: &AdvisorId, role: CommitteeRole) {
        *self.entry(advisor).get_mut(role) += 1;
    }
}
