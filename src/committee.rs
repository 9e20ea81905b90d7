use crate::error::Error;
use crate::model::*;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, instrument, trace};

/// Why an advisor cannot be newly assigned to a committee slot.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Ineligibility {
    NotSpecialized,
    QuotaFull,
    AlreadyAssigned,
    IsMainAdvisor,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSpecialized => "not specialized",
            Self::QuotaFull => "quota full",
            Self::AlreadyAssigned => "already assigned",
            Self::IsMainAdvisor => "is main advisor",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub advisor: &'a Advisor,
    /// Live number of projects where the advisor holds the role.
    pub current_count: u32,
    pub quota: u32,
    pub reasons: BTreeSet<Ineligibility>,
    /// The advisor already holds this exact slot.
    pub incumbent: bool,
}

impl Candidate<'_> {
    /// The advisor may be put into the slot.
    pub fn can_assign(&self) -> bool {
        self.reasons.is_empty()
    }

    /// The advisor may stay in the slot, which is always the case for the
    /// incumbent so that it can be shown and cleared.
    pub fn can_remain(&self) -> bool {
        self.incumbent || self.can_assign()
    }
}

/// List every advisor of the roster, ordered by id, along with its
/// eligibility for `role` on `project`.
pub fn eligible_advisors<'a>(
    roster: &'a Roster,
    project: &Project,
    role: CommitteeRole,
) -> Vec<Candidate<'a>> {
    candidates(roster, project, role, &roster.committee_counts())
}

fn candidates<'a>(
    roster: &'a Roster,
    project: &Project,
    role: CommitteeRole,
    counts: &CommitteeCounts,
) -> Vec<Candidate<'a>> {
    let mut advisors = roster.advisors.iter().collect::<Vec<_>>();
    advisors.sort_by(|a, b| a.id.cmp(&b.id));
    advisors
        .into_iter()
        .map(|advisor| {
            let incumbent = project.committee.get(role) == Some(&advisor.id);
            let current_count = counts.count(&advisor.id, role);
            let quota = advisor.quota(role);
            let mut reasons = BTreeSet::new();
            if !incumbent && !advisor.is_specialized_for(project.majors()) {
                reasons.insert(Ineligibility::NotSpecialized);
            }
            // The incumbent's own slot does not count against its quota.
            let others = if incumbent {
                current_count.saturating_sub(1)
            } else {
                current_count
            };
            if others >= quota {
                reasons.insert(Ineligibility::QuotaFull);
            }
            if project
                .committee
                .role_of(&advisor.id)
                .is_some_and(|r| r != role)
            {
                reasons.insert(Ineligibility::AlreadyAssigned);
            }
            if advisor.name == project.advisor_name {
                reasons.insert(Ineligibility::IsMainAdvisor);
            }
            Candidate {
                advisor,
                current_count,
                quota,
                reasons,
                incumbent,
            }
        })
        .collect()
}

/// Set or clear (with `None`) a committee slot. Only the existence of the
/// project and advisor is checked.
pub fn assign_committee<'a>(
    roster: &'a mut Roster,
    project: &ProjectId,
    role: CommitteeRole,
    advisor: Option<&AdvisorId>,
) -> Result<&'a Project, Error> {
    if let Some(advisor) = advisor {
        roster.require_advisor(advisor)?;
    }
    let p = roster.require_project_mut(project)?;
    debug!(project = %p.id, %role, advisor = ?advisor, "setting committee member");
    p.committee.set(role, advisor.cloned());
    Ok(&*p)
}

/// Fill every empty committee slot greedily, projects in id order and roles
/// in main, second, third order, picking the eligible advisor with the
/// fewest assignments for the role (lowest id first on ties). Return the
/// number of slots filled.
#[instrument(skip_all)]
pub fn auto_assign(roster: &mut Roster) -> usize {
    let mut counts = roster.committee_counts();
    let mut filled = 0;
    for idx in roster.project_order() {
        for role in CommitteeRole::ALL {
            let project = &roster.projects[idx];
            if project.committee.get(role).is_some() {
                continue;
            }
            let choice = candidates(roster, project, role, &counts)
                .into_iter()
                .filter(|c| c.can_assign())
                .min_by(|a, b| {
                    (a.current_count, &a.advisor.id).cmp(&(b.current_count, &b.advisor.id))
                })
                .map(|c| c.advisor.id.clone());
            match choice {
                Some(advisor) => {
                    trace!(
                        project = %project.id,
                        %role,
                        advisor = %roster.advisor_label(&advisor),
                        "assigning committee member"
                    );
                    counts.increment(&advisor, role);
                    roster.projects[idx].committee.set(role, Some(advisor));
                    filled += 1;
                }
                None => debug!(project = %project.id, %role, "no eligible advisor"),
            }
        }
    }
    info!("{filled} committee slots assigned");
    filled
}
