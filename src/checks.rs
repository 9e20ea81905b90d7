use crate::model::*;
use std::collections::BTreeMap;
use tracing::warn;

/// Advisors holding a role on more projects than their quota allows, with
/// the number of projects concerned.
pub fn over_quota(roster: &Roster) -> Vec<(&Advisor, CommitteeRole, u32)> {
    let counts = roster.committee_counts();
    roster
        .advisors
        .iter()
        .flat_map(|a| {
            let counts = &counts;
            CommitteeRole::ALL.into_iter().filter_map(move |r| {
                let n = counts.count(&a.id, r);
                (n > a.quota(r)).then_some((a, r, n))
            })
        })
        .collect()
}

/// Projects where an advisor appears twice among the committee and the
/// primary advisor.
pub fn committee_conflicts(roster: &Roster) -> Vec<&Project> {
    roster.filter_projects(|p| {
        let mut members = p.committee.members().map(|(_, a)| a).collect::<Vec<_>>();
        let main = roster.advisor_named(&p.advisor_name).map(|a| &a.id);
        if members.iter().any(|&a| Some(a) == main) {
            return true;
        }
        let n = members.len();
        members.sort();
        members.dedup();
        members.len() != n
    })
}

/// Complete slots held by more than one project.
pub fn double_bookings(roster: &Roster) -> Vec<(DefenseSlot, Vec<&Project>)> {
    let mut slots: BTreeMap<_, Vec<&Project>> = BTreeMap::new();
    for p in roster.filter_projects(|p| p.defense.is_complete()) {
        if let Some(booking) = p.defense.booking() {
            slots.entry(booking).or_default().push(p);
        }
    }
    slots
        .into_iter()
        .filter(|(_, projects)| projects.len() > 1)
        .map(|((date, time, room), projects)| (DefenseSlot::new(date, time, room), projects))
        .collect()
}

/// Log every inconsistency found in the roster. Nothing is fixed: conflicts
/// introduced by manual edits are left for a human to resolve.
pub fn check_consistency(roster: &Roster) {
    for (advisor, role, n) in over_quota(roster) {
        warn!(
            "WARNING: {advisor} holds the {role} committee seat of {n} projects (quota {})",
            advisor.quota(role)
        );
    }
    for p in committee_conflicts(roster) {
        warn!("WARNING: project {p} has the same advisor in several positions");
    }
    for (slot, projects) in double_bookings(roster) {
        let ids = projects
            .iter()
            .map(|p| p.id.to_string())
            .collect::<Vec<_>>();
        warn!("WARNING: slot {slot} is booked by {}", ids.join(", "));
    }
}
