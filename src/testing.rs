//! Fixtures shared by the unit tests.

use crate::model::*;
use chrono::NaiveDate;

pub fn quotas(n: u32) -> Quotas {
    Quotas {
        supervising: n,
        main_committee: n,
        second_committee: n,
        third_committee: n,
    }
}

pub fn advisor(id: &str, name: &str, n: u32, majors: &[&str]) -> Advisor {
    let mut a = Advisor::new(id, name, quotas(n));
    a.specialized_major_ids = majors.iter().map(|&m| MajorId::from(m)).collect();
    a
}

pub fn project(id: &str, advisor_name: &str, majors: &[&str]) -> Project {
    let mut p = Project::new(id, format!("Project {id}"), advisor_name);
    p.students = majors
        .iter()
        .enumerate()
        .map(|(i, &m)| Student {
            id: format!("{id}-S{i}"),
            name: format!("Student {i} of {id}"),
            major_id: MajorId::from(m),
        })
        .collect();
    p
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Five advisors and four projects, stored out of id order.
pub fn sample_roster() -> Roster {
    Roster::new(
        vec![
            advisor("A1", "Dr. Lee", 2, &[]),
            advisor("A2", "Dr. Kim", 2, &["CS"]),
            advisor("A3", "Dr. Park", 3, &["EE"]),
            advisor("A4", "Dr. Chen", 1, &[]),
            advisor("A5", "Dr. Nguyen", 2, &["CS", "EE"]),
        ],
        vec![
            project("P-003", "Dr. Kim", &["EE"]),
            project("P-001", "Dr. Lee", &["CS"]),
            project("P-004", "Dr. Park", &["CS", "EE"]),
            project("P-002", "Dr. Lee", &["CS"]),
        ],
    )
}

/// Every committee member and the primary advisor are pairwise distinct.
pub fn committee_is_distinct(roster: &Roster, p: &Project) -> bool {
    let mut ids = p.committee.members().map(|(_, a)| a.clone()).collect::<Vec<_>>();
    if let Some(main) = roster.advisor_named(&p.advisor_name) {
        ids.push(main.id.clone());
    }
    let n = ids.len();
    ids.sort();
    ids.dedup();
    ids.len() == n
}

/// Random rosters with arbitrary (possibly invalid) pre-existing committees.
pub fn roster_strategy() -> impl proptest::strategy::Strategy<Value = Roster> {
    use proptest::prelude::*;
    (1usize..7, 1usize..12)
        .prop_flat_map(|(na, np)| {
            let majors = || prop::sample::subsequence(vec!["CS", "EE"], 0..=2);
            (
                prop::collection::vec((0u32..4, majors()), na),
                prop::collection::vec(
                    (0..na, majors(), prop::collection::vec(prop::option::of(0..na), 3)),
                    np,
                ),
            )
        })
        .prop_map(|(advisors, projects)| {
            let advisors = advisors
                .into_iter()
                .enumerate()
                .map(|(i, (n, majors))| {
                    advisor(&format!("A{i}"), &format!("Advisor {i}"), n, &majors)
                })
                .collect::<Vec<_>>();
            let projects = projects
                .into_iter()
                .enumerate()
                .map(|(j, (main, majors, committee))| {
                    let mut p = project(&format!("P-{j:03}"), &advisors[main].name, &majors);
                    for (role, member) in CommitteeRole::ALL.into_iter().zip(committee) {
                        p.committee.set(role, member.map(|m| advisors[m].id.clone()));
                    }
                    p
                })
                .rev()
                .collect();
            Roster::new(advisors, projects)
        })
}
