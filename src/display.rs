use defense_planner::committee::Candidate;
use defense_planner::grading::{GradeBoundaries, final_score};
use defense_planner::model::*;

fn member(roster: &Roster, project: &Project, role: CommitteeRole) -> String {
    project
        .committee
        .get(role)
        .map_or_else(|| "-".to_owned(), |a| roster.advisor_label(a))
}

pub fn display_committees(roster: &Roster) {
    println!("Committees:");
    for p in roster.filter_projects(|_| true) {
        println!(
            "  - {} [{}]: main {}, second {}, third {}",
            p,
            p.advisor_name,
            member(roster, p, CommitteeRole::Main),
            member(roster, p, CommitteeRole::Second),
            member(roster, p, CommitteeRole::Third),
        );
    }
    println!();
}

pub fn display_schedule(roster: &Roster) {
    let mut projects = roster.filter_projects(|p| p.defense.is_complete());
    projects.sort_by_key(|p| {
        (
            p.defense.date,
            p.defense.time.clone(),
            p.defense.room.clone(),
        )
    });
    if !projects.is_empty() {
        println!("Defense schedule:");
        let mut current = None;
        for p in projects {
            if current != p.defense.date {
                current = p.defense.date;
                if let Some(date) = current {
                    println!("  {}:", date.format("%A %Y-%m-%d"));
                }
            }
            println!(
                "    - {} {}: {}",
                p.defense.time.as_deref().unwrap_or_default(),
                p.defense.room.as_deref().unwrap_or_default(),
                p
            );
        }
        println!();
    }
}

pub fn display_load(roster: &Roster) {
    let counts = roster.committee_counts();
    let mut advisors = roster.advisors.iter().collect::<Vec<_>>();
    advisors.sort_by_key(|a| a.name.clone());
    println!("Advisor load (assigned/quota): supervising, main, second, third");
    for a in advisors {
        let c = counts.of(&a.id);
        println!(
            "  - {}: {}/{}, {}/{}, {}/{}, {}/{}",
            a,
            c.supervising,
            a.quotas.supervising,
            c.main,
            a.quotas.main_committee,
            c.second,
            a.quotas.second_committee,
            c.third,
            a.quotas.third_committee,
        );
    }
    println!();
}

pub fn display_incomplete(roster: &Roster) {
    let missing = roster.filter_projects(|p| !p.committee.is_complete());
    if !missing.is_empty() {
        println!("Projects with an incomplete committee:");
        for p in missing {
            let roles = CommitteeRole::ALL
                .into_iter()
                .filter(|&r| p.committee.get(r).is_none())
                .map(|r| r.to_string())
                .collect::<Vec<_>>();
            println!("  - {} (missing {})", p, roles.join(", "));
        }
        println!();
    }
    let unscheduled = roster.filter_projects(|p| !p.defense.is_complete());
    if !unscheduled.is_empty() {
        println!("Projects without a complete defense slot:");
        for p in unscheduled {
            println!("  - {} ({:?}: {})", p, p.defense.state(), p.defense);
        }
        println!();
    }
}

pub fn display_candidates(project: &Project, role: CommitteeRole, candidates: &[Candidate]) {
    println!("Candidates for the {role} committee seat of {project}:");
    for c in candidates {
        let status = if c.can_assign() {
            "eligible".to_owned()
        } else {
            c.reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  {} {} ({}/{}): {}",
            if c.incumbent { "*" } else { "-" },
            c.advisor,
            c.current_count,
            c.quota,
            status
        );
    }
}

pub fn display_grades(
    roster: &Roster,
    grades: &[(ProjectId, Option<String>)],
    boundaries: &GradeBoundaries,
) {
    println!("Grades:");
    for (id, grade) in grades {
        if let Some(p) = roster.project(id) {
            let score = final_score(&p.scores);
            println!(
                "  - {}: {} ({})",
                p,
                score.map_or_else(|| "-".to_owned(), |s| format!("{s:.2}")),
                grade.clone().unwrap_or_else(|| boundaries.grade_for(score))
            );
        }
    }
    println!();
}
