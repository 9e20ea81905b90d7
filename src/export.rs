use crate::grading::final_score;
use crate::model::*;
use serde::Serialize;
use std::io;

#[derive(Debug, Serialize)]
struct ScheduleRecord<'a> {
    project: &'a str,
    title: &'a str,
    students: String,
    advisor: &'a str,
    main_committee: Option<String>,
    second_committee: Option<String>,
    third_committee: Option<String>,
    date: Option<String>,
    time: Option<&'a str>,
    room: Option<&'a str>,
    final_score: Option<f64>,
    final_grade: Option<&'a str>,
}

/// Write one CSV line per project, ordered by defense date, time and room,
/// with unscheduled projects last.
pub fn write_schedule<W: io::Write>(roster: &Roster, writer: W) -> Result<(), csv::Error> {
    let mut projects = roster.filter_projects(|_| true);
    projects.sort_by_key(|p| {
        (
            p.defense.date.is_none(),
            p.defense.date,
            p.defense.time.clone(),
            p.defense.room.clone(),
        )
    });
    let mut wtr = csv::Writer::from_writer(writer);
    for p in projects {
        let member = |role| p.committee.get(role).map(|a| roster.advisor_label(a));
        wtr.serialize(ScheduleRecord {
            project: &p.id.0,
            title: &p.title,
            students: p
                .students
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            advisor: &p.advisor_name,
            main_committee: member(CommitteeRole::Main),
            second_committee: member(CommitteeRole::Second),
            third_committee: member(CommitteeRole::Third),
            date: p.defense.date.map(|d| d.to_string()),
            time: p.defense.time.as_deref(),
            room: p.defense.room.as_deref(),
            final_score: final_score(&p.scores),
            final_grade: p.final_grade.as_deref(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
