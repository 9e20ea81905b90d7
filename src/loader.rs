#![allow(clippy::cast_sign_loss)]

use chrono::NaiveDate;
use defense_planner::model::*;
use eyre::{Result, WrapErr};
use sqlx::any::{AnyConnectOptions, AnyRow};
use sqlx::{AnyConnection, Connection, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, trace};

/// Database-backed roster: reads advisors and projects, writes back
/// committees, defense slots and grades.
///
/// Expected tables:
///
/// - `advisors(id, name, supervising_quota, main_committee_quota,
///   second_committee_quota, third_committee_quota)`
/// - `advisor_majors(advisor_id, major_id)`
/// - `projects(id, title, advisor_name, main_committee_id,
///   second_committee_id, third_committee_id, defense_date, defense_time,
///   defense_room, main_advisor_score, main_committee_score,
///   second_committee_score, third_committee_score, final_grade)`
/// - `students(id, name, major_id, project_id)`
///
/// Dates are stored as `YYYY-MM-DD` text.
pub struct Loader {
    conn: AnyConnection,
}

fn committee_column(role: CommitteeRole) -> &'static str {
    match role {
        CommitteeRole::Main => "main_committee_id",
        CommitteeRole::Second => "second_committee_id",
        CommitteeRole::Third => "third_committee_id",
    }
}

fn parse_date(date: Option<String>) -> Result<Option<NaiveDate>, sqlx::Error> {
    date.map(|d| NaiveDate::from_str(d.trim()))
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl Loader {
    pub async fn new(s: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();
        Ok(Self {
            conn: AnyConnection::connect_with(&AnyConnectOptions::from_str(s)?)
                .await
                .wrap_err("cannot connect to database")?,
        })
    }

    pub async fn load(&mut self) -> Result<Roster> {
        let mut advisors = self.load_advisors().await.wrap_err("cannot load advisors")?;
        let majors = self
            .load_advisor_majors()
            .await
            .wrap_err("cannot load advisor specializations")?;
        for advisor in &mut advisors {
            advisor.specialized_major_ids = majors
                .iter()
                .filter(|(a, _)| *a == advisor.id)
                .map(|(_, m)| m.clone())
                .collect();
        }
        let mut projects = self.load_projects().await.wrap_err("cannot load projects")?;
        let mut students = self.load_students().await.wrap_err("cannot load students")?;
        for project in &mut projects {
            if let Some(students) = students.remove(&project.id) {
                project.students = students;
            }
            trace!(project = %project, students = project.students.len(), "loaded project");
        }
        for (project, students) in students {
            debug!(%project, count = students.len(), "students attached to unknown project");
        }
        debug!(
            advisors = advisors.len(),
            projects = projects.len(),
            "roster loaded"
        );
        Ok(Roster::new(advisors, projects))
    }

    async fn load_advisors(&mut self) -> Result<Vec<Advisor>, sqlx::Error> {
        sqlx::query(
            "SELECT id, name, supervising_quota, main_committee_quota, \
             second_committee_quota, third_committee_quota FROM advisors",
        )
        .try_map(|row: AnyRow| {
            Ok(Advisor::new(
                row.try_get::<String, _>("id")?,
                row.try_get::<String, _>("name")?,
                Quotas {
                    supervising: row.try_get::<i32, _>("supervising_quota")? as u32,
                    main_committee: row.try_get::<i32, _>("main_committee_quota")? as u32,
                    second_committee: row.try_get::<i32, _>("second_committee_quota")? as u32,
                    third_committee: row.try_get::<i32, _>("third_committee_quota")? as u32,
                },
            ))
        })
        .fetch_all(&mut self.conn)
        .await
    }

    async fn load_advisor_majors(&mut self) -> Result<Vec<(AdvisorId, MajorId)>, sqlx::Error> {
        sqlx::query("SELECT advisor_id, major_id FROM advisor_majors")
            .try_map(|row: AnyRow| {
                Ok((
                    AdvisorId(row.try_get("advisor_id")?),
                    MajorId(row.try_get("major_id")?),
                ))
            })
            .fetch_all(&mut self.conn)
            .await
    }

    async fn load_projects(&mut self) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query(
            "SELECT id, title, advisor_name, main_committee_id, second_committee_id, \
             third_committee_id, defense_date, defense_time, defense_room, \
             main_advisor_score, main_committee_score, second_committee_score, \
             third_committee_score, final_grade FROM projects",
        )
        .try_map(|row: AnyRow| {
            let advisor = |column: &str| {
                row.try_get::<Option<String>, _>(column)
                    .map(|a| a.map(AdvisorId))
            };
            let mut project = Project::new(
                row.try_get::<String, _>("id")?,
                row.try_get::<String, _>("title")?,
                row.try_get::<String, _>("advisor_name")?,
            );
            project.committee = Committee {
                main: advisor("main_committee_id")?,
                second: advisor("second_committee_id")?,
                third: advisor("third_committee_id")?,
            };
            project.defense = DefenseSlot {
                date: parse_date(row.try_get("defense_date")?)?,
                time: row.try_get("defense_time")?,
                room: row.try_get("defense_room")?,
            };
            project.scores = Scores {
                main_advisor: row.try_get("main_advisor_score")?,
                main_committee: row.try_get("main_committee_score")?,
                second_committee: row.try_get("second_committee_score")?,
                third_committee: row.try_get("third_committee_score")?,
            };
            project.final_grade = row.try_get("final_grade")?;
            Ok(project)
        })
        .fetch_all(&mut self.conn)
        .await
    }

    async fn load_students(&mut self) -> Result<HashMap<ProjectId, Vec<Student>>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, name, major_id, project_id FROM students ORDER BY id")
            .try_map(|row: AnyRow| {
                Ok((
                    ProjectId(row.try_get("project_id")?),
                    Student {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        major_id: MajorId(row.try_get("major_id")?),
                    },
                ))
            })
            .fetch_all(&mut self.conn)
            .await?;
        let mut students: HashMap<ProjectId, Vec<Student>> = HashMap::new();
        for (project, student) in rows {
            students.entry(project).or_default().push(student);
        }
        Ok(students)
    }

    pub async fn update_project_committee(
        &mut self,
        project: &ProjectId,
        role: CommitteeRole,
        advisor: Option<&AdvisorId>,
    ) -> Result<()> {
        let mut trans = self.conn.begin().await?;
        sqlx::query(&format!(
            "UPDATE projects SET {}=? WHERE id=?",
            committee_column(role)
        ))
        .bind(advisor.map(|a| a.0.clone()))
        .bind(project.0.clone())
        .execute(&mut *trans)
        .await
        .wrap_err("cannot save committee member")?;
        trans
            .commit()
            .await
            .wrap_err("error when committing transaction")
    }

    /// Store the committee of every given project in a single transaction.
    pub async fn bulk_update_committees(&mut self, projects: &[&Project]) -> Result<()> {
        let mut trans = self.conn.begin().await?;
        for p in projects {
            sqlx::query(
                "UPDATE projects SET main_committee_id=?, second_committee_id=?, \
                 third_committee_id=? WHERE id=?",
            )
            .bind(p.committee.main.as_ref().map(|a| a.0.clone()))
            .bind(p.committee.second.as_ref().map(|a| a.0.clone()))
            .bind(p.committee.third.as_ref().map(|a| a.0.clone()))
            .bind(p.id.0.clone())
            .execute(&mut *trans)
            .await
            .wrap_err("cannot save committees")?;
        }
        trans
            .commit()
            .await
            .wrap_err("error when committing transaction")
    }

    pub async fn update_project_defense_schedule(
        &mut self,
        project: &ProjectId,
        slot: &DefenseSlot,
    ) -> Result<()> {
        self.bulk_update_schedules(&[(project.clone(), slot.clone())])
            .await
    }

    /// Store every given defense slot in a single transaction.
    pub async fn bulk_update_schedules(
        &mut self,
        schedules: &[(ProjectId, DefenseSlot)],
    ) -> Result<()> {
        let mut trans = self.conn.begin().await?;
        for (project, slot) in schedules {
            sqlx::query(
                "UPDATE projects SET defense_date=?, defense_time=?, defense_room=? WHERE id=?",
            )
            .bind(slot.date.map(|d| d.to_string()))
            .bind(slot.time.clone())
            .bind(slot.room.clone())
            .bind(project.0.clone())
            .execute(&mut *trans)
            .await
            .wrap_err("cannot save defense schedule")?;
        }
        trans
            .commit()
            .await
            .wrap_err("error when committing transaction")
    }

    pub async fn clear_all_schedules_and_committees(&mut self) -> Result<()> {
        let mut trans = self.conn.begin().await?;
        sqlx::query(
            "UPDATE projects SET main_committee_id=NULL, second_committee_id=NULL, \
             third_committee_id=NULL, defense_date=NULL, defense_time=NULL, defense_room=NULL",
        )
        .execute(&mut *trans)
        .await
        .wrap_err("cannot clear schedules and committees")?;
        trans
            .commit()
            .await
            .wrap_err("error when committing transaction")
    }

    pub async fn update_project_grade(
        &mut self,
        project: &ProjectId,
        grade: Option<&str>,
    ) -> Result<()> {
        self.update_project_grades(&[(project.clone(), grade.map(String::from))])
            .await
    }

    pub async fn update_project_grades(
        &mut self,
        grades: &[(ProjectId, Option<String>)],
    ) -> Result<()> {
        let mut trans = self.conn.begin().await?;
        for (project, grade) in grades {
            sqlx::query("UPDATE projects SET final_grade=? WHERE id=?")
                .bind(grade.clone())
                .bind(project.0.clone())
                .execute(&mut *trans)
                .await
                .wrap_err("cannot save grade")?;
        }
        trans
            .commit()
            .await
            .wrap_err("error when committing transaction")
    }
}
