use super::AdvisorId;
use crate::error::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MajorId(pub String);

impl From<&str> for MajorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub major_id: MajorId,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitteeRole {
    Main,
    Second,
    Third,
}

impl CommitteeRole {
    /// Roles in the order they get filled.
    pub const ALL: [CommitteeRole; 3] = [Self::Main, Self::Second, Self::Third];
}

impl fmt::Display for CommitteeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Main => "main",
            Self::Second => "second",
            Self::Third => "third",
        })
    }
}

impl FromStr for CommitteeRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "second" => Ok(Self::Second),
            "third" => Ok(Self::Third),
            _ => Err(Error::UnknownRole(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Committee {
    pub main: Option<AdvisorId>,
    pub second: Option<AdvisorId>,
    pub third: Option<AdvisorId>,
}

impl Committee {
    pub fn get(&self, role: CommitteeRole) -> Option<&AdvisorId> {
        match role {
            CommitteeRole::Main => self.main.as_ref(),
            CommitteeRole::Second => self.second.as_ref(),
            CommitteeRole::Third => self.third.as_ref(),
        }
    }

    pub fn set(&mut self, role: CommitteeRole, advisor: Option<AdvisorId>) {
        let slot = match role {
            CommitteeRole::Main => &mut self.main,
            CommitteeRole::Second => &mut self.second,
            CommitteeRole::Third => &mut self.third,
        };
        *slot = advisor;
    }

    /// Role held by this advisor, if any.
    pub fn role_of(&self, advisor: &AdvisorId) -> Option<CommitteeRole> {
        CommitteeRole::ALL
            .into_iter()
            .find(|&r| self.get(r) == Some(advisor))
    }

    pub fn members(&self) -> impl Iterator<Item = (CommitteeRole, &AdvisorId)> {
        CommitteeRole::ALL
            .into_iter()
            .filter_map(|r| self.get(r).map(|a| (r, a)))
    }

    pub fn is_complete(&self) -> bool {
        CommitteeRole::ALL.into_iter().all(|r| self.get(r).is_some())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A `(date, time, room)` triple. Every field may be missing on its own.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct DefenseSlot {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub room: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScheduleState {
    Unscheduled,
    PartiallyScheduled,
    FullyScheduled,
}

impl DefenseSlot {
    pub fn new(date: NaiveDate, time: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            time: Some(time.into()),
            room: Some(room.into()),
        }
    }

    pub fn state(&self) -> ScheduleState {
        match [
            self.date.is_some(),
            self.time.is_some(),
            self.room.is_some(),
        ]
        .into_iter()
        .filter(|&b| b)
        .count()
        {
            0 => ScheduleState::Unscheduled,
            3 => ScheduleState::FullyScheduled,
            _ => ScheduleState::PartiallyScheduled,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == ScheduleState::FullyScheduled
    }

    /// The booked triple, only when every field is set.
    pub fn booking(&self) -> Option<(NaiveDate, &str, &str)> {
        Some((self.date?, self.time.as_deref()?, self.room.as_deref()?))
    }
}

impl fmt::Display for DefenseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date.map(|d| d.to_string());
        write!(
            f,
            "{} {} {}",
            date.as_deref().unwrap_or("-"),
            self.time.as_deref().unwrap_or("-"),
            self.room.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub main_advisor: Option<f64>,
    pub main_committee: Option<f64>,
    pub second_committee: Option<f64>,
    pub third_committee: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub students: Vec<Student>,
    /// Name of the supervising (primary) advisor.
    pub advisor_name: String,
    #[serde(default)]
    pub committee: Committee,
    #[serde(default)]
    pub defense: DefenseSlot,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub final_grade: Option<String>,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        advisor_name: impl Into<String>,
    ) -> Self {
        Self {
            id: ProjectId(id.into()),
            title: title.into(),
            students: Vec::new(),
            advisor_name: advisor_name.into(),
            committee: Committee::default(),
            defense: DefenseSlot::default(),
            scores: Scores::default(),
            final_grade: None,
        }
    }

    pub fn majors(&self) -> impl Iterator<Item = &MajorId> {
        self.students.iter().map(|s| &s.major_id)
    }

    /// A project can be graded once its defense is dated and its committee
    /// is complete.
    pub fn is_scoreable(&self) -> bool {
        self.defense.date.is_some() && self.committee.is_complete()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_state() {
        let mut slot = DefenseSlot::default();
        assert_eq!(slot.state(), ScheduleState::Unscheduled);
        assert_eq!(slot.booking(), None);
        slot.date = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(slot.state(), ScheduleState::PartiallyScheduled);
        slot.room = Some("R1".into());
        assert_eq!(slot.state(), ScheduleState::PartiallyScheduled);
        assert_eq!(slot.booking(), None);
        slot.time = Some("09:00".into());
        assert_eq!(slot.state(), ScheduleState::FullyScheduled);
        assert_eq!(
            slot.booking(),
            Some((NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), "09:00", "R1"))
        );
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("main".parse::<CommitteeRole>().unwrap(), CommitteeRole::Main);
        assert_eq!(" Third".parse::<CommitteeRole>().unwrap(), CommitteeRole::Third);
        assert!("fourth".parse::<CommitteeRole>().is_err());
        for role in CommitteeRole::ALL {
            assert_eq!(role.to_string().parse::<CommitteeRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_committee_roles() {
        let mut c = Committee::default();
        let a = AdvisorId::from("A1");
        c.set(CommitteeRole::Second, Some(a.clone()));
        assert_eq!(c.role_of(&a), Some(CommitteeRole::Second));
        assert_eq!(c.members().count(), 1);
        assert!(!c.is_complete());
        c.set(CommitteeRole::Main, Some("A2".into()));
        c.set(CommitteeRole::Third, Some("A3".into()));
        assert!(c.is_complete());
        c.set(CommitteeRole::Second, None);
        assert_eq!(c.role_of(&a), None);
        c.clear();
        assert_eq!(c, Committee::default());
    }

    #[test]
    fn test_scoreable() {
        let mut p = Project::new("P-001", "Compiler", "Dr. Lee");
        assert!(!p.is_scoreable());
        for (r, a) in CommitteeRole::ALL.into_iter().zip(["A1", "A2", "A3"]) {
            p.committee.set(r, Some(a.into()));
        }
        assert!(!p.is_scoreable());
        p.defense.date = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert!(p.is_scoreable());
    }
}
