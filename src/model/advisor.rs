use super::{CommitteeRole, MajorId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisorId(pub String);

impl fmt::Display for AdvisorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AdvisorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Maximum number of projects an advisor may hold in each position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Quotas {
    pub supervising: u32,
    pub main_committee: u32,
    pub second_committee: u32,
    pub third_committee: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Advisor {
    pub id: AdvisorId,
    pub name: String,
    pub quotas: Quotas,
    /// Majors this advisor may examine. Empty means every major.
    #[serde(default)]
    pub specialized_major_ids: BTreeSet<MajorId>,
}

impl Advisor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quotas: Quotas) -> Self {
        Self {
            id: AdvisorId(id.into()),
            name: name.into(),
            quotas,
            specialized_major_ids: BTreeSet::new(),
        }
    }

    pub fn quota(&self, role: CommitteeRole) -> u32 {
        match role {
            CommitteeRole::Main => self.quotas.main_committee,
            CommitteeRole::Second => self.quotas.second_committee,
            CommitteeRole::Third => self.quotas.third_committee,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.specialized_major_ids.is_empty()
    }

    /// An advisor is specialized for a set of majors when it is unrestricted
    /// or covers every one of them.
    pub fn is_specialized_for<'a>(&self, mut majors: impl Iterator<Item = &'a MajorId>) -> bool {
        self.is_unrestricted() || majors.all(|m| self.specialized_major_ids.contains(m))
    }
}

impl fmt::Display for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[test]
fn test_specialization() {
    let mut a = Advisor::new("A1", "Dr. Lee", Quotas::default());
    let cs = MajorId::from("CS");
    let ee = MajorId::from("EE");
    assert!(a.is_specialized_for([&cs, &ee].into_iter()));
    a.specialized_major_ids.insert(cs.clone());
    assert!(a.is_specialized_for([&cs].into_iter()));
    assert!(!a.is_specialized_for([&cs, &ee].into_iter()));
    assert!(a.is_specialized_for(std::iter::empty()));
}
