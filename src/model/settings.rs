use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DefenseSettings {
    /// Configured as a comma-separated list such as `"08:00, 10:00"`.
    #[serde(default, deserialize_with = "deserialize_time_slots")]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub rooms: Vec<String>,
    #[serde(default, rename = "start_date")]
    pub start_defense_date: Option<NaiveDate>,
}

impl DefenseSettings {
    pub fn new(time_slots: &str, rooms: &[&str], start_defense_date: Option<NaiveDate>) -> Self {
        Self {
            time_slots: parse_time_slots(time_slots),
            rooms: rooms.iter().map(|&r| r.to_owned()).collect(),
            start_defense_date,
        }
    }

    /// Number of defenses that fit in a single day.
    pub fn slots_per_day(&self) -> usize {
        self.time_slots.len() * self.rooms.len()
    }
}

/// Split a comma-separated list of time slots, trimming entries and
/// dropping empty ones.
pub fn parse_time_slots(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn deserialize_time_slots<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_time_slots(&String::deserialize(deserializer)?))
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GradeBoundary {
    pub min_score: f64,
    pub grade: String,
}

impl GradeBoundary {
    pub fn new(min_score: f64, grade: impl Into<String>) -> Self {
        Self {
            min_score,
            grade: grade.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub grade_boundaries: Vec<GradeBoundary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_slots() {
        assert_eq!(
            parse_time_slots(" 08:00,10:00 ,, 14:00,"),
            vec!["08:00", "10:00", "14:00"]
        );
        assert!(parse_time_slots("").is_empty());
        assert!(parse_time_slots(" , ").is_empty());
    }

    #[test]
    fn test_deserialize_settings() {
        let settings: DefenseSettings = toml::from_str(
            r#"
            time_slots = "08:00, 10:00"
            rooms = ["A101", "B202"]
            start_date = "2024-06-01"
            "#,
        )
        .unwrap();
        assert_eq!(settings.time_slots, vec!["08:00", "10:00"]);
        assert_eq!(settings.slots_per_day(), 4);
        assert_eq!(settings.start_defense_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        let settings: DefenseSettings = toml::from_str("").unwrap();
        assert!(settings.time_slots.is_empty());
        assert_eq!(settings.start_defense_date, None);
    }
}
