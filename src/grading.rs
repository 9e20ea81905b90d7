use crate::model::*;

/// Grade given to a project whose scores are not all known.
pub const INCOMPLETE: &str = "Incomplete";

/// Grade used when no boundary is configured at all.
pub const DEFAULT_GRADE: &str = "F";

/// Advisor score plus the mean of the three committee scores, or `None` as
/// long as one of them is missing.
pub fn final_score(scores: &Scores) -> Option<f64> {
    let committee =
        (scores.main_committee? + scores.second_committee? + scores.third_committee?) / 3.0;
    Some(scores.main_advisor? + committee)
}

/// Grade boundaries, highest minimum score first.
#[derive(Clone, Debug, Default)]
pub struct GradeBoundaries(Vec<GradeBoundary>);

impl GradeBoundaries {
    /// Boundaries are sorted here since configuration order cannot be
    /// trusted. Entries sharing a minimum score keep their relative order.
    pub fn new(mut boundaries: Vec<GradeBoundary>) -> Self {
        boundaries.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
        Self(boundaries)
    }

    pub fn boundaries(&self) -> &[GradeBoundary] {
        &self.0
    }

    /// Grade of the first boundary whose minimum is reached. A score below
    /// every boundary gets the lowest configured grade.
    pub fn grade_for(&self, score: Option<f64>) -> String {
        let Some(score) = score else {
            return INCOMPLETE.to_owned();
        };
        self.0
            .iter()
            .find(|b| b.min_score <= score)
            .or_else(|| self.0.last())
            .map_or_else(|| DEFAULT_GRADE.to_owned(), |b| b.grade.clone())
    }
}

impl From<&ScoringSettings> for GradeBoundaries {
    fn from(settings: &ScoringSettings) -> Self {
        Self::new(settings.grade_boundaries.clone())
    }
}

/// Grade to store for a project, `None` while its score is incomplete.
pub fn grade_project(project: &Project, boundaries: &GradeBoundaries) -> Option<String> {
    final_score(&project.scores).map(|s| boundaries.grade_for(Some(s)))
}

/// Grades of every scoreable project, in project id order.
pub fn grade_all(
    roster: &Roster,
    boundaries: &GradeBoundaries,
) -> Vec<(ProjectId, Option<String>)> {
    roster
        .filter_projects(Project::is_scoreable)
        .into_iter()
        .map(|p| (p.id.clone(), grade_project(p, boundaries)))
        .collect()
}
