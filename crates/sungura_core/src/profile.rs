//! crates/sungura_core/src/profile.rs
//!
//! The student's profile, onboarding progress and daily streak rules, plus the
//! `StudySession` that carries a profile through a client session.

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::LearningStyle;
use crate::ports::{PortError, ProfileStore};

/// Points awarded for each day a student shows up.
pub const DAILY_POINTS: u32 = 10;

/// Courses a student must pick before moving on to the learning-style quiz.
pub const MIN_COURSES: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Course name cannot be empty")]
    EmptyCourse,
    #[error("Course already exists: {0}")]
    DuplicateCourse(String),
    #[error("Profile store error: {0}")]
    Store(#[from] PortError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub university: Option<String>,
    pub courses: Vec<String>,
    pub learning_style: LearningStyle,
    pub onboarded: bool,
    pub streak: u32,
    pub points: u32,
    pub last_streak_date: Option<NaiveDate>,
}

/// The next screen of the onboarding flow a profile still has to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    University,
    Courses,
    LearningStyle,
    Done,
}

/// What a call to `register_activity` did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    Started,
    Extended,
    Reset,
    /// Already counted today.
    Unchanged,
    /// The date is older than the last recorded one.
    Ignored,
}

impl UserProfile {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            university: None,
            courses: Vec::new(),
            learning_style: LearningStyle::Standard,
            onboarded: false,
            streak: 0,
            points: 0,
            last_streak_date: None,
        }
    }

    pub fn onboarding_step(&self) -> OnboardingStep {
        if self.onboarded {
            OnboardingStep::Done
        } else if self.university.is_none() {
            OnboardingStep::University
        } else if self.courses.len() < MIN_COURSES {
            OnboardingStep::Courses
        } else {
            OnboardingStep::LearningStyle
        }
    }

    pub fn set_university(&mut self, university: impl Into<String>) {
        let university = university.into();
        let trimmed = university.trim();
        self.university = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Replaces the course list, trimming names and dropping blanks and repeats.
    pub fn set_courses<I, S>(&mut self, courses: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.courses.clear();
        for course in courses {
            let name = course.as_ref().trim();
            if !name.is_empty() && !self.courses.iter().any(|c| c == name) {
                self.courses.push(name.to_string());
            }
        }
    }

    pub fn add_course(&mut self, course: &str) -> Result<(), ProfileError> {
        let name = course.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyCourse);
        }
        if self.courses.iter().any(|c| c == name) {
            return Err(ProfileError::DuplicateCourse(name.to_string()));
        }
        self.courses.push(name.to_string());
        Ok(())
    }

    /// Returns whether the course was present.
    pub fn remove_course(&mut self, course: &str) -> bool {
        let before = self.courses.len();
        self.courses.retain(|c| c != course);
        self.courses.len() != before
    }

    pub fn complete_onboarding(&mut self, style: LearningStyle) {
        self.learning_style = style;
        self.onboarded = true;
    }

    /// Counts `today` towards the daily streak.
    pub fn register_activity(&mut self, today: NaiveDate) -> StreakChange {
        let change = match self.last_streak_date {
            None => StreakChange::Started,
            Some(last) => match (today - last).num_days() {
                d if d < 0 => return StreakChange::Ignored,
                0 => return StreakChange::Unchanged,
                1 => StreakChange::Extended,
                _ => StreakChange::Reset,
            },
        };

        self.streak = match change {
            StreakChange::Extended => self.streak.saturating_add(1),
            _ => 1,
        };
        self.points = self.points.saturating_add(DAILY_POINTS);
        self.last_streak_date = Some(today);
        change
    }
}

/// Picks the dominant style from quiz answers. Ties go to the latest tied style
/// in `LearningStyle::QUIZ_STYLES` order; no answers gives `Standard`.
pub fn score_quiz(answers: &[LearningStyle]) -> LearningStyle {
    let mut best = LearningStyle::Standard;
    let mut best_count = 0;
    for style in LearningStyle::QUIZ_STYLES {
        let count = answers.iter().filter(|a| **a == style).count();
        if count > 0 && count >= best_count {
            best = style;
            best_count = count;
        }
    }
    best
}

//=========================================================================================
// StudySession
//=========================================================================================

/// A signed-in student's profile, written through to a `ProfileStore` on every change.
pub struct StudySession {
    store: Arc<dyn ProfileStore>,
    profile: UserProfile,
}

impl StudySession {
    /// Resumes the stored profile for `user_id`, creating it on first sign-in.
    pub async fn start(
        store: Arc<dyn ProfileStore>,
        user_id: Uuid,
        name: &str,
    ) -> Result<Self, ProfileError> {
        let profile = match store.load(user_id).await? {
            Some(profile) => profile,
            None => {
                let profile = UserProfile::new(user_id, name);
                store.save(&profile).await?;
                profile
            }
        };
        Ok(Self { store, profile })
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Applies a change to the profile and persists it. The in-memory profile is
    /// left untouched if the change is rejected.
    pub async fn update<F>(&mut self, change: F) -> Result<(), ProfileError>
    where
        F: FnOnce(&mut UserProfile) -> Result<(), ProfileError>,
    {
        let mut next = self.profile.clone();
        change(&mut next)?;
        self.store.save(&next).await?;
        self.profile = next;
        Ok(())
    }

    pub async fn record_login(&mut self, today: NaiveDate) -> Result<StreakChange, ProfileError> {
        let mut next = self.profile.clone();
        let change = next.register_activity(today);
        if matches!(change, StreakChange::Unchanged | StreakChange::Ignored) {
            return Ok(change);
        }
        self.store.save(&next).await?;
        self.profile = next;
        Ok(change)
    }

    pub async fn sign_out(self) -> Result<(), ProfileError> {
        self.store.clear(self.profile.id).await?;
        Ok(())
    }
}
