// src/models/quiz_config.rs

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::question::{PublicQuestion, Question};

/// Singleton configuration record: availability window plus the question
/// bank. Read by every quiz-taking session, mutated by the administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub title: String,
    pub questions: Vec<Question>,
}

impl QuizConfig {
    /// The configuration materialized on first access.
    pub fn default_config() -> Self {
        Self {
            is_active: true,
            start_date: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
            title: "CRUFTYs Games".to_string(),
            questions: Vec::new(),
        }
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now >= self.start_date && now <= self.end_date
    }
}

/// DTO for the administrator's settings tab. The question list is managed
/// through its own endpoints and is left untouched by this update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// What a quiz taker sees: the answer key stays server-side.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub title: String,
    pub available: bool,
    pub questions: Vec<PublicQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn availability_needs_active_flag_and_window() {
        let mut config = QuizConfig::default_config();
        let now = Utc::now();
        config.start_date = now - Duration::hours(1);
        config.end_date = now + Duration::hours(1);
        assert!(config.is_available_at(now));

        config.is_active = false;
        assert!(!config.is_available_at(now));

        config.is_active = true;
        assert!(!config.is_available_at(now + Duration::hours(2)));
        assert!(!config.is_available_at(now - Duration::hours(2)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let config = QuizConfig::default_config();
        assert!(config.is_available_at(config.start_date));
        assert!(config.is_available_at(config.end_date));
    }
}
