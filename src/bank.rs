// src/bank.rs

//! Quiz configuration and question bank over the durable store. The bank
//! does not validate payloads; that is the request layer's job.

use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use crate::models::question::{Question, QuestionPayload};
use crate::models::quiz_config::QuizConfig;
use crate::store::{self, CONFIG_KEY, KeyValueStore};

/// Loads the configuration, materializing and persisting the default on
/// first access (or when the stored record is unreadable).
pub fn get_config(store: &dyn KeyValueStore) -> QuizConfig {
    match store::read_json(store, CONFIG_KEY) {
        Some(config) => config,
        None => {
            let config = QuizConfig::default_config();
            store::write_json(store, CONFIG_KEY, &config);
            config
        }
    }
}

/// Full overwrite of the singleton record.
pub fn save_config(store: &dyn KeyValueStore, config: &QuizConfig) {
    store::write_json(store, CONFIG_KEY, config);
}

pub fn is_available(store: &dyn KeyValueStore) -> bool {
    get_config(store).is_available_at(Utc::now())
}

fn normalized_correct_set(payload: &QuestionPayload) -> Vec<usize> {
    payload
        .correct_answers
        .iter()
        .copied()
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .collect()
}

/// Appends a new question with a fresh id and returns it.
pub fn add_question(store: &dyn KeyValueStore, payload: &QuestionPayload) -> Question {
    let question = Question {
        id: Uuid::new_v4().to_string(),
        prompt: payload.prompt.clone(),
        options: payload.options.clone(),
        correct_answers: normalized_correct_set(payload),
        category: payload
            .category
            .clone()
            .unwrap_or_else(|| "Personal".to_string()),
    };

    let mut config = get_config(store);
    config.questions.push(question.clone());
    save_config(store, &config);
    question
}

/// Replaces the question's content in place, keeping its id and position.
/// Returns false (and writes nothing) when the id is unknown.
pub fn update_question(store: &dyn KeyValueStore, id: &str, payload: &QuestionPayload) -> bool {
    let mut config = get_config(store);
    let Some(slot) = config.questions.iter_mut().find(|q| q.id == id) else {
        return false;
    };

    slot.prompt = payload.prompt.clone();
    slot.options = payload.options.clone();
    slot.correct_answers = normalized_correct_set(payload);
    if let Some(category) = &payload.category {
        slot.category = category.clone();
    }

    save_config(store, &config);
    true
}

/// Removes the question. Returns false (and writes nothing) when absent.
pub fn delete_question(store: &dyn KeyValueStore, id: &str) -> bool {
    let mut config = get_config(store);
    let before = config.questions.len();
    config.questions.retain(|q| q.id != id);
    if config.questions.len() == before {
        return false;
    }
    save_config(store, &config);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use chrono::Duration;

    fn payload(prompt: &str) -> QuestionPayload {
        QuestionPayload {
            prompt: prompt.to_string(),
            options: vec!["Yes".to_string(), "No".to_string()],
            correct_answers: vec![0],
            category: None,
        }
    }

    #[test]
    fn first_access_materializes_and_persists_the_default() {
        let store = MemoryStore::new();
        let config = get_config(&store);
        assert!(config.is_active);
        assert_eq!(config.title, "CRUFTYs Games");
        assert!(config.questions.is_empty());

        // The default is now durable, not re-derived.
        assert!(store.get(CONFIG_KEY).is_some());
    }

    #[test]
    fn config_round_trips_through_the_file_store_with_dates_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let mut config = QuizConfig::default_config();
        config.title = "Round trip".to_string();
        config.start_date = Utc::now() - Duration::days(1);
        config.end_date = Utc::now() + Duration::days(1);
        config.questions.push(Question {
            id: "fixed".to_string(),
            prompt: "Survives serialization?".to_string(),
            options: vec!["yes".to_string(), "no".to_string()],
            correct_answers: vec![0],
            category: "Personal".to_string(),
        });
        save_config(&store, &config);

        let loaded = get_config(&store);
        assert_eq!(loaded.title, config.title);
        // Instants compare equal regardless of string representation.
        assert_eq!(loaded.start_date, config.start_date);
        assert_eq!(loaded.end_date, config.end_date);
        assert_eq!(loaded.questions.len(), 1);
        assert_eq!(loaded.questions[0].id, "fixed");
    }

    #[test]
    fn add_update_delete_question() {
        let store = MemoryStore::new();

        let added = add_question(&store, &payload("First"));
        assert_eq!(added.category, "Personal");
        assert_eq!(get_config(&store).questions.len(), 1);

        let mut edit = payload("Edited");
        edit.correct_answers = vec![1, 1, 0];
        assert!(update_question(&store, &added.id, &edit));
        let stored = get_config(&store).questions[0].clone();
        assert_eq!(stored.id, added.id);
        assert_eq!(stored.prompt, "Edited");
        // De-duplicated and sorted.
        assert_eq!(stored.correct_answers, vec![0, 1]);

        assert!(!update_question(&store, "unknown", &edit));
        assert!(!delete_question(&store, "unknown"));
        assert!(delete_question(&store, &added.id));
        assert!(get_config(&store).questions.is_empty());
    }
}
