//! Keyword tagging of movement notes.
//!
//! Rules are checked top to bottom against the lowercased text and the first
//! rule with a matching substring wins.

use crate::models::{MovementEntry, TopicCount};
use std::collections::BTreeMap;

pub const DEFAULT_TOPIC: &str = "other";

const RULES: &[(&str, &[&str])] = &[
    ("inter-agency", &["inter-agency", "interagency", "interinstitucional", "joint", "municipal"]),
    ("intelligence", &["intelligence", "inteligencia", "analysis", "análisis"]),
    ("training", &["training", "workshop", "capacitación", "capacitacion", "taller", "course"]),
    ("community", &["community", "comunidad", "neighbo", "school", "escuela", "civic", "cívic"]),
    ("commerce", &["commerce", "commercial", "comercio", "shop", "store", "market"]),
    ("traffic", &["traffic", "tránsito", "transito", "checkpoint", "vehicle", "vehículo"]),
    ("patrol", &["patrol", "patrullaje", "presence", "presencia", "night", "noctur"]),
    ("paperwork", &["letter", "oficio", "memo", "request", "report"]),
];

pub fn classify(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(topic, _)| *topic)
        .unwrap_or(DEFAULT_TOPIC)
}

/// Counts topics over entries that carry a note, most frequent first.
pub fn topic_counts(entries: &[MovementEntry]) -> Vec<TopicCount> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for entry in entries.iter().filter(|e| !e.note.trim().is_empty()) {
        *counts.entry(classify(&entry.note)).or_default() += 1;
    }

    let mut result: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, count)| TopicCount {
            topic: topic.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noted(note: &str) -> MovementEntry {
        MovementEntry {
            id: 1,
            goal_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            applied_delta: 1,
            requested_magnitude: 1,
            note: note.to_string(),
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        // "joint" and "patrol" both match; inter-agency is listed first.
        assert_eq!(classify("Joint night patrol with municipal police"), "inter-agency");
        assert_eq!(classify("Night PATROL downtown"), "patrol");
        assert_eq!(classify("Taller de seguridad comercial"), "training");
    }

    #[test]
    fn unmatched_text_is_other() {
        assert_eq!(classify("rain delayed everything"), DEFAULT_TOPIC);
        assert_eq!(classify(""), DEFAULT_TOPIC);
    }

    #[test]
    fn counts_skip_blank_notes_and_sort_by_frequency() {
        let entries = vec![
            noted("presence patrol"),
            noted("  "),
            noted("school talk"),
            noted("night patrol"),
            noted("checkpoint on route 2"),
        ];
        let counts = topic_counts(&entries);
        assert_eq!(
            counts,
            vec![
                TopicCount { topic: "patrol".into(), count: 2 },
                TopicCount { topic: "community".into(), count: 1 },
                TopicCount { topic: "traffic".into(), count: 1 },
            ]
        );
    }
}
