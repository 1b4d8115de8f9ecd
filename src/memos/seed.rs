//! Sample memos inserted into an empty store

use crate::memos::store::truncate_micros;
use crate::memos::types::{MemoCategory, NewMemo};
use chrono::{DateTime, Duration, Utc};

struct Sample {
    title: &'static str,
    content: &'static str,
    category: MemoCategory,
    tags: &'static [&'static str],
    age_hours: i64,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Weekly team sync",
        content: "Reviewed sprint progress. The API migration is on track; \
                  the search page needs another design pass before Friday.",
        category: MemoCategory::Work,
        tags: &["meeting", "sprint", "api"],
        age_hours: 2,
    },
    Sample {
        title: "Weekend groceries",
        content: "Eggs, oat milk, spinach, coffee beans, and something for Sunday's barbecue.",
        category: MemoCategory::Personal,
        tags: &["shopping"],
        age_hours: 20,
    },
    Sample {
        title: "Rust ownership notes",
        content: "Each value has one owner; borrowing lets code read or mutate without \
                  taking ownership. Lifetimes describe how long references stay valid.",
        category: MemoCategory::Study,
        tags: &["rust", "ownership", "borrowing"],
        age_hours: 48,
    },
    Sample {
        title: "App idea: habit tracker",
        content: "A minimal habit tracker that nudges once a day and shows a streak \
                  calendar. Sync across devices later.",
        category: MemoCategory::Idea,
        tags: &["app", "habits"],
        age_hours: 72,
    },
    Sample {
        title: "Dentist appointment",
        content: "Thursday 10:30, bring the insurance card.",
        category: MemoCategory::Personal,
        tags: &["health"],
        age_hours: 96,
    },
    Sample {
        title: "Book list",
        content: "The Pragmatic Programmer, Designing Data-Intensive Applications, \
                  and Crafting Interpreters.",
        category: MemoCategory::Other,
        tags: &["books", "reading"],
        age_hours: 120,
    },
];

/// Build the sample memos with timestamps staggered back from `now`
pub fn sample_memos(now: DateTime<Utc>) -> Vec<NewMemo> {
    let now = truncate_micros(now);
    SAMPLES
        .iter()
        .map(|s| {
            let ts = now - Duration::hours(s.age_hours);
            NewMemo {
                id: uuid::Uuid::new_v4().to_string(),
                title: s.title.to_string(),
                content: s.content.to_string(),
                category: s.category,
                tags: s.tags.iter().map(|t| t.to_string()).collect(),
                created_at: ts,
                updated_at: ts,
            }
        })
        .collect()
}
