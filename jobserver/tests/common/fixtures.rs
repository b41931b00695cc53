//! Test fixtures for jobserver integration tests

use serde_json::{json, Value};
use shared::Document;

pub const BACKEND_JOB_ID: &str = "65a1b2c3d4e5f60718293a01";
pub const SYSTEMS_JOB_ID: &str = "65a1b2c3d4e5f60718293a02";
pub const RECRUITER_JOB_ID: &str = "65a1b2c3d4e5f60718293a03";
pub const NUMERIC_SKILLS_JOB_ID: &str = "65a1b2c3d4e5f60718293a04";

pub fn document(value: Value) -> Document {
    match value {
        Value::Object(document) => document,
        other => panic!("fixture is not an object: {other}"),
    }
}

/// Job collection covering duplicate tokens, a missing field and a numeric field
pub fn create_test_jobs() -> Vec<Document> {
    vec![
        document(json!({
            "_id": BACKEND_JOB_ID,
            "job_title": "Backend Engineer",
            "job_skills": "Go, Python, Go",
            "search_country": "United States"
        })),
        document(json!({
            "_id": SYSTEMS_JOB_ID,
            "job_title": "Systems Engineer",
            "job_skills": "Python, Rust",
            "search_country": "Canada"
        })),
        document(json!({
            "_id": RECRUITER_JOB_ID,
            "job_title": "Recruiter",
            "search_country": "Canada"
        })),
        document(json!({
            "_id": NUMERIC_SKILLS_JOB_ID,
            "job_title": "Data Entry",
            "job_skills": 17,
            "search_country": "Mexico"
        })),
    ]
}

/// Projected documents as a `job_skills` cursor would yield them
pub fn create_projected_skill_documents() -> Vec<Document> {
    vec![
        document(json!({"_id": BACKEND_JOB_ID, "job_skills": "Go, Python, Go"})),
        document(json!({"_id": SYSTEMS_JOB_ID, "job_skills": "Python, Rust"})),
    ]
}

pub fn expected_skills() -> Vec<String> {
    vec!["Go".to_string(), "Python".to_string(), "Rust".to_string()]
}

pub fn expected_countries() -> Vec<String> {
    vec!["Canada".to_string(), "Mexico".to_string(), "United States".to_string()]
}
