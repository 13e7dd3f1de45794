use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The structured assessment returned by every review endpoint.
///
/// Deserialization is strict: model output missing any of these keys, or
/// carrying the wrong value kind, is rejected and replaced by
/// [`ReviewResult::fallback`] as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub ats_score: i64,
    pub missing_keywords: Vec<String>,
    pub improved_bullets: Vec<String>,
    pub positioning_summary: String,
    pub short_cover_letter: String,
    pub notes: Vec<String>,
}

impl ReviewResult {
    /// The fixed, schema-valid answer used by the mock backend and whenever
    /// the model cannot produce a trustworthy result.
    pub fn fallback() -> Self {
        Self {
            ats_score: 84,
            missing_keywords: vec!["Kotlin".into(), "RxJava".into(), "ATS".into()],
            improved_bullets: vec![
                "Boosted Android cold-start by 42% via lazy-loading and Retrofit caching.".into(),
                "Designed 6 REST endpoints (FastAPI) serving 15k DAU; cut P95 latency 35% using async IO and caching.".into(),
                "Optimized PostgreSQL ETL: 2 days→2 hours via bulk ops + index tuning.".into(),
            ],
            positioning_summary:
                "Android/Backend engineer focused on performance; collaborative across teams."
                    .into(),
            short_cover_letter: "Dear Hiring Team, I’m excited to apply for ...".into(),
            notes: vec![
                "Align with JD keywords".into(),
                "Quantify outcomes".into(),
                "Keep bullets ≤ 2 lines".into(),
            ],
        }
    }

    /// The fallback object with `note` appended to its notes.
    pub fn fallback_with_note(note: impl Into<String>) -> Self {
        let mut result = Self::fallback();
        result.notes.push(note.into());
        result
    }
}

/// Body of `POST /api/review`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub resume_text: String,
    pub job_description: String,
    #[serde(default)]
    pub target_role: Option<String>,
}

/// Body of `POST /api/refine`. `prior` is the previous result, passed back
/// to the model verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct RefineRequest {
    pub prior: Map<String, Value>,
    pub user_feedback: String,
    pub resume_text: String,
    pub job_description: String,
    #[serde(default)]
    pub target_role: Option<String>,
}

/// Body returned by `POST /api/parse_resume`.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedResume {
    pub text: String,
}

/// Body returned by `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub ok: bool,
    pub provider: String,
    pub model: String,
}
