// Prompt constants and the prompt builder for review and refine calls.
// Everything here is pure: same inputs, same prompt.

/// System prompt shared by every call. Pins the persona and the exact key set.
pub const REVIEW_SYSTEM: &str = "You are a Senior Tech Recruiter and ATS evaluator at a global tech company. \
    Return STRICT JSON only with keys: ats_score, missing_keywords, improved_bullets, \
    positioning_summary, short_cover_letter, notes. No prose outside JSON.";

/// Worked bullet rewrites plus one complete example object.
pub const FEW_SHOT: &str = r#"Bullet Transform Examples:
OLD: Improved app performance.
NEW: Boosted Android cold-start by 42% via lazy-loading and Retrofit caching.

OLD: Worked on backend APIs.
NEW: Designed 6 REST endpoints (FastAPI) serving 15k DAU; cut P95 latency 35% using async IO and caching.

OLD: Helped migrate database.
NEW: Led PostgreSQL migration (v12→v14) with zero-downtime; reduced ETL 2 days→2 hours via bulk ops + index tuning.

JSON Example:
{
  "ats_score": 82,
  "missing_keywords": ["Kotlin", "RxJava"],
  "improved_bullets": ["Scaled search throughput 10x ..."],
  "positioning_summary": "...",
  "short_cover_letter": "...",
  "notes": ["..."]
}"#;

/// Placeholder used when no target role is given.
const NO_ROLE: &str = "N/A";

/// Which user prompt to build.
#[derive(Debug, Clone, Copy)]
pub enum PromptMode<'a> {
    /// First evaluation of a resume against a JD.
    Review,
    /// Revision of an earlier result. `prior_json` is embedded as-is.
    Refine {
        feedback: &'a str,
        prior_json: &'a str,
    },
}

/// The three parts sent to a provider.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: &'static str,
    pub few_shot: &'static str,
    pub user: String,
}

/// Builds the prompt for `mode`. Inputs are passed through verbatim; nothing
/// is validated or truncated.
pub fn build_prompt(
    resume_text: &str,
    job_description: &str,
    target_role: Option<&str>,
    mode: PromptMode<'_>,
) -> Prompt {
    let role = target_role
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(NO_ROLE);

    let user = match mode {
        PromptMode::Review => format!(
            "Task: Evaluate RESUME vs JD and return STRICT JSON per schema. \
             Improve 3–6 bullets with quantified outcomes.\n\
             Target role: {role}\n\n\
             JD:\n```text\n{job_description}\n```\n\n\
             RESUME:\n```text\n{resume_text}\n```\n\n\
             Requirements:\n\
             - Follow the System Prompt and Few-shot above.\n\
             - Do NOT output anything except the JSON object."
        ),
        PromptMode::Refine {
            feedback,
            prior_json,
        } => format!(
            "You will refine the prior JSON output based on user feedback. \
             Keep the same JSON schema and constraints.\n\
             Target role: {role}\n\n\
             User feedback:\n```text\n{feedback}\n```\n\n\
             Prior Output JSON:\n```json\n{prior_json}\n```\n\n\
             JD:\n```text\n{job_description}\n```\n\n\
             RESUME:\n```text\n{resume_text}\n```\n\n\
             Return STRICT JSON only (same keys)."
        ),
    };

    Prompt {
        system: REVIEW_SYSTEM,
        few_shot: FEW_SHOT,
        user,
    }
}
