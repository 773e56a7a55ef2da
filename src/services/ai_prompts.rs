//! Fixed instruction template for résumé analysis.
//!
//! Output is a pure function of its inputs: no timestamps, ids or sampling
//! live in here, so identical inputs produce byte-identical prompts.

use crate::models::analysis::Recommendation;

pub const SYSTEM_PROMPT: &str =
    "You are an expert recruiter. Always respond with valid JSON only.";

const SCHEMA_TEMPLATE: &str = r#"{
    "match_score": <integer 0-100>,
    "name": "<candidate name>",
    "email": "<email if found>",
    "phone": "<phone if found>",
    "current_role": "<current job title>",
    "years_of_experience": "<estimated years>",
    "top_skills": ["skill1", "skill2", "skill3", "skill4", "skill5"],
    "technical_skills": ["tech1", "tech2", "tech3"],
    "soft_skills": ["skill1", "skill2"],
    "education": "<highest degree>",
    "strengths": ["strength1", "strength2", "strength3"],
    "concerns": ["concern1", "concern2"],
    "recommendation": "<RECOMMENDATIONS>",
    "interview_questions": ["question1", "question2", "question3"],
    "summary": "<2-3 sentence summary>"
}"#;

/// Builds the user instruction embedding both texts verbatim.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    let recommendations = Recommendation::ALL
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join("/");
    let schema = SCHEMA_TEMPLATE.replace("<RECOMMENDATIONS>", &recommendations);

    format!(
        "You are an expert recruiter analyzing a candidate's resume against a job description.\n\
         \n\
         JOB DESCRIPTION:\n\
         {job_description}\n\
         \n\
         RESUME:\n\
         {resume_text}\n\
         \n\
         Analyze this candidate and provide a detailed evaluation in the following JSON format:\n\
         {schema}\n\
         \n\
         \"match_score\" must be a whole number between 0 and 100. \"recommendation\" must be exactly one of: {recommendations}.\n\
         Be thorough and specific. Return ONLY valid JSON, no other text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::Analysis;

    const RESUME: &str = "Jane Doe\nSenior Rust Engineer\n{\"not\": \"json\"}";
    const JOB: &str = "We need a backend engineer with Rust and Postgres.";

    #[test]
    fn identical_inputs_give_identical_prompts() {
        assert_eq!(build_analysis_prompt(RESUME, JOB), build_analysis_prompt(RESUME, JOB));
    }

    #[test]
    fn both_texts_are_embedded_verbatim() {
        let prompt = build_analysis_prompt(RESUME, JOB);
        assert!(prompt.contains(RESUME));
        assert!(prompt.contains(JOB));
        assert!(prompt.find(JOB).unwrap() < prompt.find(RESUME).unwrap());
    }

    #[test]
    fn every_analysis_key_is_requested_by_name() {
        let prompt = build_analysis_prompt(RESUME, JOB);
        for field in Analysis::FIELDS {
            assert!(prompt.contains(&format!("\"{field}\"")), "missing {field}");
        }
    }

    #[test]
    fn recommendation_values_are_enumerated() {
        let prompt = build_analysis_prompt(RESUME, JOB);
        assert!(prompt.contains("Strong Match/Good Match/Moderate Match/Weak Match"));
        assert!(!prompt.contains("<RECOMMENDATIONS>"));
        assert!(prompt.ends_with("Return ONLY valid JSON, no other text."));
    }
}
