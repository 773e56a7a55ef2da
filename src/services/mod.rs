pub mod ai_prompts;
pub mod ai_service;
pub mod candidate_service;
pub mod export_service;
pub mod extract_service;
pub mod job_service;
pub mod screening_service;
pub mod user_service;
