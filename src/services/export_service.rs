use crate::error::Result;
use crate::models::analysis::ScoreTier;
use crate::models::candidate::Candidate;
use crate::models::job::JobPosting;
use rust_xlsxwriter::*;

pub struct ExportService;

impl ExportService {
    fn tier_color(tier: ScoreTier) -> Color {
        match tier {
            ScoreTier::Excellent => Color::RGB(0x10B981), // Emerald
            ScoreTier::Good => Color::RGB(0x3B82F6),      // Blue
            ScoreTier::Moderate => Color::RGB(0xF59E0B),  // Amber
            ScoreTier::Low => Color::RGB(0xEF4444),       // Red
        }
    }

    fn or_dash(value: &str) -> &str {
        if value.trim().is_empty() {
            "—"
        } else {
            value
        }
    }
}

impl ExportService {
    /// Generate a styled XLSX workbook of a job's candidates.
    ///
    /// `candidates` are written in the order given, which callers keep as
    /// the ranked order from the store.
    pub fn generate_candidates_xlsx(job: &JobPosting, candidates: &[Candidate]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Candidates")?;

        // ── Color palette ──
        let primary_color = Color::RGB(0x1E293B); // Slate 800
        let header_bg = Color::RGB(0x0F172A); // Slate 900
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC); // Slate 50
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0); // Slate 200

        // ── Column definitions ──
        let columns = [
            ("Rank", 8.0),
            ("Name", 28.0),
            ("Match Score", 13.0),
            ("Tier", 12.0),
            ("Recommendation", 18.0),
            ("Email", 30.0),
            ("Phone", 18.0),
            ("Current Role", 26.0),
            ("Experience", 12.0),
            ("Top Skills", 40.0),
            ("Summary", 60.0),
            ("Screened At", 20.0),
        ];
        let last_col = (columns.len() - 1) as u16;

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        // ── Title row ──
        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(0, 40)?;
        worksheet.merge_range(0, 0, 0, last_col, &format!("Screening report: {}", job.title), &title_format)?;

        // ── Subtitle row ──
        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(1, 22)?;
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let subtitle_text = format!("Exported: {}  •  Candidates: {}", now, candidates.len());
        worksheet.merge_range(1, 0, 1, last_col, &subtitle_text, &subtitle_format)?;

        // ── Header row ──
        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let header_row = 2;
        worksheet.set_row_height(header_row, 30)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        // ── Data rows ──
        let data_start_row = 3;
        for (idx, candidate) in candidates.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };
            let analysis = candidate.analysis();
            let tier = ScoreTier::from_score(candidate.match_score);

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let wrap_fmt = base_fmt.clone().set_text_wrap();
            let name_fmt = base_fmt.clone().set_bold();

            worksheet.set_row_height(row, 22)?;
            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
            worksheet.write_string_with_format(row, 1, &candidate.name, &name_fmt)?;

            // Score (colored by tier)
            let score_fmt = Format::new()
                .set_font_size(11)
                .set_bold()
                .set_font_color(Self::tier_color(tier))
                .set_background_color(bg)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            worksheet.write_number_with_format(row, 2, candidate.match_score as f64, &score_fmt)?;

            let tier_fmt = Format::new()
                .set_font_size(10)
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Self::tier_color(tier))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            worksheet.write_string_with_format(row, 3, tier.label(), &tier_fmt)?;

            let recommendation = analysis.recommendation.map(|r| r.label()).unwrap_or("—");
            worksheet.write_string_with_format(row, 4, recommendation, &center_fmt)?;
            worksheet.write_string_with_format(row, 5, Self::or_dash(&candidate.email), &base_fmt)?;
            worksheet.write_string_with_format(row, 6, Self::or_dash(&candidate.phone), &base_fmt)?;
            worksheet.write_string_with_format(row, 7, Self::or_dash(&analysis.current_role), &wrap_fmt)?;
            worksheet.write_string_with_format(row, 8, Self::or_dash(&analysis.years_of_experience), &center_fmt)?;
            worksheet.write_string_with_format(row, 9, Self::or_dash(&analysis.top_skills.join(", ")), &wrap_fmt)?;
            worksheet.write_string_with_format(row, 10, Self::or_dash(&analysis.summary), &wrap_fmt)?;

            let created_str = candidate.created_at.format("%Y-%m-%d %H:%M").to_string();
            worksheet.write_string_with_format(row, 11, &created_str, &center_fmt)?;
        }

        // ── Summary row ──
        let total_row = data_start_row + candidates.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary_color)
            .set_background_color(Color::RGB(0xE0E7FF)) // Indigo 100
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        worksheet.set_row_height(total_row, 26)?;
        worksheet.merge_range(total_row, 0, total_row, 1, &format!("Total: {} candidates", candidates.len()), &summary_fmt)?;

        let avg_score = if candidates.is_empty() {
            0.0
        } else {
            candidates.iter().map(|c| c.match_score as f64).sum::<f64>() / candidates.len() as f64
        };
        let tier_count = |t: ScoreTier| {
            candidates
                .iter()
                .filter(|c| ScoreTier::from_score(c.match_score) == t)
                .count()
        };
        let stats_summary = format!(
            "Average score: {:.0} | Excellent: {} | Good: {} | Moderate: {} | Low: {}",
            avg_score,
            tier_count(ScoreTier::Excellent),
            tier_count(ScoreTier::Good),
            tier_count(ScoreTier::Moderate),
            tier_count(ScoreTier::Low),
        );
        worksheet.merge_range(total_row, 2, total_row, last_col, &stats_summary, &summary_fmt)?;

        // Freeze panes (header stays visible while scrolling)
        worksheet.set_freeze_panes(3, 0)?;

        worksheet.autofilter(2, 0, (data_start_row + candidates.len() as u32).saturating_sub(1).max(2), last_col)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn candidate(job: &JobPosting, name: &str, score: i32) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            job_id: job.id,
            user_id: job.user_id,
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: String::new(),
            resume_text: String::new(),
            match_score: score,
            analysis_result: json!({
                "match_score": score,
                "name": name,
                "recommendation": "Good Match",
                "top_skills": ["Rust", "SQL"],
            }),
            created_at: Utc::now(),
        }
    }

    fn job() -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend Engineer".into(),
            description: "Rust".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn workbook_is_a_zip_package() {
        let job = job();
        let candidates = vec![candidate(&job, "Ada", 91), candidate(&job, "Linus", 55)];
        let bytes = ExportService::generate_candidates_xlsx(&job, &candidates).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn empty_job_still_exports() {
        let bytes = ExportService::generate_candidates_xlsx(&job(), &[]).unwrap();
        assert!(!bytes.is_empty());
    }
}
