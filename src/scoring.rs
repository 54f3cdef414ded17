//! Rule-based lead scoring.
//!
//! Pure function over the collected fields. Budget tier contributes
//! 10/25/40, service category 10/20/30, industry category 10/30. The sum is
//! capped at [`MAX_SCORE`].

use crate::lead::LeadDraft;

/// Upper bound on a lead score.
pub const MAX_SCORE: u32 = 100;

/// Score a lead from its collected fields.
///
/// Missing or non-numeric budget is treated as zero. A budget of digits too
/// long for `u128` is still a top-tier budget.
pub fn score_lead(draft: &LeadDraft) -> u32 {
    let budget_str = draft.budget.as_deref().unwrap_or("");
    let industry = draft.industry.as_deref().unwrap_or("").to_lowercase();
    let service = draft.service.as_deref().unwrap_or("").to_lowercase();

    let mut score = 0;

    score += match budget_str.parse::<u128>() {
        Ok(n) if n >= 100_000 => 40,
        Ok(n) if n >= 50_000 => 25,
        Ok(_) => 10,
        Err(_) if !budget_str.is_empty() && budget_str.bytes().all(|b| b.is_ascii_digit()) => 40,
        Err(_) => 10,
    };

    score += match service.as_str() {
        "website" | "mobile app" => 30,
        "seo" | "branding" | "marketing" => 20,
        _ => 0,
    };

    score += match industry.as_str() {
        "tech" | "ecommerce" | "finance" => 30,
        _ => 10,
    };

    score.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::FieldKey;

    fn draft(budget: &str, service: &str, industry: &str) -> LeadDraft {
        let mut draft = LeadDraft::default();
        draft.set(FieldKey::Budget, budget.into());
        draft.set(FieldKey::Service, service.into());
        draft.set(FieldKey::Industry, industry.into());
        draft
    }

    #[test]
    fn top_tier_lead_scores_100() {
        assert_eq!(score_lead(&draft("120000", "Website", "tech")), 100);
    }

    #[test]
    fn budget_tiers() {
        assert_eq!(score_lead(&draft("1000", "other", "farming")), 10 + 0 + 10);
        assert_eq!(score_lead(&draft("50000", "other", "farming")), 25 + 0 + 10);
        assert_eq!(score_lead(&draft("100000", "other", "farming")), 40 + 0 + 10);
    }

    #[test]
    fn budget_longer_than_u128_is_top_tier() {
        let huge = "9".repeat(50);
        assert_eq!(score_lead(&draft(&huge, "other", "farming")), 40 + 0 + 10);
    }

    #[test]
    fn service_categories_are_case_insensitive() {
        assert_eq!(score_lead(&draft("1000", "SEO", "farming")), 10 + 20 + 10);
        assert_eq!(
            score_lead(&draft("1000", "Mobile App", "farming")),
            10 + 30 + 10
        );
    }

    #[test]
    fn non_numeric_budget_counts_as_zero() {
        assert_eq!(score_lead(&draft("lots", "Website", "tech")), 10 + 30 + 30);
    }

    #[test]
    fn empty_draft_gets_floor_score() {
        assert_eq!(score_lead(&LeadDraft::default()), 10 + 0 + 10);
    }
}
