use super::rubric::EligibilityRubric;
use super::{CheckStatus, EligibilityCheck};
use crate::workflows::intake::DocumentCategory;

pub(crate) struct RubricOutcome {
    pub score: u8,
    pub checks: Vec<EligibilityCheck>,
    pub missing_categories: Vec<DocumentCategory>,
    pub notes: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence: u8,
}

pub(crate) fn apply_rubric(
    documents: &[DocumentCategory],
    rubric: &EligibilityRubric,
) -> RubricOutcome {
    let present = |category: &DocumentCategory| documents.contains(category);

    let mut raw_score = rubric.base_score;
    let mut missing_categories = Vec::new();
    for weight in &rubric.weights {
        if present(&weight.category) {
            raw_score += weight.points;
        } else {
            missing_categories.push(weight.category);
        }
    }
    let score = raw_score.clamp(0, 100) as u8;

    let checks = rubric
        .checks
        .iter()
        .map(|rule| {
            if rule.requires.iter().all(present) {
                EligibilityCheck {
                    criterion: rule.criterion.clone(),
                    status: CheckStatus::Approved,
                    detail: rule.present_detail.clone(),
                }
            } else {
                EligibilityCheck {
                    criterion: rule.criterion.clone(),
                    status: rule.missing_status,
                    detail: rule.missing_detail.clone(),
                }
            }
        })
        .collect();

    let notes = if documents.len() < rubric.minimum_documents {
        vec![rubric.few_documents_note.clone()]
    } else {
        Vec::new()
    };

    let recommendations = if score >= rubric.approval_threshold {
        rubric.adequate_recommendations.clone()
    } else {
        rubric.inadequate_recommendations.clone()
    };

    let confidence = (60 + 5 * documents.len()).min(95) as u8;

    RubricOutcome {
        score,
        checks,
        missing_categories,
        notes,
        recommendations,
        confidence,
    }
}
