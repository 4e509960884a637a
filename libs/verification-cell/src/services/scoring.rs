use std::sync::OnceLock;

use regex::Regex;

use crate::models::{DocumentKind, DocumentStatus, DocumentVerification};

pub const LICENSE_KEYWORDS: [&str; 17] = [
    "license", "medical", "practice", "doctor", "physician", "council",
    "board", "certification", "certificate", "registration", "medicine",
    "practitioner", "authorized", "health", "approved", "pmdc", "valid",
];

pub const DEGREE_KEYWORDS: [&str; 19] = [
    "degree", "university", "medicine", "medical", "doctor", "graduate",
    "college", "bachelor", "master", "mbbs", "md", "science", "faculty",
    "awarded", "academic", "diploma", "education", "institution", "student",
];

const MAX_CONFIDENCE: f64 = 0.95;

fn non_word_regex() -> Option<&'static Regex> {
    static NON_WORD: OnceLock<Option<Regex>> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"[^\w\s]").ok()).as_ref()
}

fn pmdc_regex() -> Option<&'static Regex> {
    static PMDC: OnceLock<Option<Regex>> = OnceLock::new();
    PMDC.get_or_init(|| Regex::new(r"(?i)[a-z]*-?\d{3,7}-?[a-z]?").ok()).as_ref()
}

pub fn keywords_for(kind: DocumentKind) -> &'static [&'static str] {
    match kind {
        DocumentKind::License => &LICENSE_KEYWORDS,
        DocumentKind::Degree => &DEGREE_KEYWORDS,
    }
}

/// Lowercase, punctuation to spaces, whitespace runs collapsed.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let spaced = match non_word_regex() {
        Some(re) => re.replace_all(&lowered, " ").into_owned(),
        None => lowered,
    };
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatches {
    pub matches: Vec<String>,
    pub percentage: f64,
}

/// `text` is expected to be normalized already.
pub fn keyword_matches(text: &str, keywords: &[&str]) -> KeywordMatches {
    if text.is_empty() || keywords.is_empty() {
        return KeywordMatches { matches: Vec::new(), percentage: 0.0 };
    }

    let matches: Vec<String> = keywords
        .iter()
        .filter(|keyword| text.split(' ').any(|word| word == **keyword) || text.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect();

    let percentage = matches.len() as f64 / keywords.len() as f64;
    KeywordMatches { matches, percentage }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn status_for_confidence(confidence: f64) -> DocumentStatus {
    if confidence >= 0.9 {
        DocumentStatus::Verified
    } else if confidence >= 0.7 {
        DocumentStatus::LikelyValid
    } else if confidence >= 0.4 {
        DocumentStatus::PendingReview
    } else {
        DocumentStatus::Suspicious
    }
}

/// Keyword scoring of a document's text.
pub fn score_document(text: &str, kind: DocumentKind) -> DocumentVerification {
    let normalized = normalize_text(text);

    if normalized.is_empty() {
        return DocumentVerification {
            status: DocumentStatus::PendingReview,
            confidence: 0.5,
            method: "basic".to_string(),
            document_type: kind,
            keyword_matches: Vec::new(),
            match_percentage: 0.0,
            message: Some("Could not extract text from document".to_string()),
            pmdc_verification: None,
        };
    }

    let KeywordMatches { matches, percentage } = keyword_matches(&normalized, keywords_for(kind));
    let confidence = (0.3 + percentage * 0.7).min(MAX_CONFIDENCE);

    DocumentVerification {
        status: status_for_confidence(confidence),
        confidence: round2(confidence),
        method: "keyword_analysis".to_string(),
        document_type: kind,
        keyword_matches: matches,
        match_percentage: round2(percentage),
        message: None,
        pmdc_verification: None,
    }
}

/// Result used when neither the verification service nor document text is available.
pub fn fallback_result(kind: DocumentKind) -> DocumentVerification {
    DocumentVerification {
        status: DocumentStatus::PendingReview,
        confidence: 0.85,
        method: "rule-based".to_string(),
        document_type: kind,
        keyword_matches: Vec::new(),
        match_percentage: 0.0,
        message: None,
        pmdc_verification: None,
    }
}

pub fn overall_status(results: &[&DocumentVerification]) -> DocumentStatus {
    if !results.is_empty() && results.iter().all(|r| r.status == DocumentStatus::Verified) {
        DocumentStatus::Verified
    } else if results.iter().any(|r| r.status == DocumentStatus::Suspicious) {
        DocumentStatus::Suspicious
    } else {
        DocumentStatus::PendingReview
    }
}

/// First token shaped like a registration number, reduced to 5 to 10 alphanumerics.
pub fn extract_pmdc_number(text: &str) -> Option<String> {
    let re = pmdc_regex()?;

    re.find_iter(text)
        .map(|m| m.as_str().chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .find(|cleaned| (5..=10).contains(&cleaned.len()))
}
