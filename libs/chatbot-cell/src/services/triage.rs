use crate::models::SymptomAnalysis;

pub const GENERAL_PHYSICIAN: &str = "General Physician";

const NEEDS_MORE_INFO: &str = "I need more information about your symptoms to make an accurate recommendation. \
Please provide details like what you're experiencing, how long it's been happening, and any other symptoms you may have.";

const GENERAL_ADVICE: &str = "Based on the information provided, I recommend consulting with a General Physician first. \
They can perform an initial assessment and refer you to a specialist if needed. \
For more specific recommendations, please provide more details about your symptoms.";

struct SpecialtyGroup {
    specialist: &'static str,
    keywords: &'static [&'static str],
    advice: &'static str,
}

/// Checked in order; the first group with a matching keyword wins.
const SPECIALTY_GROUPS: [SpecialtyGroup; 8] = [
    SpecialtyGroup {
        specialist: "Dentist",
        keywords: &["tooth", "teeth", "gum", "dental", "cavity", "toothache", "mouth pain"],
        advice: "Based on your symptoms related to dental issues, I recommend consulting with a Dentist. \
Dental problems like toothaches, gum issues, or cavities require specialized care.",
    },
    SpecialtyGroup {
        specialist: "Ophthalmologist",
        keywords: &["eye", "vision", "seeing", "sight", "blind", "glasses", "blurry"],
        advice: "Based on your symptoms related to vision or eye issues, I recommend consulting with an Ophthalmologist. \
They specialize in diagnosing and treating eye conditions and can help with vision problems.",
    },
    SpecialtyGroup {
        specialist: "Cardiologist",
        keywords: &[
            "heart", "chest pain", "palpitations", "shortness of breath",
            "chest tightness", "rapid heartbeat", "irregular heartbeat",
        ],
        advice: "Based on your symptoms related to heart or chest pain, I recommend consulting with a Cardiologist. \
These symptoms could indicate various heart conditions that require specialized evaluation.",
    },
    SpecialtyGroup {
        specialist: "Dermatologist",
        keywords: &["skin", "rash", "acne", "itch", "derma", "mole", "eczema"],
        advice: "Based on your symptoms related to skin conditions, I recommend consulting with a Dermatologist. \
They specialize in diagnosing and treating skin disorders like rashes, acne, or eczema.",
    },
    SpecialtyGroup {
        specialist: "Orthopedic Surgeon",
        keywords: &["bone", "joint", "fracture", "sprain", "arthritis", "knee pain", "back pain"],
        advice: "Based on your symptoms related to bone or joint issues, I recommend consulting with an Orthopedic Surgeon. \
They specialize in musculoskeletal conditions and can help with pain, injuries, or arthritis.",
    },
    SpecialtyGroup {
        specialist: "Psychiatrist",
        keywords: &["depress", "anxiety", "stress", "mental", "panic", "mood", "suicide"],
        advice: "Based on your symptoms related to mental health, I recommend consulting with a Psychiatrist. \
Mental health is important, and they can provide proper diagnosis and treatment options.",
    },
    SpecialtyGroup {
        specialist: "Gastroenterologist",
        keywords: &["stomach", "digest", "bowel", "nausea", "vomit", "diarrhea", "constipation"],
        advice: "Based on your symptoms related to digestive issues, I recommend consulting with a Gastroenterologist. \
They specialize in digestive system disorders and can provide appropriate treatment.",
    },
    SpecialtyGroup {
        specialist: "Neurologist",
        keywords: &["headache", "migraine", "nerve", "brain", "seizure", "dizzy", "numbness"],
        advice: "Based on your symptoms related to neurological issues, I recommend consulting with a Neurologist. \
They specialize in brain and nervous system disorders and can help with conditions like headaches or dizziness.",
    },
];

/// Keyword triage of free-text symptoms to a specialist.
pub fn analyze_symptoms(symptoms: &str) -> SymptomAnalysis {
    let text = symptoms.trim().to_lowercase();

    if text.chars().count() < 10 || text == "hi" || text == "hello" {
        return SymptomAnalysis {
            response: NEEDS_MORE_INFO.to_string(),
            specialist: None,
            needs_more_info: true,
        };
    }

    let group = SPECIALTY_GROUPS
        .iter()
        .find(|group| group.keywords.iter().any(|keyword| text.contains(keyword)));

    match group {
        Some(group) => SymptomAnalysis {
            response: group.advice.to_string(),
            specialist: Some(group.specialist.to_string()),
            needs_more_info: false,
        },
        None => SymptomAnalysis {
            response: GENERAL_ADVICE.to_string(),
            specialist: Some(GENERAL_PHYSICIAN.to_string()),
            needs_more_info: false,
        },
    }
}

/// Specialist named in free-form assistant text, defaulting to a General Physician.
pub fn extract_specialist(reply: &str) -> &'static str {
    let text = reply.to_lowercase();

    [
        ("dentist", "Dentist"),
        ("cardiologist", "Cardiologist"),
        ("neurologist", "Neurologist"),
        ("gastroenterologist", "Gastroenterologist"),
        ("ophthalmologist", "Ophthalmologist"),
        ("dermatologist", "Dermatologist"),
        ("orthopedic", "Orthopedic Surgeon"),
        ("psychiatrist", "Psychiatrist"),
    ]
    .into_iter()
    .find(|(needle, _)| text.contains(needle))
    .map(|(_, specialist)| specialist)
    .unwrap_or(GENERAL_PHYSICIAN)
}
