//! Default heuristic detectors, one per risk category.
//!
//! Each detector is a keyword/pattern strategy behind the [`RiskDetector`]
//! trait. Severities accumulate per matched signal and cap at 1.0.

use huxley_types::{RiskCategory, RiskFactor, Task};

use crate::traits::RiskDetector;

const HARM_KEYWORDS: &[&str] = &["kill", "harm", "hurt", "damage", "destroy", "attack", "exploit"];
const HARM_TASK_TYPES: &[&str] = &["security_analysis", "penetration_testing", "exploit_generation"];
const HARM_OUTPUT_PATTERNS: &[&str] =
    &["weapon", "bomb", "poison", "toxin", "illegal", "crime", "terror"];
const HARM_DOMAINS: &[&str] = &["military", "surveillance", "bioweapons"];

const PRIVACY_TASK_TYPES: &[&str] = &[
    "data_mining",
    "surveillance",
    "profiling",
    "location_tracking",
    "biometric_analysis",
];
const PERSONAL_DATA_KEYS: &[&str] = &[
    "name",
    "email",
    "phone",
    "address",
    "ssn",
    "social",
    "credit_card",
    "biometric",
    "location",
    "health",
    "children",
    "spouse",
    "income",
];

const BIAS_KEYWORDS: &[&str] = &["prefer", "avoid", "exclude", "filter", "discriminate", "favor"];
const PROTECTED_CHARACTERISTICS: &[&str] = &["race", "gender", "age", "religion", "disability"];
const BIAS_OUTPUT_PATTERNS: &[&str] = &[
    "stereotype",
    "generalize",
    "based on race",
    "because of gender",
    "must be",
];

const SAFETY_TASK_TYPES: &[&str] = &[
    "medical_diagnosis",
    "financial_recommendation",
    "legal_advice",
    "autonomous_action",
];
const UNSAFE_OUTPUT_PATTERNS: &[&str] = &[
    "no need to verify",
    "trust me completely",
    "bypass security",
    "override safety",
    "ignore warning",
];

const AUTONOMY_TASK_TYPES: &[&str] = &[
    "decision_making",
    "judgment",
    "human_resources",
    "approval_authority",
];

fn matched<'a>(haystack: &str, needles: &[&'a str]) -> Vec<&'a str> {
    let lower = haystack.to_lowercase();
    needles
        .iter()
        .filter(|needle| lower.contains(**needle))
        .copied()
        .collect()
}

fn outputs_text(task: &Task) -> String {
    serde_json::to_string(&task.outputs)
        .unwrap_or_default()
        .to_lowercase()
}

fn input_keys(task: &Task) -> String {
    let mut keys = Vec::new();
    for input in &task.inputs {
        if let Some(map) = input.as_object() {
            keys.extend(map.keys().cloned());
        }
    }
    keys.join(" ").to_lowercase()
}

fn factor(category: RiskCategory, severity: f64, signals: Vec<String>) -> RiskFactor {
    let explanation = if signals.is_empty() {
        format!("no {category} indicators found")
    } else {
        format!("{category} indicators: {}", signals.join("; "))
    };
    RiskFactor {
        category,
        severity: severity.min(1.0),
        explanation,
    }
}

/// Potential for physical, emotional, or psychological harm.
pub struct HarmDetector;

impl RiskDetector for HarmDetector {
    fn category(&self) -> RiskCategory {
        RiskCategory::Harm
    }

    fn detect(&self, task: &Task) -> RiskFactor {
        let mut severity = 0.0;
        let mut signals = Vec::new();

        let words = matched(&task.description, HARM_KEYWORDS);
        if !words.is_empty() {
            severity += 0.3;
            signals.push(format!("harm-related terms in description ({})", words.join(", ")));
        }

        if HARM_TASK_TYPES.contains(&task.task_type.as_str()) {
            severity += 0.4;
            signals.push(format!("inherently risky task type '{}'", task.task_type));
        }

        let patterns = matched(&outputs_text(task), HARM_OUTPUT_PATTERNS);
        if !patterns.is_empty() {
            severity += 0.5;
            signals.push(format!("harmful content in outputs ({})", patterns.join(", ")));
        }

        if HARM_DOMAINS.contains(&task.domain.to_lowercase().as_str()) {
            severity += 0.3;
            signals.push(format!("high-risk domain '{}'", task.domain));
        }

        factor(RiskCategory::Harm, severity, signals)
    }
}

/// Privacy violations, data exposure, unauthorized access.
pub struct PrivacyDetector;

impl RiskDetector for PrivacyDetector {
    fn category(&self) -> RiskCategory {
        RiskCategory::Privacy
    }

    fn detect(&self, task: &Task) -> RiskFactor {
        let mut severity = 0.0;
        let mut signals = Vec::new();

        if PRIVACY_TASK_TYPES.contains(&task.task_type.as_str()) {
            severity += 0.4;
            signals.push(format!("privacy-sensitive task type '{}'", task.task_type));
        }

        let keys = matched(&input_keys(task), PERSONAL_DATA_KEYS);
        if !keys.is_empty() {
            severity += 0.5;
            signals.push(format!("personal data in inputs ({})", keys.join(", ")));
        }

        factor(RiskCategory::Privacy, severity, signals)
    }
}

/// Discrimination, unfair treatment, or biased outputs.
pub struct BiasDetector;

impl RiskDetector for BiasDetector {
    fn category(&self) -> RiskCategory {
        RiskCategory::Bias
    }

    fn detect(&self, task: &Task) -> RiskFactor {
        let mut severity = 0.0;
        let mut signals = Vec::new();

        let words = matched(&task.description, BIAS_KEYWORDS);
        if !words.is_empty() {
            severity += 0.2;
            signals.push(format!("selection language in description ({})", words.join(", ")));
        }

        let protected = matched(&task.description, PROTECTED_CHARACTERISTICS);
        if !protected.is_empty() {
            severity += 0.4;
            signals.push(format!(
                "protected characteristics referenced ({})",
                protected.join(", ")
            ));
        }

        let patterns = matched(&outputs_text(task), BIAS_OUTPUT_PATTERNS);
        if !patterns.is_empty() {
            severity += 0.5;
            signals.push(format!("biased content in outputs ({})", patterns.join(", ")));
        }

        factor(RiskCategory::Bias, severity, signals)
    }
}

/// Safety protocol violations or unsafe recommendations.
pub struct SafetyDetector;

impl RiskDetector for SafetyDetector {
    fn category(&self) -> RiskCategory {
        RiskCategory::Safety
    }

    fn detect(&self, task: &Task) -> RiskFactor {
        let mut severity = 0.0;
        let mut signals = Vec::new();

        if SAFETY_TASK_TYPES.contains(&task.task_type.as_str()) {
            severity += 0.4;
            signals.push(format!("safety-sensitive task type '{}'", task.task_type));
            if !task.context.disclaimer {
                severity += 0.3;
                signals.push("required disclaimer missing".into());
            }
        }

        let patterns = matched(&outputs_text(task), UNSAFE_OUTPUT_PATTERNS);
        if !patterns.is_empty() {
            severity += 0.6;
            signals.push(format!("unsafe guidance in outputs ({})", patterns.join(", ")));
        }

        factor(RiskCategory::Safety, severity, signals)
    }
}

/// Reduction of human autonomy or decision-making power.
pub struct AutonomyDetector;

impl RiskDetector for AutonomyDetector {
    fn category(&self) -> RiskCategory {
        RiskCategory::Autonomy
    }

    fn detect(&self, task: &Task) -> RiskFactor {
        let mut severity = 0.0;
        let mut signals = Vec::new();

        if AUTONOMY_TASK_TYPES.contains(&task.task_type.as_str()) {
            severity += 0.4;
            signals.push(format!("autonomy-sensitive task type '{}'", task.task_type));
        }

        let produces_decisions = task
            .outputs
            .iter()
            .any(|output| output.get("decision").is_some());
        if produces_decisions && !task.context.human_in_loop {
            severity += 0.5;
            signals.push("outputs carry decisions with no human in the loop".into());
        }

        if task.context.human_oversight_required && !task.context.human_review {
            severity += 0.4;
            signals.push("oversight demanded but no review process recorded".into());
        }

        factor(RiskCategory::Autonomy, severity, signals)
    }
}

/// The five default detectors in canonical category order.
pub fn default_detectors() -> Vec<Box<dyn RiskDetector>> {
    vec![
        Box::new(HarmDetector),
        Box::new(PrivacyDetector),
        Box::new(BiasDetector),
        Box::new(SafetyDetector),
        Box::new(AutonomyDetector),
    ]
}
