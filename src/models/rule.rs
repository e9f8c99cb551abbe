// Completion rules for derived checklist tasks

//! # Rules Module
//!
//! A rule is a boolean predicate over a process's field data. Every checklist
//! task is declared together with exactly one rule, and the task counts as done
//! exactly when its rule passes.
//!
//! ## Key Concepts
//!
//! - **Rule**: an evaluatable condition with an ID and description
//! - **RuleCondition**: the actual logic - field checks, logical operations
//! - **RuleEvaluationResult**: detailed results, used to explain an open task
//!
//! Missing fields are never an error: every field check simply fails.
//!
//! ## Rust Learning Notes:
//!
//! ### Recursive Enums
//! The `RuleCondition` enum is recursive - `And` and `Or` variants contain
//! vectors of `Rule` structs, which themselves contain `RuleCondition` enums.
//!
//! ### Serde Tag for JSON Serialization
//! The `#[serde(tag = "type")]` attribute creates "tagged union" JSON:
//! `{"type": "FieldEquals", "field": "vpnConfigured", "value": "Yes"}`

use serde::{Deserialize, Serialize};

use super::field::{is_filled, FieldData};

/// A single rule that can be evaluated against field data
///
/// ## Example:
///
/// ```
/// use hr_workflow::models::Rule;
///
/// let rule = Rule::and("personal_data", "Name and an identifier", vec![
///     Rule::field_filled("fullName"),
///     Rule::or("identifier", "Display name or tax id", vec![
///         Rule::field_filled("displayName"),
///         Rule::field_filled("taxId"),
///     ]),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Identifier, used in explanations
    pub id: String,

    /// Human-readable description of what this rule checks
    pub description: String,

    /// The actual condition logic to evaluate
    pub condition: RuleCondition,
}

/// Different types of conditions that can be evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuleCondition {
    /// The field is present and filled in (see [`is_filled`])
    ///
    /// Example: `{"type": "FieldFilled", "field": "buddyMentor"}`
    FieldFilled { field: String },

    /// The field holds exactly this value
    ///
    /// Example: `{"type": "FieldEquals", "field": "vpnConfigured", "value": "Yes"}`
    FieldEquals {
        field: String,
        value: serde_json::Value,
    },

    /// Logical AND - all nested rules must pass. Empty passes.
    And { rules: Vec<Rule> },

    /// Logical OR - at least one nested rule must pass. Empty fails.
    Or { rules: Vec<Rule> },

    /// Logical NOT
    Not { rule: Box<Rule> },
}

/// Detailed results of rule evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluationResult {
    /// ID of the rule that was evaluated
    pub rule_id: String,

    /// Whether the overall rule evaluation passed
    pub passed: bool,

    /// Results of nested rules for And/Or/Not, as (rule_id, passed)
    pub sub_results: Vec<(String, bool)>,

    /// Human-readable explanation of the result
    pub explanation: String,
}

impl Rule {
    /// Evaluate this rule against field data
    pub fn evaluate(&self, data: &FieldData) -> bool {
        self.condition.evaluate(data)
    }

    /// Evaluate and explain
    pub fn evaluate_detailed(&self, data: &FieldData) -> RuleEvaluationResult {
        let passed = self.evaluate(data);
        let (sub_results, explanation) = self.condition.evaluate_detailed(data);

        RuleEvaluationResult {
            rule_id: self.id.clone(),
            passed,
            sub_results,
            explanation,
        }
    }

    /// Every field name this rule reads, in declaration order
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.condition.collect_fields(&mut fields);
        fields
    }
}

impl RuleCondition {
    /// Evaluate the condition against field data
    ///
    /// ## Rust Learning Notes:
    ///
    /// ### Option Chaining
    /// `data.get(field)` returns `Option<&Value>`; `map_or(false, ...)` turns a
    /// missing field into a failed check instead of an error.
    pub fn evaluate(&self, data: &FieldData) -> bool {
        match self {
            RuleCondition::FieldFilled { field } => data.get(field).map_or(false, is_filled),

            RuleCondition::FieldEquals { field, value } => data.get(field) == Some(value),

            RuleCondition::And { rules } => rules.iter().all(|rule| rule.evaluate(data)),

            RuleCondition::Or { rules } => rules.iter().any(|rule| rule.evaluate(data)),

            RuleCondition::Not { rule } => !rule.evaluate(data),
        }
    }

    fn evaluate_detailed(&self, data: &FieldData) -> (Vec<(String, bool)>, String) {
        match self {
            RuleCondition::FieldFilled { field } => {
                let explanation = match data.get(field) {
                    Some(v) if is_filled(v) => format!("Field '{}' is filled", field),
                    Some(_) => format!("Field '{}' is empty", field),
                    None => format!("Field '{}' is missing", field),
                };
                (vec![], explanation)
            }

            RuleCondition::FieldEquals { field, value } => {
                let explanation = match data.get(field) {
                    Some(v) if v == value => format!("Field '{}' equals {}", field, value),
                    Some(v) => format!("Field '{}' is {} (expected {})", field, v, value),
                    None => format!("Field '{}' is missing (expected {})", field, value),
                };
                (vec![], explanation)
            }

            RuleCondition::And { rules } => {
                let sub_results: Vec<(String, bool)> = rules
                    .iter()
                    .map(|rule| (rule.id.clone(), rule.evaluate(data)))
                    .collect();
                let explanation = format!(
                    "AND: {} of {} rules passed",
                    sub_results.iter().filter(|(_, passed)| *passed).count(),
                    sub_results.len()
                );
                (sub_results, explanation)
            }

            RuleCondition::Or { rules } => {
                let sub_results: Vec<(String, bool)> = rules
                    .iter()
                    .map(|rule| (rule.id.clone(), rule.evaluate(data)))
                    .collect();
                let explanation = format!(
                    "OR: {} of {} rules passed",
                    sub_results.iter().filter(|(_, passed)| *passed).count(),
                    sub_results.len()
                );
                (sub_results, explanation)
            }

            RuleCondition::Not { rule } => {
                let passed = rule.evaluate(data);
                let explanation = format!(
                    "NOT: nested rule '{}' {}",
                    rule.id,
                    if passed { "passed" } else { "failed" }
                );
                (vec![(rule.id.clone(), !passed)], explanation)
            }
        }
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RuleCondition::FieldFilled { field } | RuleCondition::FieldEquals { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            RuleCondition::And { rules } | RuleCondition::Or { rules } => {
                for rule in rules {
                    rule.condition.collect_fields(out);
                }
            }
            RuleCondition::Not { rule } => rule.condition.collect_fields(out),
        }
    }
}

// Builder methods for the rule tables
impl Rule {
    /// The field must be filled in
    pub fn field_filled(field: &str) -> Self {
        Rule {
            id: format!("{}_filled", field),
            description: format!("Field '{}' must be filled in", field),
            condition: RuleCondition::FieldFilled {
                field: field.to_string(),
            },
        }
    }

    /// The field must equal a value
    pub fn field_equals(field: &str, value: serde_json::Value) -> Self {
        Rule {
            id: format!("{}_equals", field),
            description: format!("Field '{}' must equal {}", field, value),
            condition: RuleCondition::FieldEquals {
                field: field.to_string(),
                value,
            },
        }
    }

    /// The status field must hold the affirmative token
    pub fn field_affirmed(field: &str) -> Self {
        Self::field_equals(field, serde_json::json!(super::field::YES))
    }

    /// The boolean field must be `true`
    pub fn field_true(field: &str) -> Self {
        Self::field_equals(field, serde_json::json!(true))
    }

    pub fn and(id: &str, description: &str, rules: Vec<Rule>) -> Self {
        Rule {
            id: id.to_string(),
            description: description.to_string(),
            condition: RuleCondition::And { rules },
        }
    }

    pub fn or(id: &str, description: &str, rules: Vec<Rule>) -> Self {
        Rule {
            id: id.to_string(),
            description: description.to_string(),
            condition: RuleCondition::Or { rules },
        }
    }

    pub fn not(id: &str, description: &str, rule: Rule) -> Self {
        Rule {
            id: id.to_string(),
            description: description.to_string(),
            condition: RuleCondition::Not {
                rule: Box::new(rule),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(pairs: &[(&str, serde_json::Value)]) -> FieldData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_filled_rule() {
        let rule = Rule::field_filled("buddyMentor");

        assert!(rule.evaluate(&data(&[("buddyMentor", json!("Carla"))])));
        assert!(!rule.evaluate(&data(&[("buddyMentor", json!(""))])));
        assert!(!rule.evaluate(&FieldData::new()));
    }

    #[test]
    fn test_field_equals_rule() {
        let rule = Rule::field_affirmed("vpnConfigured");

        assert!(rule.evaluate(&data(&[("vpnConfigured", json!("Yes"))])));
        assert!(!rule.evaluate(&data(&[("vpnConfigured", json!("No"))])));
        assert!(!rule.evaluate(&data(&[("vpnConfigured", json!("NotApplicable"))])));
        assert!(!rule.evaluate(&FieldData::new()));
    }

    #[test]
    fn test_boolean_rule_does_not_accept_strings() {
        let rule = Rule::field_true("accountDisabled");

        assert!(rule.evaluate(&data(&[("accountDisabled", json!(true))])));
        assert!(!rule.evaluate(&data(&[("accountDisabled", json!(false))])));
        assert!(!rule.evaluate(&data(&[("accountDisabled", json!("true"))])));
    }

    #[test]
    fn test_complex_and_or_rule() {
        let rule = Rule::and(
            "personal_data",
            "Name plus an identifier",
            vec![
                Rule::field_filled("fullName"),
                Rule::or(
                    "identifier",
                    "Display name or tax id",
                    vec![Rule::field_filled("displayName"), Rule::field_filled("taxId")],
                ),
            ],
        );

        assert!(rule.evaluate(&data(&[("fullName", json!("Ana")), ("taxId", json!("123"))])));
        assert!(rule.evaluate(&data(&[("fullName", json!("Ana")), ("displayName", json!("Ana"))])));
        assert!(!rule.evaluate(&data(&[("fullName", json!("Ana"))])));
        assert!(!rule.evaluate(&data(&[("displayName", json!("Ana")), ("taxId", json!("123"))])));
    }

    #[test]
    fn test_not_rule() {
        let rule = Rule::not("not_partial", "Not partially returned", Rule::field_equals("equipmentReturned", json!("Partial")));

        assert!(rule.evaluate(&FieldData::new()));
        assert!(!rule.evaluate(&data(&[("equipmentReturned", json!("Partial"))])));
    }

    #[test]
    fn test_detailed_evaluation() {
        let rule = Rule::and(
            "dates",
            "Both dates",
            vec![Rule::field_filled("admissionDate"), Rule::field_filled("startDate")],
        );

        let result = rule.evaluate_detailed(&data(&[("admissionDate", json!("2026-01-05"))]));

        assert_eq!(result.rule_id, "dates");
        assert!(!result.passed);
        assert_eq!(
            result.sub_results,
            vec![
                ("admissionDate_filled".to_string(), true),
                ("startDate_filled".to_string(), false)
            ]
        );
        assert_eq!(result.explanation, "AND: 1 of 2 rules passed");
    }

    #[test]
    fn test_missing_field_explanation() {
        let result = Rule::field_affirmed("sapUserCreated").evaluate_detailed(&FieldData::new());
        assert!(!result.passed);
        assert!(result.explanation.contains("missing"));
    }

    #[test]
    fn test_referenced_fields_are_deduplicated() {
        let rule = Rule::or(
            "equipment",
            "Returned or collected",
            vec![
                Rule::field_affirmed("equipmentReturned"),
                Rule::field_true("hardwareCollected"),
                Rule::field_filled("equipmentReturned"),
            ],
        );
        assert_eq!(rule.referenced_fields(), vec!["equipmentReturned", "hardwareCollected"]);
    }

    #[test]
    fn test_rule_json_shape() {
        let rule = Rule::field_affirmed("vpnConfigured");
        let json = serde_json::to_value(&rule.condition).unwrap();
        assert_eq!(json, json!({"type": "FieldEquals", "field": "vpnConfigured", "value": "Yes"}));
    }
}
