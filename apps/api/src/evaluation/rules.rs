//! Expression-quality rule catalog.

use serde::Serialize;

use crate::errors::AppError;

/// A named linguistic constraint that requirement sentences are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
}

/// All rules, in declaration order. Selections are always reported in this order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "簡潔な文",
        description: "能動的な表現で記述し、受動態、二重否定、部分否定、使役表現を使用しない",
    },
    Rule {
        name: "必要な語の欠落",
        description: "主語、述語、目的語など必要な要素が欠落していない",
    },
    Rule {
        name: "曖昧語の回避",
        description: "「適切に」「可能な限り」など曖昧な語句を使用しない",
    },
    Rule {
        name: "誤字脱字",
        description: "誤字脱字がない",
    },
    Rule {
        name: "係り受け",
        description: "係り受けが一意に解釈できる",
    },
];

pub fn find(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.name == name)
}

/// Resolves the requested rule names against the catalog.
///
/// Duplicates collapse and the result follows catalog order. An unknown name
/// is rejected; an empty selection is returned as-is and left for the caller
/// to refuse.
pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static Rule>, AppError> {
    let names: Vec<&str> = names
        .iter()
        .map(|n| AsRef::<str>::as_ref(n).trim())
        .collect();

    if let Some(unknown) = names.iter().find(|n| find(n).is_none()) {
        return Err(AppError::Validation(format!("Unknown rule '{unknown}'")));
    }

    Ok(RULES
        .iter()
        .filter(|rule| names.contains(&rule.name))
        .collect())
}

/// `- name: description` per rule, as embedded in the evaluation prompt.
pub fn to_markdown_list(rules: &[&Rule]) -> String {
    rules
        .iter()
        .map(|r| format!("- {}: {}", r.name, r.description))
        .collect::<Vec<_>>()
        .join("\n")
}
