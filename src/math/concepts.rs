//! A fixed catalogue of concept explanations grouped by school level.

use serde::{Deserialize, Serialize};

use crate::mcp::registry::ToolOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Elementary,
    #[default]
    Middle,
    HighSchool,
}

impl Level {
    pub const NAMES: &'static [&'static str] = &["elementary", "middle", "high_school"];

    #[must_use]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// The concepts explained at this level, in catalogue order.
    #[must_use]
    pub const fn catalogue(self) -> &'static [Concept] {
        match self {
            Self::Elementary => ELEMENTARY,
            Self::Middle => MIDDLE,
            Self::HighSchool => HIGH_SCHOOL,
        }
    }
}

#[derive(Debug)]
pub struct Concept {
    pub key: &'static str,
    pub explanation: &'static str,
    pub example: &'static str,
    pub steps: &'static [&'static str],
}

const ELEMENTARY: &[Concept] = &[
    Concept {
        key: "addition",
        explanation: "Addition means putting numbers together to find the total.",
        example: "If you have 3 apples and get 2 more, you add: 3 + 2 = 5 apples total.",
        steps: &["Count the first group", "Count the second group", "Count them all together"],
    },
    Concept {
        key: "subtraction",
        explanation: "Subtraction means taking away or finding the difference.",
        example: "If you have 8 cookies and eat 3, you subtract: 8 - 3 = 5 cookies left.",
        steps: &[
            "Start with the bigger number",
            "Take away the smaller number",
            "Count what's left",
        ],
    },
    Concept {
        key: "multiplication",
        explanation: "Multiplication is repeated addition or groups of equal size.",
        example: "3 groups of 4 objects each: 3 × 4 = 4 + 4 + 4 = 12",
        steps: &[
            "Count the number of groups",
            "Count how many in each group",
            "Add all groups together",
        ],
    },
    Concept {
        key: "division",
        explanation: "Division means sharing equally or finding how many groups.",
        example: "12 candies shared among 3 children: 12 ÷ 3 = 4 candies each",
        steps: &["Start with the total", "Decide how many groups", "Share equally among groups"],
    },
];

const MIDDLE: &[Concept] = &[
    Concept {
        key: "fractions",
        explanation: "Fractions represent parts of a whole, written as numerator/denominator.",
        example: "3/4 means 3 parts out of 4 equal parts total",
        steps: &[
            "Denominator shows total parts",
            "Numerator shows parts we have",
            "Can be simplified by dividing by GCD",
        ],
    },
    Concept {
        key: "decimals",
        explanation: "Decimals are another way to write fractions using place value.",
        example: "0.75 = 75/100 = 3/4",
        steps: &[
            "Each place represents a power of 10",
            "Can convert to/from fractions",
            "Useful for precise calculations",
        ],
    },
    Concept {
        key: "percentages",
        explanation: "Percentages mean 'out of 100' and show parts of a whole.",
        example: "25% = 25/100 = 0.25 = 1/4",
        steps: &[
            "Percent means per hundred",
            "Multiply by 100 to convert from decimal",
            "Divide by 100 to convert to decimal",
        ],
    },
    Concept {
        key: "algebra_basics",
        explanation: "Algebra uses letters (variables) to represent unknown numbers.",
        example: "If x + 5 = 12, then x = 7",
        steps: &[
            "Variables represent unknown values",
            "Equations show relationships",
            "Solve by isolating the variable",
        ],
    },
];

const HIGH_SCHOOL: &[Concept] = &[
    Concept {
        key: "quadratic_equations",
        explanation: "Quadratic equations have the form ax² + bx + c = 0 and can have 0, 1, or 2 real solutions.",
        example: "x² - 5x + 6 = 0 has solutions x = 2 and x = 3",
        steps: &[
            "Use quadratic formula: x = (-b ± √(b²-4ac))/(2a)",
            "Check discriminant b²-4ac",
            "If positive: 2 solutions, if zero: 1 solution, if negative: no real solutions",
        ],
    },
    Concept {
        key: "trigonometry",
        explanation: "Trigonometry studies relationships between angles and sides in triangles.",
        example: "In a right triangle, sin(θ) = opposite/hypotenuse",
        steps: &[
            "SOH: Sin = Opposite/Hypotenuse",
            "CAH: Cos = Adjacent/Hypotenuse",
            "TOA: Tan = Opposite/Adjacent",
        ],
    },
    Concept {
        key: "logarithms",
        explanation: "Logarithms are the inverse of exponential functions.",
        example: "If 2³ = 8, then log₂(8) = 3",
        steps: &[
            "log_b(x) asks 'what power gives x?'",
            "Natural log (ln) uses base e",
            "Common log uses base 10",
        ],
    },
    Concept {
        key: "functions",
        explanation: "Functions are rules that assign exactly one output to each input.",
        example: "f(x) = 2x + 1 assigns f(3) = 7",
        steps: &[
            "Domain: all possible inputs",
            "Range: all possible outputs",
            "Can be linear, quadratic, exponential, etc.",
        ],
    },
];

/// Finds the first catalogue entry at `level` whose key contains the
/// normalised query or is contained in it.
///
/// Queries are lowercased and spaces become underscores, so
/// `"Quadratic Equations"` matches `quadratic_equations`. An empty query
/// matches nothing.
#[must_use]
pub fn lookup(concept: &str, level: Level) -> Option<&'static Concept> {
    let query = concept.trim().to_lowercase().replace(' ', "_");
    if query.is_empty() {
        return None;
    }
    level
        .catalogue()
        .iter()
        .find(|c| c.key.contains(&query) || query.contains(c.key))
}

/// Explains `concept` at `level`. An unmatched concept is not an error;
/// the explanation lists what is available instead.
#[must_use]
pub fn explain(concept: &str, level: Level) -> ToolOutcome {
    let outcome = match lookup(concept, level) {
        Some(entry) => ToolOutcome::new(entry.key, entry.explanation)
            .steps(entry.steps.iter().copied())
            .with("example", entry.example),
        None => {
            let available: Vec<&str> = level.catalogue().iter().map(|c| c.key).collect();
            ToolOutcome::new(
                serde_json::Value::Null,
                format!(
                    "Concept '{concept}' not found in {} level explanations. Available concepts: {}",
                    level.name(),
                    available.join(", ")
                ),
            )
            .with("example", "Please try a different concept or level.")
            .with("available_concepts", available)
        }
    };

    outcome.with("concept", concept).with("level", level.name())
}
