//! Micro-parsers for the mini-languages embedded in free-text recipe fields.
//!
//! Every function here is pure and total: malformed input never fails, it
//! yields `None` (or is dropped) and the caller omits the reference.
//!
//! | Field | Format | Parser |
//! |-------|--------|--------|
//! | ingredient quantity | whitespace-separated numbers and vulgar fractions | [`parse_quantity`] |
//! | `PrepTime` / `CookTime` | fixed phrase vocabulary | [`parse_timer_phrase`] |
//! | step `[timer:…]` | `HH:MM:SS[,type]` | [`parse_timer_literal`] |
//! | instruction line | text with `[key:value]` annotations | [`parse_step`] |
//! | ingredient line | `quantity\tunit\tname` | [`parse_ingredient_line`] |

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{IngredientLine, Timer};

/// Escaped line separator used by multi-line keyfile values.
pub const LINE_SEPARATOR: &str = "\\n";

/// Escaped column separator used inside ingredient lines.
const ESCAPED_TAB: &str = "\\t";

/// Vulgar fractions taken literally, never scaled by the serving count.
const FRACTIONS: &[(&str, f64)] = &[
    ("¼", 0.25),
    ("½", 0.5),
    ("¾", 0.75),
    ("⅓", 1.0 / 3.0),
    ("⅔", 2.0 / 3.0),
    ("⅜", 0.375),
    ("1/2", 0.5),
];

/// Duration phrases accepted in `PrepTime` / `CookTime`, in minutes.
const TIMER_PHRASES: &[(&str, Option<u32>, Option<u32>)] = &[
    ("15 minutes", Some(15), Some(15)),
    ("15 to 30 minutes", Some(15), Some(30)),
    ("20 minutes", Some(20), Some(20)),
    ("30 to 45 minutes", Some(30), Some(45)),
    ("40 minutes", Some(40), Some(40)),
    ("45 minutes to an hour", Some(45), Some(60)),
    ("Less than 15 minutes", None, Some(15)),
    ("More than an hour", Some(60), None),
];

static TIMER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d\d):(\d\d):(\d\d)(?:,(\w*))?").unwrap());

static STEP_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^:\]]*):([^\]]*)\]").unwrap());

/// Annotation key whose value is inlined into the step text.
const TEMPERATURE_KEY: &str = "temperature";

/// An instruction line split into display text and structured annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedStep {
    /// Text with annotations removed and temperatures inlined.
    pub text: String,
    pub timer: Option<Timer>,
    /// Index into the owning recipe's `Images` list.
    pub image: Option<usize>,
    pub attributes: BTreeMap<String, String>,
}

/// Parse a compound quantity into a per-serving amount.
///
/// Fraction symbols contribute their literal value. Decimal tokens are
/// divided by `serves`, since source quantities are written for the whole
/// recipe. A missing or zero serving count leaves decimals unscaled.
///
/// Returns `None` for empty input or when any token is not a number.
///
/// ```rust
/// use recipe_import_core::parse::parse_quantity;
///
/// assert_eq!(parse_quantity(Some("2"), Some(4)), Some(0.5));
/// assert_eq!(parse_quantity(Some("½"), Some(4)), Some(0.5));
/// assert_eq!(parse_quantity(Some(""), Some(4)), None);
/// ```
pub fn parse_quantity(input: Option<&str>, serves: Option<u32>) -> Option<f64> {
    let divisor = f64::from(serves.filter(|s| *s > 0).unwrap_or(1));
    let mut tokens = input?.split_whitespace().peekable();
    tokens.peek()?;

    let mut total = 0.0;
    for token in tokens {
        if let Some((_, value)) = FRACTIONS.iter().find(|(symbol, _)| *symbol == token) {
            total += value;
        } else {
            let value: f64 = token.parse().ok()?;
            total += value / divisor;
        }
    }

    total.is_finite().then_some(total)
}

/// Map a duration phrase to a minute range tagged with `kind`.
///
/// Only the exact phrases of the fixed vocabulary are recognized.
pub fn parse_timer_phrase(phrase: &str, kind: &str) -> Option<Timer> {
    let phrase = phrase.trim();
    TIMER_PHRASES
        .iter()
        .find(|(p, _, _)| *p == phrase)
        .map(|(_, from, to)| Timer {
            from: *from,
            to: *to,
            kind: Some(kind.to_string()),
        })
}

/// Parse an `HH:MM:SS[,type]` literal into a fixed timer in seconds.
pub fn parse_timer_literal(input: &str) -> Option<Timer> {
    let caps = TIMER_LITERAL.captures(input)?;
    let field = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
    let seconds = field(3) + 60 * (field(2) + 60 * field(1));
    let kind = caps
        .get(4)
        .map(|m| m.as_str())
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    Some(Timer {
        from: Some(seconds),
        to: Some(seconds),
        kind,
    })
}

/// Split an instruction line into display text and annotations.
///
/// `[temperature:…]` is replaced by its value in the text. Every other
/// annotation is removed from the text: `timer` is parsed with
/// [`parse_timer_literal`], `image` becomes an index, the rest are kept as
/// plain attributes (last occurrence wins).
pub fn parse_step(line: &str) -> ParsedStep {
    let text = STEP_ANNOTATION
        .replace_all(line, |caps: &regex::Captures| {
            if &caps[1] == TEMPERATURE_KEY {
                caps[2].to_string()
            } else {
                String::new()
            }
        })
        .into_owned();

    let mut step = ParsedStep {
        text,
        ..ParsedStep::default()
    };

    for caps in STEP_ANNOTATION.captures_iter(line) {
        let (key, value) = (&caps[1], &caps[2]);
        match key {
            TEMPERATURE_KEY => {}
            "timer" => step.timer = parse_timer_literal(value),
            "image" => step.image = value.trim().parse().ok(),
            _ => {
                step.attributes.insert(key.to_string(), value.to_string());
            }
        }
    }

    step
}

/// Parse one ingredient line. Lines without a name are dropped.
pub fn parse_ingredient_line(line: &str) -> Option<IngredientLine> {
    let line = line.replace(ESCAPED_TAB, "\t");
    let mut columns = line.split('\t');
    let non_empty = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);

    let quantity = non_empty(columns.next());
    let unit = non_empty(columns.next());
    let name = columns.next().filter(|n| !n.trim().is_empty())?;

    Some(IngredientLine {
        quantity,
        unit,
        name: name.to_string(),
    })
}

/// Parse a whole `Ingredients` field.
pub fn parse_ingredient_lines(field: &str) -> Vec<IngredientLine> {
    field
        .split(LINE_SEPARATOR)
        .filter_map(parse_ingredient_line)
        .collect()
}

/// Parse a whole `Instructions` field, skipping empty lines.
pub fn parse_instructions(field: &str) -> Vec<ParsedStep> {
    field
        .split(LINE_SEPARATOR)
        .filter(|line| !line.is_empty())
        .map(parse_step)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_scaled_by_serves() {
        assert_eq!(parse_quantity(Some("2"), Some(4)), Some(0.5));
        assert_eq!(parse_quantity(Some("300"), Some(3)), Some(100.0));
    }

    #[test]
    fn test_quantity_fraction_not_scaled() {
        for serves in [None, Some(1), Some(2), Some(6)] {
            assert_eq!(parse_quantity(Some("½"), serves), Some(0.5));
        }
        assert_eq!(parse_quantity(Some("1/2"), Some(8)), Some(0.5));
    }

    #[test]
    fn test_quantity_tokens_sum() {
        // 1 / 2 servings + ½
        assert_eq!(parse_quantity(Some("1 ½"), Some(2)), Some(1.0));
        assert_eq!(parse_quantity(Some("  ¼   ¾ "), Some(2)), Some(1.0));
    }

    #[test]
    fn test_quantity_missing_or_invalid() {
        assert_eq!(parse_quantity(None, Some(2)), None);
        assert_eq!(parse_quantity(Some("   "), Some(2)), None);
        assert_eq!(parse_quantity(Some("a pinch"), Some(2)), None);
    }

    #[test]
    fn test_quantity_zero_serves_is_unscaled() {
        assert_eq!(parse_quantity(Some("3"), Some(0)), Some(3.0));
        assert_eq!(parse_quantity(Some("3"), None), Some(3.0));
    }

    #[test]
    fn test_timer_phrase_vocabulary() {
        let t = parse_timer_phrase("15 to 30 minutes", "Preparation").unwrap();
        assert_eq!((t.from, t.to), (Some(15), Some(30)));
        assert_eq!(t.kind.as_deref(), Some("Preparation"));

        let t = parse_timer_phrase("Less than 15 minutes", "Cook").unwrap();
        assert_eq!((t.from, t.to), (None, Some(15)));

        let t = parse_timer_phrase("More than an hour", "Cook").unwrap();
        assert_eq!((t.from, t.to), (Some(60), None));
    }

    #[test]
    fn test_timer_phrase_unknown() {
        assert!(parse_timer_phrase("about a day", "Cook").is_none());
        assert!(parse_timer_phrase("15 Minutes", "Cook").is_none());
    }

    #[test]
    fn test_timer_literal() {
        let t = parse_timer_literal("00:10:30,oven").unwrap();
        assert_eq!(t.from, Some(630));
        assert_eq!(t.to, Some(630));
        assert_eq!(t.kind.as_deref(), Some("oven"));

        let t = parse_timer_literal("01:00:00").unwrap();
        assert_eq!(t.from, Some(3600));
        assert_eq!(t.kind, None);

        assert!(parse_timer_literal("10 minutes").is_none());
    }

    #[test]
    fn test_step_temperature_inlined() {
        let step = parse_step("Bake at [temperature:180°C] until golden.");
        assert_eq!(step.text, "Bake at 180°C until golden.");
        assert!(step.attributes.is_empty());
        assert!(step.timer.is_none());
    }

    #[test]
    fn test_step_annotations_extracted() {
        let step = parse_step("Simmer.[timer:00:20:00][image:1][note:stir]");
        assert_eq!(step.text, "Simmer.");
        assert_eq!(step.timer.as_ref().and_then(|t| t.from), Some(1200));
        assert_eq!(step.image, Some(1));
        assert_eq!(step.attributes.get("note").map(String::as_str), Some("stir"));
    }

    #[test]
    fn test_step_bad_timer_dropped() {
        let step = parse_step("Wait [timer:a while]");
        assert_eq!(step.text, "Wait ");
        assert!(step.timer.is_none());
    }

    #[test]
    fn test_ingredient_line_escaped_tabs() {
        let line = parse_ingredient_line("200\\tg\\tFlour").unwrap();
        assert_eq!(line.quantity.as_deref(), Some("200"));
        assert_eq!(line.unit.as_deref(), Some("g"));
        assert_eq!(line.name, "Flour");

        let line = parse_ingredient_line("\t\tSalt").unwrap();
        assert_eq!(line.quantity, None);
        assert_eq!(line.unit, None);
        assert_eq!(line.name, "Salt");
    }

    #[test]
    fn test_ingredient_line_without_name_dropped() {
        assert!(parse_ingredient_line("2\\tpcs").is_none());
        assert!(parse_ingredient_line("2\\tpcs\\t  ").is_none());
        assert!(parse_ingredient_line("").is_none());
    }

    #[test]
    fn test_field_splitting() {
        let lines = parse_ingredient_lines("1\\t\\tEgg\\n\\n2\\tcups\\tMilk");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].name, "Milk");

        let steps = parse_instructions("Mix.\\n\\nBake.");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].text, "Bake.");
    }
}
