use once_cell::sync::Lazy;
use regex::Regex;

/// `name [group1] [group2] (: | =) value` — both bracket groups optional.
static ATTRIBUTE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*([A-Za-z_][A-Za-z0-9_.$]*)\s*(?:\[\s*([^\]]*)\s*\])?\s*(?:\[\s*([^\]]*)\s*\])?\s*[:=]\s*(.*?)\s*$",
    )
    .expect("attribute line regex")
});

/// A bracket group following the attribute name.
///
/// The dump grammar overloads brackets: a numeric group is a repeat index,
/// anything else is a declared-type annotation. A malformed (non-numeric)
/// index therefore degrades to a type annotation and the line parses as a
/// non-repeating attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketToken {
    Index(u32),
    TypeAnnotation(String),
}

impl BracketToken {
    fn classify(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<u32>() {
            Ok(idx) => Some(Self::Index(idx)),
            Err(_) => Some(Self::TypeAnnotation(raw.to_string())),
        }
    }
}

/// One successfully matched attribute line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLine {
    pub name: String,
    pub repeat_index: Option<u32>,
    pub declared_type: Option<String>,
    pub value: String,
}

/// Match a single dump line against the attribute grammar.
///
/// Returns `None` for blank lines, separator lines (`---`) and anything that
/// does not fit the pattern; callers skip those.
#[must_use]
pub fn match_attribute_line(line: &str) -> Option<AttributeLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("---") {
        return None;
    }

    let caps = ATTRIBUTE_LINE.captures(trimmed)?;
    let name = caps.get(1)?.as_str().to_string();

    let mut repeat_index = None;
    let mut declared_type = None;
    for group in [caps.get(2), caps.get(3)].into_iter().flatten() {
        match BracketToken::classify(group.as_str()) {
            Some(BracketToken::Index(idx)) if repeat_index.is_none() => repeat_index = Some(idx),
            Some(BracketToken::TypeAnnotation(ty)) if declared_type.is_none() => {
                declared_type = Some(ty);
            }
            _ => {}
        }
    }

    Some(AttributeLine {
        name,
        repeat_index,
        declared_type,
        value: caps.get(4).map_or_else(String::new, |m| m.as_str().to_string()),
    })
}
