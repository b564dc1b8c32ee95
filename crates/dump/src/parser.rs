use crate::line::match_attribute_line;
use docmeta_model::{category_for_prefix, AttributeCategory, AttributeRecord, AttributeValue};
use std::collections::HashMap;

/// What kind of dump the text represents.
///
/// Only type-definition dumps carry a meaningful `start_pos` marker; the
/// positional re-categorization pass never runs for object instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    TypeDefinition,
    ObjectInstance,
}

/// Caller-supplied context for one parse: the dump kind plus fallback
/// identifiers used when the dump itself does not name its type/object.
#[derive(Debug, Clone)]
pub struct DumpContext {
    pub kind: DumpKind,
    pub fallback_type_name: Option<String>,
    pub fallback_object_name: Option<String>,
}

impl DumpContext {
    #[must_use]
    pub fn type_definition() -> Self {
        Self {
            kind: DumpKind::TypeDefinition,
            fallback_type_name: None,
            fallback_object_name: None,
        }
    }

    #[must_use]
    pub fn object_instance() -> Self {
        Self {
            kind: DumpKind::ObjectInstance,
            fallback_type_name: None,
            fallback_object_name: None,
        }
    }

    #[must_use]
    pub fn with_fallback_type(mut self, name: impl Into<String>) -> Self {
        self.fallback_type_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_fallback_object(mut self, name: impl Into<String>) -> Self {
        self.fallback_object_name = Some(name.into());
        self
    }
}

/// Result of parsing one dump blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDump {
    /// Attribute records in input order, repeating groups merged.
    pub records: Vec<AttributeRecord>,

    /// Value of `r_object_type`, or the context fallback.
    pub type_name: Option<String>,

    /// Value of `object_name`, or the context fallback.
    pub object_name: Option<String>,
}

impl ParsedDump {
    /// First record with the given name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

/// Marker attribute naming the standard/custom boundary in type dumps.
const START_POS: &str = "start_pos";

/// Parse state: the merged record list plus the bookkeeping that makes the
/// repeating-group merge and the positional second pass auditable.
struct ParseState {
    records: Vec<AttributeRecord>,
    /// name -> index into `records` for active repeating groups.
    repeating: HashMap<String, usize>,
    /// Threshold from the `start_pos` marker line, if seen.
    start_pos: Option<u32>,
}

impl ParseState {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            repeating: HashMap::new(),
            start_pos: None,
        }
    }

    fn consume(&mut self, raw_line: &str) {
        let Some(line) = match_attribute_line(raw_line) else {
            if !raw_line.trim().is_empty() {
                log::debug!("skipping unmatched dump line: {raw_line:?}");
            }
            return;
        };

        // The start_pos marker is bookkeeping, not an attribute.
        if line.name.eq_ignore_ascii_case(START_POS) {
            match line.value.trim().parse::<u32>() {
                Ok(pos) => self.start_pos = Some(pos),
                Err(_) => log::debug!("ignoring non-numeric start_pos: {:?}", line.value),
            }
            return;
        }

        if line.repeat_index.is_some() {
            if let Some(&idx) = self.repeating.get(&line.name) {
                // Later occurrences only contribute their value; any type
                // annotation they carry is ignored.
                self.records[idx].value.push(line.value);
                return;
            }
            let record = AttributeRecord {
                name: line.name.clone(),
                data_type: line.declared_type.unwrap_or_default(),
                length: 0,
                is_repeating: true,
                is_inherited: false,
                category: category_for_prefix(&line.name),
                value: AttributeValue::Repeating(vec![line.value]),
            };
            self.repeating.insert(line.name, self.records.len());
            self.records.push(record);
            return;
        }

        self.records.push(AttributeRecord {
            name: line.name.clone(),
            data_type: line.declared_type.unwrap_or_default(),
            length: 0,
            is_repeating: false,
            is_inherited: false,
            category: category_for_prefix(&line.name),
            value: AttributeValue::Scalar(line.value),
        });
    }

    /// Positional second pass: attributes at or beyond the `start_pos`
    /// ordinal (counted over non-reserved-prefix names only) are the
    /// inspected type's own custom fields. Reserved-prefix attributes are
    /// never re-categorized.
    fn recategorize(&mut self, threshold: u32) {
        let mut ordinal: u32 = 0;
        for record in &mut self.records {
            if category_for_prefix(&record.name) != AttributeCategory::Standard {
                continue;
            }
            if ordinal >= threshold && record.category == AttributeCategory::Standard {
                record.category = AttributeCategory::Custom;
            }
            ordinal += 1;
        }
    }
}

fn scalar_of(record: &AttributeRecord) -> Option<String> {
    match &record.value {
        AttributeValue::Scalar(v) if !v.is_empty() => Some(v.clone()),
        AttributeValue::Repeating(vs) => vs.first().filter(|v| !v.is_empty()).cloned(),
        AttributeValue::Scalar(_) => None,
    }
}

/// Parse one raw dump blob into categorized attribute records.
///
/// Never fails: unmatched lines are skipped and a partially malformed dump
/// still yields a usable, if incomplete, record list.
#[must_use]
pub fn parse_dump(raw: &str, ctx: &DumpContext) -> ParsedDump {
    let mut state = ParseState::new();
    for line in raw.lines() {
        state.consume(line);
    }

    if ctx.kind == DumpKind::TypeDefinition {
        if let Some(threshold) = state.start_pos.filter(|&t| t > 0) {
            state.recategorize(threshold);
        }
    }

    let type_name = state
        .records
        .iter()
        .find(|r| r.name == "r_object_type")
        .and_then(scalar_of)
        .or_else(|| ctx.fallback_type_name.clone());
    let object_name = state
        .records
        .iter()
        .find(|r| r.name == "object_name")
        .and_then(scalar_of)
        .or_else(|| ctx.fallback_object_name.clone());

    ParsedDump {
        records: state.records,
        type_name,
        object_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(dump: &ParsedDump) -> Vec<&str> {
        dump.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn repeating_values_merge_in_input_order() {
        let raw = "keywords[0]: a\nkeywords[1]: b\n";
        let dump = parse_dump(raw, &DumpContext::object_instance());

        assert_eq!(dump.records.len(), 1);
        let rec = &dump.records[0];
        assert_eq!(rec.name, "keywords");
        assert!(rec.is_repeating);
        assert_eq!(
            rec.value,
            AttributeValue::Repeating(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn first_occurrence_fixes_declared_type() {
        let raw = "keywords[0] [STRING]: a\nkeywords[1] [ID]: b\n";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        assert_eq!(dump.records[0].data_type, "STRING");
    }

    #[test]
    fn malformed_index_is_non_repeating() {
        let raw = "keywords[oops]: a\n";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        let rec = &dump.records[0];
        assert!(!rec.is_repeating);
        assert_eq!(rec.value, AttributeValue::Scalar("a".to_string()));
    }

    #[test]
    fn noise_and_separators_are_tolerated() {
        let raw = "\
USER ATTRIBUTES
--------------------
object_name: report.doc
  \n\
SYSTEM ATTRIBUTES
--------------------
r_object_id: 0900000180001234
";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        assert_eq!(names(&dump), vec!["object_name", "r_object_id"]);
    }

    #[test]
    fn prefix_categories_for_instance_dumps() {
        let raw = "\
r_object_id: 09
i_chronicle_id: 09
a_content_type: msw12
object_name: report.doc
my_field: x
";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        let cats: Vec<AttributeCategory> = dump.records.iter().map(|r| r.category).collect();
        assert_eq!(
            cats,
            vec![
                AttributeCategory::System,
                AttributeCategory::Internal,
                AttributeCategory::Application,
                AttributeCategory::Standard,
                AttributeCategory::Standard,
            ]
        );
    }

    #[test]
    fn start_pos_reclassifies_type_dump_attributes() {
        let raw = "\
start_pos: 1
r_object_id: ID
object_name: STRING
custom_field: STRING
";
        let dump = parse_dump(raw, &DumpContext::type_definition());

        // start_pos is consumed, not emitted.
        assert_eq!(names(&dump), vec!["r_object_id", "object_name", "custom_field"]);

        // object_name is ordinal 0 among non-reserved names, custom_field is
        // ordinal 1; with threshold 1 only custom_field flips to Custom.
        assert_eq!(dump.records[0].category, AttributeCategory::System);
        assert_eq!(dump.records[1].category, AttributeCategory::Standard);
        assert_eq!(dump.records[2].category, AttributeCategory::Custom);
    }

    #[test]
    fn reserved_prefixes_are_never_recategorized() {
        let raw = "\
start_pos: 0
object_name: STRING
r_version_label: STRING
a_status: STRING
";
        let dump = parse_dump(raw, &DumpContext::type_definition());
        // Threshold 0 means no positional pass at all.
        assert_eq!(dump.records[0].category, AttributeCategory::Standard);
        assert_eq!(dump.records[1].category, AttributeCategory::System);
        assert_eq!(dump.records[2].category, AttributeCategory::Application);
    }

    #[test]
    fn instance_dumps_ignore_start_pos() {
        let raw = "\
start_pos: 1
object_name: report.doc
custom_field: x
";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        assert_eq!(dump.records[1].category, AttributeCategory::Standard);
    }

    #[test]
    fn derives_type_and_object_names() {
        let raw = "\
r_object_type: dm_document
object_name: report.doc
";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        assert_eq!(dump.type_name.as_deref(), Some("dm_document"));
        assert_eq!(dump.object_name.as_deref(), Some("report.doc"));
    }

    #[test]
    fn falls_back_to_context_identifiers() {
        let dump = parse_dump(
            "title: hello\n",
            &DumpContext::object_instance()
                .with_fallback_type("dm_sysobject")
                .with_fallback_object("0900000180001234"),
        );
        assert_eq!(dump.type_name.as_deref(), Some("dm_sysobject"));
        assert_eq!(dump.object_name.as_deref(), Some("0900000180001234"));
    }

    #[test]
    fn empty_dump_yields_empty_result() {
        let dump = parse_dump("", &DumpContext::type_definition());
        assert!(dump.records.is_empty());
        assert_eq!(dump.type_name, None);
        assert_eq!(dump.object_name, None);
    }

    #[test]
    fn get_finds_first_record_by_name() {
        let raw = "object_name: a\ntitle: b\n";
        let dump = parse_dump(raw, &DumpContext::object_instance());
        assert_eq!(
            dump.get("title").unwrap().value,
            AttributeValue::Scalar("b".to_string())
        );
        assert!(dump.get("missing").is_none());
    }
}
