//! Finds marked types and their constants in a Go file.

use crate::config::LiteralInference;
use crate::error::{EzenumError, Result};
use crate::golang::{
    self, CommentGroup, DeclKind, GenDecl, SourceFile, Spec, TypeSpec, ValueSpec,
    strip_comment_markers,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A type declaration whose comment carries the marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedType {
    pub name: String,
    pub owning_file: PathBuf,
    pub package_name: String,
}

/// One constant of a marked type and its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantEntry {
    pub identifier: String,
    pub description: String,
}

/// Constants of one type with unique identifiers, in discovery order.
/// Inserting an identifier again replaces its description in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstantSet {
    entries: Vec<ConstantEntry>,
}

impl ConstantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, description: impl Into<String>) {
        let identifier = identifier.into();
        let description = description.into();
        match self.entries.iter_mut().find(|e| e.identifier == identifier) {
            Some(existing) => existing.description = description,
            None => self.entries.push(ConstantEntry {
                identifier,
                description,
            }),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| e.description.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstantEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConstantSet {
    type Item = &'a ConstantEntry;
    type IntoIter = std::slice::Iter<'a, ConstantEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<I: Into<String>, D: Into<String>> FromIterator<(I, D)> for ConstantSet {
    fn from_iter<T: IntoIterator<Item = (I, D)>>(iter: T) -> Self {
        let mut set = ConstantSet::new();
        for (identifier, description) in iter {
            set.insert(identifier, description);
        }
        set
    }
}

/// A marked type together with the constants found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub marked: MarkedType,
    pub constants: ConstantSet,
}

/// Extracts marked types and constants from Go source.
#[derive(Debug, Clone)]
pub struct Extractor {
    marker: String,
    inference: LiteralInference,
}

impl Extractor {
    pub fn new(marker: impl Into<String>, inference: LiteralInference) -> Self {
        Self {
            marker: marker.into(),
            inference,
        }
    }

    /// Reads and extracts one file.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<Extraction>> {
        let source = fs::read_to_string(path).map_err(|source| EzenumError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_source(path, &source)
    }

    /// Extracts from source text; `path` is only recorded, never read.
    pub fn extract_source(&self, path: &Path, source: &str) -> Result<Vec<Extraction>> {
        let file = golang::parse_source(source)
            .map_err(|e| EzenumError::parse_error(path, e.to_string()))?;

        let marked = self.marked_types(&file);
        if marked.is_empty() {
            trace!("No marked types in {:?}", path);
            return Ok(Vec::new());
        }

        let marked_names: Vec<&str> = marked.iter().map(|spec| spec.name.name.as_str()).collect();
        let extractions = marked
            .iter()
            .map(|spec| {
                for function in clashing_functions(&file, &spec.name.name) {
                    warn!(
                        path = %path.display(),
                        type_name = %spec.name.name,
                        function,
                        "Declaration clashes with generated code"
                    );
                }
                let constants = self.find_constants(&file, &spec.name.name, &marked_names);
                debug!(
                    "Marked type {} in {:?} has {} constants",
                    spec.name.name,
                    path,
                    constants.len()
                );
                Extraction {
                    marked: MarkedType {
                        name: spec.name.name.clone(),
                        owning_file: path.to_path_buf(),
                        package_name: file.package.name.clone(),
                    },
                    constants,
                }
            })
            .collect();

        Ok(extractions)
    }

    /// Top-level type specs whose trailing or doc comment contains the marker.
    fn marked_types<'f>(&self, file: &'f SourceFile) -> Vec<&'f TypeSpec> {
        file.gen_decls(DeclKind::Type)
            .flat_map(|decl| {
                decl.specs.iter().filter_map(move |spec| match spec {
                    Spec::Type(ty) if self.is_marked(decl, ty) => Some(ty),
                    _ => None,
                })
            })
            .collect()
    }

    fn is_marked(&self, decl: &GenDecl, spec: &TypeSpec) -> bool {
        let doc = if decl.grouped { &spec.doc } else { &decl.doc };
        [&spec.comment, doc]
            .into_iter()
            .flatten()
            .any(|group| group.contains(&self.marker))
    }

    fn find_constants(&self, file: &SourceFile, type_name: &str, marked: &[&str]) -> ConstantSet {
        let mut constants = ConstantSet::new();

        for decl in file.gen_decls(DeclKind::Const) {
            // Type of the closest preceding spec with an explicit type, and the
            // type an implicitly repeated spec takes on.
            let mut last_typed: Option<&str> = None;
            let mut repeated: Option<&str> = None;

            for spec in &decl.specs {
                let Spec::Value(value) = spec else {
                    continue;
                };

                let belongs = match (&value.ty, value.values.first()) {
                    (Some(ty), _) => {
                        let name = ty.as_ident();
                        last_typed = name;
                        repeated = name;
                        name == Some(type_name)
                    }
                    (None, Some(first)) => {
                        let inferred = first.is_int_lit()
                            && match self.inference {
                                LiteralInference::Group => last_typed == Some(type_name),
                                LiteralInference::File => marked.contains(&type_name),
                            };
                        repeated = inferred.then_some(type_name);
                        inferred
                    }
                    (None, None) => repeated == Some(type_name),
                };

                if belongs {
                    collect_spec(value, &mut constants);
                }
            }
        }

        constants
    }
}

/// Functions already declared in `file` that the generated code for
/// `type_name` would redeclare.
fn clashing_functions<'f>(file: &'f SourceFile, type_name: &str) -> Vec<&'f str> {
    let validator = format!("IsValid{type_name}");
    file.funcs()
        .filter(|func| match func.receiver.as_deref() {
            Some(receiver) => {
                receiver == type_name && matches!(func.name.name.as_str(), "AsCode" | "GetDescription")
            }
            None => func.name.name == validator,
        })
        .map(|func| func.name.name.as_str())
        .collect()
}

/// Pairs each name with the trailing comment at the same index.
fn collect_spec(spec: &ValueSpec, constants: &mut ConstantSet) {
    let comments = spec.comment.as_ref().map(|group: &CommentGroup| group.list.as_slice());
    for (index, name) in spec.names.iter().enumerate() {
        if name.name.is_empty() || name.name == "_" {
            continue;
        }
        let description = comments
            .and_then(|list| list.get(index))
            .map(|comment| strip_comment_markers(&comment.text))
            .unwrap_or_default();
        constants.insert(name.name.as_str(), description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Vec<Extraction> {
        Extractor::new("EZENUM", LiteralInference::Group)
            .extract_source(Path::new("codes.go"), source)
            .unwrap()
    }

    fn pairs(set: &ConstantSet) -> Vec<(&str, &str)> {
        set.iter()
            .map(|e| (e.identifier.as_str(), e.description.as_str()))
            .collect()
    }

    #[test]
    fn test_extract_status_scenario() {
        let source = r#"package status

type Status int // EZENUM

const (
	Ok  Status = 200 // OK: fine.
	Bad Status = 400 // Bad: nope.
)
"#;
        let extractions = extract(source);
        assert_eq!(extractions.len(), 1);

        let extraction = &extractions[0];
        assert_eq!(
            extraction.marked,
            MarkedType {
                name: "Status".to_string(),
                owning_file: PathBuf::from("codes.go"),
                package_name: "status".to_string(),
            }
        );
        assert_eq!(
            pairs(&extraction.constants),
            vec![("Ok", "OK: fine."), ("Bad", "Bad: nope.")]
        );
    }

    #[test]
    fn test_unmarked_types_are_ignored() {
        let source = "package p\n\ntype A int\ntype B int // ezenum\n\nconst X A = 1\n";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_marker_in_doc_comment() {
        let source = "package p\n\n// Level is generated. EZENUM\ntype Level int\n\nconst (\n\tLow Level = 1 // low\n)\n";
        let extractions = extract(source);
        assert_eq!(extractions.len(), 1);
        assert_eq!(pairs(&extractions[0].constants), vec![("Low", "low")]);
    }

    #[test]
    fn test_marker_on_grouped_type_spec() {
        let source = "package p\n\ntype (\n\tA int // EZENUM\n\tB int\n\t// EZENUM too\n\tC int\n)\n";
        let names: Vec<String> = extract(source).into_iter().map(|e| e.marked.name).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_marked_type_without_constants() {
        let source = "package p\n\ntype Empty int // EZENUM\n";
        let extractions = extract(source);
        assert_eq!(extractions.len(), 1);
        assert!(extractions[0].constants.is_empty());
    }

    #[test]
    fn test_only_matching_explicit_types_are_collected() {
        let source = r#"package p

type Color int // EZENUM
type Size int

const (
	Red  Color = 1 // red
	Big  Size  = 2 // big
	Blue Color = 3
)

var Green Color = 4 // vars are not constants
"#;
        let extractions = extract(source);
        assert_eq!(
            pairs(&extractions[0].constants),
            vec![("Red", "red"), ("Blue", "")]
        );
    }

    #[test]
    fn test_comments_are_matched_by_position() {
        let source = "package p\n\ntype T int // EZENUM\n\nconst A, B, C T = 1, 2, 3 /* first */ /* second */\n";
        let extractions = extract(source);
        assert_eq!(
            pairs(&extractions[0].constants),
            vec![("A", "first"), ("B", "second"), ("C", "")]
        );
    }

    #[test]
    fn test_untyped_literal_uses_preceding_typed_sibling() {
        let source = r#"package p

type Kind int // EZENUM

const (
	First Kind = 1 // first
	Second = 2 // second
	Again      // again
	Name = "x"
	Third = -3
	Fourth
)

const Loose = 5 // loose
"#;
        let extractions = extract(source);
        assert_eq!(
            pairs(&extractions[0].constants),
            vec![("First", "first"), ("Second", "second"), ("Again", "again")]
        );
    }

    #[test]
    fn test_untyped_literal_file_inference() {
        let source = "package p\n\ntype A int // EZENUM\ntype B int // EZENUM\n\nconst Loose = 5 // loose\n";
        let extractions = Extractor::new("EZENUM", LiteralInference::File)
            .extract_source(Path::new("x.go"), source)
            .unwrap();
        assert_eq!(extractions.len(), 2);
        for extraction in &extractions {
            assert_eq!(pairs(&extraction.constants), vec![("Loose", "loose")]);
        }
    }

    #[test]
    fn test_implicit_repetition_follows_iota_type() {
        let source = r#"package p

type Weekday int // EZENUM

const (
	Sunday Weekday = iota // Sunday: first day.
	Monday                // Monday: second day.
	Tuesday
)

const (
	Other = iota
	Unrelated
)
"#;
        let extractions = extract(source);
        assert_eq!(
            pairs(&extractions[0].constants),
            vec![
                ("Sunday", "Sunday: first day."),
                ("Monday", "Monday: second day."),
                ("Tuesday", "")
            ]
        );
    }

    #[test]
    fn test_duplicate_identifier_last_write_wins() {
        let source = "package p\n\ntype T int // EZENUM\n\nconst A T = 1 // one\nconst B T = 2 // two\nconst A T = 3 // three\n";
        let extractions = extract(source);
        assert_eq!(
            pairs(&extractions[0].constants),
            vec![("A", "three"), ("B", "two")]
        );
    }

    #[test]
    fn test_blank_identifier_is_skipped() {
        let source = "package p\n\ntype T int // EZENUM\n\nconst (\n\t_ T = iota\n\tA\n)\n";
        assert_eq!(pairs(&extract(source)[0].constants), vec![("A", "")]);
    }

    #[test]
    fn test_clashing_functions() {
        let source = r#"package p

type Code int // EZENUM

type Other int

func (c Code) AsCode() int { return int(c) }
func (c *Code) String() string { return "" }
func (o Other) GetDescription() string { return "" }
func IsValidCode(code int) bool { return true }
func IsValidOther(code int) bool { return true }
"#;
        let file = golang::parse_source(source).unwrap();
        assert_eq!(clashing_functions(&file, "Code"), vec!["AsCode", "IsValidCode"]);
        assert_eq!(
            clashing_functions(&file, "Other"),
            vec!["GetDescription", "IsValidOther"]
        );

        // Still extracted; the clash is only reported.
        assert_eq!(extract(source).len(), 1);
    }

    #[test]
    fn test_custom_marker() {
        let source = "package p\n\ntype T int // +genenum\n\nconst A T = 1\n";
        let extractions = Extractor::new("+genenum", LiteralInference::Group)
            .extract_source(Path::new("x.go"), source)
            .unwrap();
        assert_eq!(extractions.len(), 1);
    }

    #[test]
    fn test_parse_error_names_file() {
        let result = Extractor::new("EZENUM", LiteralInference::Group)
            .extract_source(Path::new("broken.go"), "package p\n\nfunc {\n");
        match result {
            Err(EzenumError::Parse { file, message }) => {
                assert_eq!(file, PathBuf::from("broken.go"));
                assert!(message.starts_with("3:"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_set_from_iter_dedupes() {
        let set: ConstantSet = [("A", "1"), ("B", "2"), ("A", "3")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("A"), Some("3"));
        assert_eq!(pairs(&set), vec![("A", "3"), ("B", "2")]);
    }
}
