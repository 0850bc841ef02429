//! Go code generation for marked types.

use crate::extractor::{ConstantSet, Extraction};

/// Returned by `GetDescription` for values that are not a known constant.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Response";

/// First line of every generated file, in the form Go tooling recognizes.
pub const GENERATED_HEADER: &str = "// Code generated by ezenum. DO NOT EDIT.";

/// The three generated functions for one marked type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub package_name: String,
    pub type_name: String,
    pub body: String,
}

/// All units generated for one source file, rendered into a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub package_name: String,
    pub units: Vec<GeneratedUnit>,
}

impl GeneratedFile {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            units: Vec::new(),
        }
    }

    /// Renders every extraction of a file. `None` when there is nothing to
    /// generate.
    pub fn from_extractions(extractions: &[Extraction]) -> Option<Self> {
        let mut units = extractions.iter().map(|extraction| {
            render_unit(
                &extraction.marked.package_name,
                &extraction.marked.name,
                &extraction.constants,
            )
        });
        let first = units.next()?;
        let mut file = GeneratedFile::new(first.package_name.as_str());
        file.push(first);
        units.for_each(|unit| file.push(unit));
        Some(file)
    }

    /// Adds a unit. Units of another package are skipped, since a Go file
    /// has a single package clause.
    pub fn push(&mut self, unit: GeneratedUnit) {
        if unit.package_name != self.package_name {
            tracing::warn!(
                type_name = %unit.type_name,
                unit_package = %unit.package_name,
                file_package = %self.package_name,
                "Skipping unit from another package"
            );
            return;
        }
        self.units.push(unit);
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.type_name.as_str())
    }

    /// Header, package clause, then each unit separated by a blank line.
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(GENERATED_HEADER);
        output.push_str("\n\n");
        output.push_str(&format!("package {}\n", self.package_name));

        for unit in &self.units {
            output.push('\n');
            output.push_str(&unit.body);
        }

        output
    }
}

/// Renders a complete file holding the functions of a single type.
pub fn render(package_name: &str, type_name: &str, constants: &ConstantSet) -> String {
    let mut file = GeneratedFile::new(package_name);
    file.push(render_unit(package_name, type_name, constants));
    file.render()
}

/// Renders `AsCode`, `GetDescription` and `IsValid<Type>` for one type.
pub fn render_unit(package_name: &str, type_name: &str, constants: &ConstantSet) -> GeneratedUnit {
    tracing::debug!(
        type_name,
        constant_count = constants.len(),
        "Rendering enum helpers"
    );

    let mut body = String::new();
    write_as_code(&mut body, type_name);
    body.push('\n');
    write_get_description(&mut body, type_name, constants);
    body.push('\n');
    write_is_valid(&mut body, type_name, constants);

    GeneratedUnit {
        package_name: package_name.to_string(),
        type_name: type_name.to_string(),
        body,
    }
}

fn write_as_code(out: &mut String, type_name: &str) {
    out.push_str(&format!("func (r {type_name}) AsCode() int {{\n"));
    out.push_str("\treturn int(r)\n");
    out.push_str("}\n");
}

fn write_get_description(out: &mut String, type_name: &str, constants: &ConstantSet) {
    out.push_str(&format!("func (r {type_name}) GetDescription() string {{\n"));
    out.push_str("\tswitch r {\n");
    for entry in constants {
        out.push_str(&format!("\tcase {}:\n", entry.identifier));
        out.push_str(&format!("\t\treturn {}\n", go_quote(&entry.description)));
    }
    out.push_str("\tdefault:\n");
    out.push_str(&format!("\t\treturn {}\n", go_quote(UNKNOWN_DESCRIPTION)));
    out.push_str("\t}\n");
    out.push_str("}\n");
}

fn write_is_valid(out: &mut String, type_name: &str, constants: &ConstantSet) {
    out.push_str(&format!("func IsValid{type_name}(code int) bool {{\n"));
    out.push_str(&format!("\tswitch {type_name}(code) {{\n"));
    let last = constants.len().saturating_sub(1);
    for (index, entry) in constants.iter().enumerate() {
        out.push_str(&format!("\tcase {}:\n", entry.identifier));
        if index == last {
            out.push_str("\t\treturn true\n");
        } else {
            out.push_str("\t\tfallthrough\n");
        }
    }
    out.push_str("\tdefault:\n");
    out.push_str("\t\treturn false\n");
    out.push_str("\t}\n");
    out.push_str("}\n");
}

/// Quotes `value` as an interpreted Go string literal.
pub fn go_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => {
                quoted.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
