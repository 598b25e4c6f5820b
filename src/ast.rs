//! Parsed representation of a route pattern, produced by [`crate::parser`]
//! and consumed by [`crate::compiler`].

#[derive(Debug, Clone, PartialEq)]
pub struct PatternAst {
    pub segments: Vec<SegmentNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentNode {
    Literal {
        value: String,
        position: usize,
    },
    Parameter(ParameterNode),
    Option(OptionNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    pub name: String,
    pub type_constraint: Option<String>,
    pub description: Option<String>,
    pub is_catch_all: bool,
    pub is_optional: bool,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionNode {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub value_param: Option<ParameterNode>,
    pub is_repeated: bool,
    pub position: usize,
}

impl OptionNode {
    /// `"--force"` / `"-f"` style display form, preferring the long name.
    pub fn primary_form(&self) -> String {
        match (&self.long_name, &self.short_name) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => String::new(),
        }
    }
}
