//! Segment-level matchers produced by [`crate::compiler`] from a
//! [`crate::ast::PatternAst`]. A [`crate::route::CompiledRoute`] is a flat
//! list of these plus the metadata the resolver needs to score and bind a
//! match.

#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    Literal(LiteralMatcher),
    Parameter(ParameterMatcher),
    Option(OptionMatcher),
}

impl Matcher {
    pub fn specificity(&self) -> u32 {
        match self {
            Matcher::Literal(_) => 100,
            Matcher::Parameter(p) => {
                if p.is_catch_all {
                    1
                } else if p.is_optional {
                    5
                } else if p.type_constraint.is_some() {
                    20
                } else {
                    10
                }
            }
            Matcher::Option(o) => {
                let value_required = o
                    .value_param
                    .as_ref()
                    .map(|p| !p.is_optional)
                    .unwrap_or(false);
                if value_required {
                    50
                } else {
                    25
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMatcher {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMatcher {
    pub name: String,
    pub type_constraint: Option<String>,
    pub is_catch_all: bool,
    pub is_optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionMatcher {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub value_param: Option<ParameterMatcher>,
    pub is_repeated: bool,
}

impl OptionMatcher {
    pub fn matches_token(&self, token: &str) -> bool {
        match (&self.long_name, &self.short_name) {
            (Some(long), Some(short)) => {
                token == format!("--{long}") || token == format!("-{short}")
            }
            (Some(long), None) => token == format!("--{long}"),
            (None, Some(short)) => token == format!("-{short}"),
            (None, None) => false,
        }
    }

    pub fn primary_form(&self) -> String {
        match (&self.long_name, &self.short_name) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => String::new(),
        }
    }
}
