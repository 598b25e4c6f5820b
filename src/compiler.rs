//! Lowers a [`PatternAst`] into a [`CompiledRoute`]. Pure and infallible:
//! the invariants that could make compilation fail (single catch-all,
//! catch-all last, unique option aliases) are already enforced by
//! [`crate::parser`], so this stage only classifies segments and computes
//! specificity.

use crate::ast::{OptionNode, ParameterNode, PatternAst, SegmentNode};
use crate::matcher::{LiteralMatcher, Matcher, OptionMatcher, ParameterMatcher};
use crate::route::CompiledRoute;

/// Built-in type names the converter registry is guaranteed to supply.
/// An identifier outside this list is not an error here — it is assumed to
/// name a custom converter the resolver will look up at bind time.
pub const BUILTIN_TYPES: &[&str] = &[
    "string",
    "int",
    "long",
    "double",
    "decimal",
    "bool",
    "datetime",
    "guid",
    "timespan",
    "fileinfo",
    "directoryinfo",
    "uri",
    "ipaddress",
    "dateonly",
    "timeonly",
];

pub fn compile(ast: &PatternAst, id: u64, source_pattern: impl Into<String>) -> CompiledRoute {
    let segments = ast.segments.iter().map(lower_segment).collect();
    CompiledRoute::new(id, source_pattern.into(), segments)
}

fn lower_segment(node: &SegmentNode) -> Matcher {
    match node {
        SegmentNode::Literal { value, .. } => Matcher::Literal(LiteralMatcher {
            value: value.clone(),
        }),
        SegmentNode::Parameter(p) => Matcher::Parameter(lower_parameter(p)),
        SegmentNode::Option(o) => Matcher::Option(lower_option(o)),
    }
}

fn lower_parameter(p: &ParameterNode) -> ParameterMatcher {
    ParameterMatcher {
        name: p.name.clone(),
        type_constraint: p.type_constraint.clone(),
        is_catch_all: p.is_catch_all,
        is_optional: p.is_optional,
    }
}

fn lower_option(o: &OptionNode) -> OptionMatcher {
    OptionMatcher {
        long_name: o.long_name.clone(),
        short_name: o.short_name.clone(),
        value_param: o.value_param.as_ref().map(lower_parameter),
        is_repeated: o.is_repeated,
    }
}
