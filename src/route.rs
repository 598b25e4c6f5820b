//! A compiled route: the flat matcher list a single registered pattern
//! compiles down to, plus the metadata the resolver needs without having to
//! re-walk the matcher list on every dispatch.

use crate::matcher::Matcher;

#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub id: u64,
    pub source_pattern: String,
    pub segments: Vec<Matcher>,
    /// Index into `segments` of the catch-all parameter, if the pattern
    /// ends in one.
    pub catch_all_index: Option<usize>,
    /// Total specificity score, sum of each segment's `Matcher::specificity`.
    pub specificity: u32,
}

impl CompiledRoute {
    pub fn new(id: u64, source_pattern: String, segments: Vec<Matcher>) -> Self {
        let catch_all_index = segments.iter().position(|m| {
            matches!(m, Matcher::Parameter(p) if p.is_catch_all)
        });
        let specificity = segments.iter().map(Matcher::specificity).sum();
        Self {
            id,
            source_pattern,
            segments,
            catch_all_index,
            specificity,
        }
    }

    pub fn literal_prefix(&self) -> Vec<&str> {
        self.segments
            .iter()
            .take_while(|m| matches!(m, Matcher::Literal(_)))
            .map(|m| match m {
                Matcher::Literal(l) => l.value.as_str(),
                _ => unreachable!(),
            })
            .collect()
    }

    /// Literal and parameter matchers in declaration order, options
    /// excluded (options are order-independent at match time).
    pub fn positional_segments(&self) -> impl Iterator<Item = &Matcher> {
        self.segments
            .iter()
            .filter(|m| !matches!(m, Matcher::Option(_)))
    }

    pub fn options(&self) -> impl Iterator<Item = &crate::matcher::OptionMatcher> {
        self.segments.iter().filter_map(|m| match m {
            Matcher::Option(o) => Some(o),
            _ => None,
        })
    }

    pub fn positionals(&self) -> impl Iterator<Item = &crate::matcher::ParameterMatcher> {
        self.segments.iter().filter_map(|m| match m {
            Matcher::Parameter(p) => Some(p),
            _ => None,
        })
    }
}
