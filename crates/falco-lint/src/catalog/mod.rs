//! The predefined variable and built-in function catalog.
//!
//! Lookup is exact match against the static tables, with wildcard handling
//! for the HTTP header families (`req.http.*`, ...), the positional regex
//! captures (`re.group.N`) and ratecounter bucket reads
//! (`ratecounter.<name>.bucket.<window>`).

mod functions;
mod variables;

pub use functions::{function, ArgKind, FunctionEntry, FUNCTIONS};
pub use variables::{BUCKET_DURATIONS, HEADER_FAMILIES, VARIABLES};

use smol_str::SmolStr;

use crate::phase::PhaseSet;
use crate::types::VclType;

/// A resolved predefined variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    /// The variable's type.
    pub ty: VclType,
    /// Phases the variable is readable in.
    pub get: PhaseSet,
    /// Phases the variable is writable in.
    pub set: PhaseSet,
    /// Phases the variable can be unset in.
    pub unset: PhaseSet,
    /// Fuzzy string-view capability.
    pub string_view: bool,
    /// The header name when this is an `*.http.*` access.
    pub http_header: Option<SmolStr>,
}

/// The result of looking up a dotted variable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableLookup {
    /// A predefined variable or HTTP header.
    Variable(VariableRef),
    /// A `re.group.N` capture read.
    ReGroup {
        /// The capture index.
        index: u32,
    },
    /// A `ratecounter.<name>.bucket.<window>` read.
    RatecounterBucket {
        /// The ratecounter name.
        counter: SmolStr,
        /// The window part (`10s`, ...), not yet validated.
        window: SmolStr,
    },
    /// Not a predefined variable.
    NotFound,
}

/// Resolves a dotted variable path against the catalog.
#[must_use]
pub fn lookup_variable(path: &str) -> VariableLookup {
    if let Some(entry) = VARIABLES.iter().find(|entry| entry.name == path) {
        return VariableLookup::Variable(VariableRef {
            ty: entry.ty,
            get: PhaseSet::from_bits(entry.get),
            set: PhaseSet::from_bits(entry.set),
            unset: PhaseSet::from_bits(entry.unset),
            string_view: entry.string_view,
            http_header: None,
        });
    }

    for family in HEADER_FAMILIES {
        if let Some(header) = path.strip_prefix(family.prefix) {
            if header.is_empty() {
                break;
            }
            return VariableLookup::Variable(VariableRef {
                ty: VclType::String,
                get: PhaseSet::from_bits(family.get),
                set: PhaseSet::from_bits(family.set),
                unset: PhaseSet::from_bits(family.unset),
                // Headers are nullable strings; they read fine anywhere a
                // string does.
                string_view: true,
                http_header: Some(SmolStr::new(header)),
            });
        }
    }

    if let Some(index) = path.strip_prefix("re.group.") {
        if let Ok(index) = index.parse::<u32>() {
            if index <= 10 {
                return VariableLookup::ReGroup { index };
            }
        }
        return VariableLookup::NotFound;
    }

    if let Some(rest) = path.strip_prefix("ratecounter.") {
        if let Some((counter, window)) = rest.split_once(".bucket.") {
            return VariableLookup::RatecounterBucket {
                counter: SmolStr::new(counter),
                window: SmolStr::new(window),
            };
        }
    }

    VariableLookup::NotFound
}

/// Returns true if the bucket window is one of the supported durations.
#[must_use]
pub fn is_valid_bucket_window(window: &str) -> bool {
    BUCKET_DURATIONS.contains(&window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    #[test]
    fn test_exact_lookup() {
        let VariableLookup::Variable(backend) = lookup_variable("req.backend") else {
            panic!("req.backend should resolve");
        };
        assert_eq!(backend.ty, VclType::Backend);
        assert!(backend.string_view);
        assert!(backend.set.contains(Phase::Recv));

        let VariableLookup::Variable(ploss) = lookup_variable("client.socket.ploss") else {
            panic!("client.socket.ploss should resolve");
        };
        assert_eq!(ploss.ty, VclType::Float);
        assert!(ploss.string_view);
    }

    #[test]
    fn test_header_wildcards() {
        let VariableLookup::Variable(header) = lookup_variable("req.http.X-Custom") else {
            panic!("req.http.* should resolve");
        };
        assert_eq!(header.ty, VclType::String);
        assert_eq!(header.http_header.as_deref(), Some("X-Custom"));
        assert!(header.unset.contains(Phase::Recv));

        let VariableLookup::Variable(resp) = lookup_variable("resp.http.Server") else {
            panic!("resp.http.* should resolve");
        };
        assert!(resp.get.contains(Phase::Log));
        assert!(!resp.get.contains(Phase::Recv));
    }

    #[test]
    fn test_header_subfield_is_part_of_the_header() {
        let VariableLookup::Variable(header) =
            lookup_variable("beresp.http.Edge-Control:cache-maxage")
        else {
            panic!("header subfield should resolve");
        };
        assert_eq!(
            header.http_header.as_deref(),
            Some("Edge-Control:cache-maxage")
        );
    }

    #[test]
    fn test_unknown_variables() {
        assert_eq!(lookup_variable("req.unknwon.Host"), VariableLookup::NotFound);
        assert_eq!(
            lookup_variable("fastly_info.h2.undefined"),
            VariableLookup::NotFound
        );
        assert_eq!(lookup_variable("req.http."), VariableLookup::NotFound);
    }

    #[test]
    fn test_re_group() {
        assert_eq!(lookup_variable("re.group.1"), VariableLookup::ReGroup { index: 1 });
        assert_eq!(lookup_variable("re.group.10"), VariableLookup::ReGroup { index: 10 });
        assert_eq!(lookup_variable("re.group.11"), VariableLookup::NotFound);
        assert_eq!(lookup_variable("re.group.x"), VariableLookup::NotFound);
    }

    #[test]
    fn test_ratecounter_bucket() {
        let VariableLookup::RatecounterBucket { counter, window } =
            lookup_variable("ratecounter.counter_60.bucket.10s")
        else {
            panic!("bucket read should resolve");
        };
        assert_eq!(counter.as_str(), "counter_60");
        assert!(is_valid_bucket_window(&window));
        assert!(!is_valid_bucket_window("100s"));
    }

    #[test]
    fn test_function_lookup() {
        let substr = function("substr").unwrap();
        assert_eq!(substr.required, 2);
        assert_eq!(substr.args.len(), 3);

        let check_rate = function("ratelimit.check_rate").unwrap();
        assert_eq!(check_rate.args.len(), 7);
        assert_eq!(check_rate.args[1], ArgKind::RatecounterName);
        assert_eq!(check_rate.args[5], ArgKind::PenaltyboxName);

        assert!(function("undefined_function").is_none());
    }

    #[test]
    fn test_catalog_has_no_duplicate_names() {
        let mut names: Vec<_> = VARIABLES.iter().map(|entry| entry.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), VARIABLES.len());

        let mut functions: Vec<_> = FUNCTIONS.iter().map(|entry| entry.name).collect();
        functions.sort_unstable();
        functions.dedup();
        assert_eq!(functions.len(), FUNCTIONS.len());
    }
}
