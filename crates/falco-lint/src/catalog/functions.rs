//! Built-in function signatures.
//!
//! Arguments are either plain typed values or references to declared
//! objects (tables, ACLs, backends, penaltyboxes, ratecounters) passed by
//! bare identifier, plus regex pattern strings which get syntactic
//! validation when written as literals.

use crate::types::VclType;

/// What a function argument position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A plain value of the given type (fuzzy string rules apply).
    Value(VclType),
    /// A declared table, by bare identifier.
    TableName,
    /// A declared ACL, by bare identifier.
    AclName,
    /// A declared backend or director, by bare identifier.
    BackendName,
    /// A declared penaltybox, by bare identifier.
    PenaltyboxName,
    /// A declared ratecounter, by bare identifier.
    RatecounterName,
    /// A regex pattern string; literals are syntax-checked.
    Regex,
}

impl ArgKind {
    /// Human-readable description for diagnostics.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Value(ty) => ty.name(),
            Self::TableName => "table identifier",
            Self::AclName => "acl identifier",
            Self::BackendName => "backend identifier",
            Self::PenaltyboxName => "penaltybox identifier",
            Self::RatecounterName => "ratecounter identifier",
            Self::Regex => "regex STRING",
        }
    }
}

/// A built-in function signature.
#[derive(Debug, Clone, Copy)]
pub struct FunctionEntry {
    /// Dotted function name.
    pub name: &'static str,
    /// All argument positions, required first.
    pub args: &'static [ArgKind],
    /// How many of `args` are required.
    pub required: usize,
    /// Accepts any number of further arguments of this kind.
    pub variadic: Option<ArgKind>,
    /// Return type; `None` for void functions, which are only callable as
    /// statements.
    pub returns: Option<VclType>,
}

use ArgKind::Value;
use VclType::{Backend, Bool, Float, Integer, Ip, Rtime, String, Time};

const S: ArgKind = Value(String);
const I: ArgKind = Value(Integer);
const F: ArgKind = Value(Float);
const T: ArgKind = Value(Time);
const R: ArgKind = Value(Rtime);

macro_rules! func {
    ($name:literal, [$($arg:expr),*], $required:expr, $returns:expr) => {
        FunctionEntry {
            name: $name,
            args: &[$($arg),*],
            required: $required,
            variadic: None,
            returns: $returns,
        }
    };
}

/// The built-in function table.
pub const FUNCTIONS: &[FunctionEntry] = &[
    func!("addr.is_ipv4", [Value(Ip)], 1, Some(Bool)),
    func!("addr.is_ipv6", [Value(Ip)], 1, Some(Bool)),
    func!("digest.base64", [S], 1, Some(String)),
    func!("digest.base64_decode", [S], 1, Some(String)),
    func!("digest.base64url", [S], 1, Some(String)),
    func!("digest.base64url_decode", [S], 1, Some(String)),
    func!("digest.hash_md5", [S], 1, Some(String)),
    func!("digest.hash_sha1", [S], 1, Some(String)),
    func!("digest.hash_sha256", [S], 1, Some(String)),
    func!("digest.hash_sha512", [S], 1, Some(String)),
    func!("digest.hmac_sha256", [S, S], 2, Some(String)),
    FunctionEntry {
        name: "h2.disable_header_compression",
        args: &[S],
        required: 1,
        variadic: Some(S),
        returns: None,
    },
    func!("h2.push", [S], 1, None),
    func!("http_status_matches", [I, S], 2, Some(Bool)),
    func!("json.escape", [S], 1, Some(String)),
    func!("math.ceil", [F], 1, Some(Float)),
    func!("math.floor", [F], 1, Some(Float)),
    func!("math.pow", [F, F], 2, Some(Float)),
    func!("parse_time_delta", [S], 1, Some(Rtime)),
    func!("querystring.add", [S, S, S], 3, Some(String)),
    func!("querystring.clean", [S], 1, Some(String)),
    FunctionEntry {
        name: "querystring.filter",
        args: &[S, S],
        required: 2,
        variadic: Some(S),
        returns: Some(String),
    },
    FunctionEntry {
        name: "querystring.filter_except",
        args: &[S, S],
        required: 2,
        variadic: Some(S),
        returns: Some(String),
    },
    func!("querystring.filtersep", [], 0, Some(String)),
    func!("querystring.get", [S, S], 2, Some(String)),
    func!("querystring.globfilter", [S, S], 2, Some(String)),
    func!("querystring.globfilter_except", [S, S], 2, Some(String)),
    func!("querystring.regfilter", [S, ArgKind::Regex], 2, Some(String)),
    func!("querystring.regfilter_except", [S, ArgKind::Regex], 2, Some(String)),
    func!("querystring.remove", [S], 1, Some(String)),
    func!("querystring.set", [S, S, S], 3, Some(String)),
    func!("querystring.sort", [S], 1, Some(String)),
    func!("randombool", [I, I], 2, Some(Bool)),
    func!("randombool_seeded", [I, I, I], 3, Some(Bool)),
    func!("randomint", [I, I], 2, Some(Integer)),
    func!("randomint_seeded", [I, I, I], 3, Some(Integer)),
    func!("randomstr", [I, S], 1, Some(String)),
    func!(
        "ratelimit.check_rate",
        [S, ArgKind::RatecounterName, I, I, I, ArgKind::PenaltyboxName, R],
        7,
        Some(Bool)
    ),
    func!(
        "ratelimit.check_rates",
        [
            S,
            ArgKind::RatecounterName,
            I,
            I,
            I,
            ArgKind::RatecounterName,
            I,
            I,
            I,
            ArgKind::PenaltyboxName,
            R
        ],
        11,
        Some(Bool)
    ),
    func!(
        "ratelimit.penaltybox_add",
        [ArgKind::PenaltyboxName, S, R],
        3,
        None
    ),
    func!(
        "ratelimit.penaltybox_has",
        [ArgKind::PenaltyboxName, S],
        2,
        Some(Bool)
    ),
    func!(
        "ratelimit.ratecounter_increment",
        [ArgKind::RatecounterName, I],
        1,
        Some(Integer)
    ),
    func!("regsub", [S, ArgKind::Regex, S], 3, Some(String)),
    func!("regsuball", [S, ArgKind::Regex, S], 3, Some(String)),
    func!("std.anystr2ip", [S, S], 2, Some(Ip)),
    func!("std.atof", [S], 1, Some(Float)),
    func!("std.atoi", [S], 1, Some(Integer)),
    func!("std.basename", [S], 1, Some(String)),
    func!("std.collect", [S, S], 1, None),
    func!("std.dirname", [S], 1, Some(String)),
    func!("std.ip", [S, S], 2, Some(Ip)),
    func!("std.ip2str", [Value(Ip)], 1, Some(String)),
    func!("std.itoa", [I, I], 1, Some(String)),
    func!("std.itoa_charset", [I, S], 2, Some(String)),
    func!("std.prefixof", [S, S], 2, Some(Bool)),
    func!("std.replace", [S, S, S], 3, Some(String)),
    func!("std.replace_prefix", [S, S, S], 3, Some(String)),
    func!("std.replace_suffix", [S, S, S], 3, Some(String)),
    func!("std.replaceall", [S, S, S], 3, Some(String)),
    func!("std.strlen", [S], 1, Some(Integer)),
    func!("std.strpad", [S, I, S], 3, Some(String)),
    func!("std.strrep", [S, I], 2, Some(String)),
    func!("std.strrev", [S], 1, Some(String)),
    func!("std.strstr", [S, S], 2, Some(String)),
    func!("std.strtof", [S, I], 2, Some(Float)),
    func!("std.strtol", [S, I], 2, Some(Integer)),
    func!("std.suffixof", [S, S], 2, Some(Bool)),
    func!("std.time", [S, T], 2, Some(Time)),
    func!("std.tolower", [S], 1, Some(String)),
    func!("std.toupper", [S], 1, Some(String)),
    func!("strftime", [S, T], 2, Some(String)),
    func!("subfield", [S, S, S], 2, Some(String)),
    func!("substr", [S, I, I], 2, Some(String)),
    func!("table.contains", [ArgKind::TableName, S], 2, Some(Bool)),
    func!("table.lookup", [ArgKind::TableName, S, S], 2, Some(String)),
    func!(
        "table.lookup_backend",
        [ArgKind::TableName, S, ArgKind::BackendName],
        3,
        Some(Backend)
    ),
    func!(
        "table.lookup_bool",
        [ArgKind::TableName, S, Value(Bool)],
        3,
        Some(Bool)
    ),
    func!(
        "table.lookup_float",
        [ArgKind::TableName, S, F],
        3,
        Some(Float)
    ),
    func!(
        "table.lookup_integer",
        [ArgKind::TableName, S, I],
        3,
        Some(Integer)
    ),
    func!(
        "table.lookup_rtime",
        [ArgKind::TableName, S, R],
        3,
        Some(Rtime)
    ),
    func!("time.add", [T, R], 2, Some(Time)),
    func!("time.is_after", [T, T], 2, Some(Bool)),
    func!("time.sub", [T, R], 2, Some(Time)),
    func!("urldecode", [S], 1, Some(String)),
    func!("urlencode", [S], 1, Some(String)),
    func!("uuid.dns", [], 0, Some(String)),
    func!("uuid.is_valid", [S], 1, Some(Bool)),
    func!("uuid.url", [], 0, Some(String)),
    func!("uuid.version3", [S, S], 2, Some(String)),
    func!("uuid.version4", [], 0, Some(String)),
    func!("uuid.version5", [S, S], 2, Some(String)),
    func!("xml_escape", [S], 1, Some(String)),
];

/// Looks up a built-in function by name.
#[must_use]
pub fn function(name: &str) -> Option<&'static FunctionEntry> {
    FUNCTIONS.iter().find(|entry| entry.name == name)
}
