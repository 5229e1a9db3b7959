//! The VCL value type taxonomy.

use std::fmt;

/// The closed set of VCL types.
///
/// `Id` is the type of bare identifiers that name declared objects
/// (backends, ACLs, tables, penaltyboxes, ratecounters) when they appear in
/// expression position. `Never` marks declarations that may not be read as
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VclType {
    /// 64-bit integer.
    Integer,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// String.
    String,
    /// IP address.
    Ip,
    /// Relative time (duration).
    Rtime,
    /// Absolute time.
    Time,
    /// A declared ACL.
    Acl,
    /// A declared backend or director.
    Backend,
    /// A bare identifier naming a declared object.
    Id,
    /// A value that may never be instantiated or read.
    Never,
}

impl VclType {
    /// Parses a declared type name (`INTEGER`, `STRING`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "INTEGER" => Some(Self::Integer),
            "FLOAT" => Some(Self::Float),
            "BOOL" => Some(Self::Bool),
            "STRING" => Some(Self::String),
            "IP" => Some(Self::Ip),
            "RTIME" => Some(Self::Rtime),
            "TIME" => Some(Self::Time),
            "ACL" => Some(Self::Acl),
            "BACKEND" => Some(Self::Backend),
            _ => None,
        }
    }

    /// The VCL spelling of this type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Bool => "BOOL",
            Self::String => "STRING",
            Self::Ip => "IP",
            Self::Rtime => "RTIME",
            Self::Time => "TIME",
            Self::Acl => "ACL",
            Self::Backend => "BACKEND",
            Self::Id => "ID",
            Self::Never => "NEVER",
        }
    }

    /// Returns `true` for the numeric kinds that order comparisons accept.
    ///
    /// Comparisons require both sides to share one of these kinds exactly;
    /// there is no implicit INTEGER/FLOAT widening.
    #[must_use]
    pub fn is_comparable_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Rtime)
    }
}

impl fmt::Display for VclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_declarable_names() {
        for name in [
            "INTEGER", "FLOAT", "BOOL", "STRING", "IP", "RTIME", "TIME", "ACL", "BACKEND",
        ] {
            assert_eq!(VclType::from_name(name).unwrap().name(), name);
        }
        assert!(VclType::from_name("VOID").is_none());
        assert!(VclType::from_name("string").is_none());
    }
}
