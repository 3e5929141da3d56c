//! String-backed enumerations shared by memory map entities.

macro_rules! xml_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            /// Not present in the document.
            #[default]
            Unspecified,
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Decode the element text; unknown values map to `Unspecified`.
            pub fn from_xml(text: &str) -> Self {
                match text.trim() {
                    $($text => $name::$variant,)+
                    _ => $name::Unspecified,
                }
            }

            /// Text written to the document, `None` when unspecified.
            pub fn as_xml(self) -> Option<&'static str> {
                match self {
                    $name::Unspecified => None,
                    $($name::$variant => Some($text),)+
                }
            }

            pub fn is_specified(self) -> bool {
                self != $name::Unspecified
            }
        }
    };
}

xml_enum! {
    /// Access rights of a block, register or field.
    Access {
        ReadWrite => "read-write",
        ReadOnly => "read-only",
        WriteOnly => "write-only",
        ReadWriteOnce => "read-writeOnce",
        WriteOnce => "writeOnce",
    }
}

xml_enum! {
    /// What an address block or bank is used for.
    Usage {
        Memory => "memory",
        Register => "register",
        Reserved => "reserved",
    }
}

xml_enum! {
    /// Tri-state boolean used for `spirit:volatile` on blocks and registers.
    BooleanValue {
        True => "true",
        False => "false",
    }
}

xml_enum! {
    /// Side effect of a write on a field.
    ModifiedWrite {
        OneToClear => "oneToClear",
        OneToSet => "oneToSet",
        OneToToggle => "oneToToggle",
        ZeroToClear => "zeroToClear",
        ZeroToSet => "zeroToSet",
        ZeroToToggle => "zeroToToggle",
        Clear => "clear",
        Set => "set",
        Modify => "modify",
    }
}

xml_enum! {
    /// Side effect of a read on a field.
    ReadAction {
        Clear => "clear",
        Set => "set",
        Modify => "modify",
    }
}

xml_enum! {
    /// Constraint placed on automated register tests.
    TestConstraint {
        Unconstrained => "unConstrained",
        Restore => "restore",
        WriteAsRead => "writeAsRead",
        ReadOnly => "readOnly",
    }
}

/// Whether an enumerated value applies to reads, writes or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumUsage {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl EnumUsage {
    pub fn from_xml(text: &str) -> Self {
        match text.trim() {
            "read" => EnumUsage::Read,
            "write" => EnumUsage::Write,
            _ => EnumUsage::ReadWrite,
        }
    }

    pub fn as_xml(self) -> &'static str {
        match self {
            EnumUsage::Read => "read",
            EnumUsage::Write => "write",
            EnumUsage::ReadWrite => "read-write",
        }
    }
}

/// `true`/`false` element text with a fallback for anything else.
pub fn parse_bool(text: &str, default: bool) -> bool {
    match text.trim() {
        "true" => true,
        "false" => false,
        _ => default,
    }
}

pub fn bool_to_xml(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_roundtrips_through_text() {
        for access in [
            Access::ReadWrite,
            Access::ReadOnly,
            Access::WriteOnly,
            Access::ReadWriteOnce,
            Access::WriteOnce,
        ] {
            let text = access.as_xml().expect("specified access has text");
            assert_eq!(Access::from_xml(text), access);
        }
        assert_eq!(Access::from_xml("read-mostly"), Access::Unspecified);
        assert_eq!(Access::Unspecified.as_xml(), None);
    }

    #[test]
    fn usage_and_test_constraint_text() {
        assert_eq!(Usage::from_xml(" reserved "), Usage::Reserved);
        assert_eq!(TestConstraint::from_xml("unConstrained"), TestConstraint::Unconstrained);
        assert_eq!(ModifiedWrite::OneToToggle.as_xml(), Some("oneToToggle"));
        assert!(!ReadAction::default().is_specified());
    }

    #[test]
    fn enum_usage_defaults_to_read_write() {
        assert_eq!(EnumUsage::from_xml(""), EnumUsage::ReadWrite);
        assert_eq!(EnumUsage::from_xml("write"), EnumUsage::Write);
        assert_eq!(EnumUsage::ReadWrite.as_xml(), "read-write");
    }

    #[test]
    fn lenient_booleans() {
        assert!(parse_bool("true", false));
        assert!(!parse_bool("nope", false));
        assert!(parse_bool("nope", true));
        assert_eq!(BooleanValue::from_xml("false").as_xml(), Some("false"));
    }
}
