use std::fmt::{self, Debug, Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

use storauth_core::{Error, Result};

/// Declares an ordered set of single-character SAS flags.
///
/// The declaration order is the canonical emission order: a set always
/// renders its characters in that order, whatever order they were added in.
macro_rules! sas_flags {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$flag_meta:meta])*
                $flag:ident = $code:literal;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(u16);

        impl $name {
            $(
                $(#[$flag_meta])*
                pub const $flag: Self = Self(1 << Self::index_of($code));
            )+

            const CODES: &'static str = concat!($($code),+);

            const fn index_of(code: &str) -> usize {
                let codes = Self::CODES.as_bytes();
                let code = code.as_bytes()[0];
                let mut idx = 0;
                while codes[idx] != code {
                    idx += 1;
                }
                idx
            }

            /// The empty set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Every flag.
            pub const fn all() -> Self {
                Self((1 << Self::CODES.len()) - 1)
            }

            /// Whether no flag is set.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Whether every flag of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// `self` with every flag of `other` cleared.
            pub const fn without(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }

            /// Parse flag characters in any order; duplicates collapse.
            pub fn parse(s: &str) -> Result<Self> {
                s.chars().try_fold(Self::empty(), |acc, c| {
                    Self::from_code(c).map(|flag| acc | flag).ok_or_else(|| {
                        Error::signature_input(format!(
                            "unknown {} code {c:?} in {s:?}",
                            stringify!($name)
                        ))
                    })
                })
            }

            fn from_code(c: char) -> Option<Self> {
                Self::CODES
                    .chars()
                    .position(|code| code == c)
                    .map(|idx| Self(1 << idx))
            }

            /// Iterate over the set flags with their codes, in canonical order.
            fn codes(self) -> impl Iterator<Item = char> {
                Self::CODES
                    .chars()
                    .enumerate()
                    .filter(move |(idx, _)| self.0 & (1 << idx) != 0)
                    .map(|(_, c)| c)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl FromIterator<$name> for $name {
            fn from_iter<T: IntoIterator<Item = $name>>(iter: T) -> Self {
                iter.into_iter().fold(Self::empty(), |acc, v| acc | v)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                self.codes().try_for_each(|c| write!(f, "{c}"))
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self})", stringify!($name))
            }
        }
    };
}

sas_flags! {
    /// Operations a SAS grants.
    ///
    /// Displayed in account order `racwdlup`. Resource-level tokens render
    /// through [`Permissions::to_sas_string`] with their own order.
    Permissions {
        /// `r`
        READ = "r";
        /// `a`
        ADD = "a";
        /// `c`
        CREATE = "c";
        /// `w`
        WRITE = "w";
        /// `d`
        DELETE = "d";
        /// `l`
        LIST = "l";
        /// `u`
        UPDATE = "u";
        /// `p`
        PROCESS = "p";
    }
}

sas_flags! {
    /// Services an account SAS covers.
    Services {
        /// `b`
        BLOB = "b";
        /// `q`
        QUEUE = "q";
        /// `t`
        TABLE = "t";
        /// `f`
        FILE = "f";
    }
}

sas_flags! {
    /// Resource types an account SAS covers.
    ResourceTypes {
        /// `s`: service level APIs.
        SERVICE = "s";
        /// `c`: container, queue, table and share level APIs.
        CONTAINER = "c";
        /// `o`: blob, message, entity and file level APIs.
        OBJECT = "o";
    }
}

impl Permissions {
    /// Render the set in `order`, the canonical order of one SAS scope.
    ///
    /// Fails if the set holds a permission the scope doesn't define.
    pub fn to_sas_string(self, order: &str) -> Result<String> {
        let mut s = String::with_capacity(8);
        for c in self.codes() {
            if !order.contains(c) {
                return Err(Error::signature_input(format!(
                    "permission {c:?} is not valid for a scope accepting {order:?}"
                )));
            }
        }
        for c in order.chars() {
            if self.codes().any(|v| v == c) {
                s.push(c);
            }
        }

        Ok(s)
    }
}
