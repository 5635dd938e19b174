//! Macros for the IANA parameter types.

/// Defines a parameter type wrapping an integer.
///
/// Each listed value becomes an associated constant with its mnemonic
/// kept in a table for conversion from and to text.
macro_rules! int_enum {
    ( $(#[$attr:meta])* =>
      $ianatype:ident, $inttype:path;
      $( $(#[$variant_attr:meta])* ( $variant:ident =>
                                        $value:expr, $mnemonic:expr) )* ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $ianatype($inttype);

        impl $ianatype {
            $(
                $(#[$variant_attr])*
                pub const $variant: $ianatype = $ianatype($value);
            )*

            /// The values with a mnemonic.
            const MNEMONICS: &'static [($ianatype, &'static str)] = &[
                $( ($ianatype::$variant, $mnemonic), )*
            ];

            #[must_use]
            pub const fn from_int(value: $inttype) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn to_int(self) -> $inttype {
                self.0
            }

            /// Returns the value for a mnemonic, ignoring ASCII case.
            #[must_use]
            pub fn from_mnemonic(m: &[u8]) -> Option<Self> {
                Self::MNEMONICS
                    .iter()
                    .find(|(_, name)| m.eq_ignore_ascii_case(name.as_bytes()))
                    .map(|(value, _)| *value)
            }

            /// Returns the mnemonic of the value if it has one.
            #[must_use]
            pub fn to_mnemonic_str(self) -> Option<&'static str> {
                Self::MNEMONICS
                    .iter()
                    .find(|(value, _)| *value == self)
                    .map(|(_, name)| *name)
            }
        }

        impl From<$inttype> for $ianatype {
            fn from(value: $inttype) -> Self {
                $ianatype(value)
            }
        }

        impl From<$ianatype> for $inttype {
            fn from(value: $ianatype) -> Self {
                value.0
            }
        }

        impl core::fmt::Debug for $ianatype {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match self.to_mnemonic_str() {
                    Some(name) => {
                        write!(f, concat!(stringify!($ianatype), "::{}"), name)
                    }
                    None => f
                        .debug_tuple(stringify!($ianatype))
                        .field(&self.0)
                        .finish(),
                }
            }
        }
    }
}

/// Adds text conversion to a parameter type.
///
/// Values without a mnemonic are written as the prefix followed by the
/// decimal value, for instance `TYPE65280`, and are read back the same
/// way. With the `serde` feature, values are (de)serialized as text.
macro_rules! int_enum_str_with_prefix {
    ($ianatype:ident, $str_prefix:expr, $inttype:ident, $error:expr) => {
        impl core::str::FromStr for $ianatype {
            type Err = FromStrError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Some(res) = $ianatype::from_mnemonic(s.as_bytes()) {
                    return Ok(res);
                }
                let prefix_len = $str_prefix.len();
                match s.get(..prefix_len) {
                    Some(prefix) if prefix.eq_ignore_ascii_case($str_prefix) => {
                        s[prefix_len..]
                            .parse::<$inttype>()
                            .map($ianatype)
                            .map_err(|_| FromStrError(()))
                    }
                    _ => Err(FromStrError(())),
                }
            }
        }

        impl core::fmt::Display for $ianatype {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match self.to_mnemonic_str() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}{}", $str_prefix, self.0),
                }
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $ianatype {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $ianatype {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let s = <std::string::String as serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        /// A string couldn’t be converted into a value.
        #[derive(Clone, Debug)]
        pub struct FromStrError(());

        impl std::error::Error for FromStrError {}

        impl core::fmt::Display for FromStrError {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.write_str($error)
            }
        }
    };
}
