//! Macros for use in rdata definitions.
//!
//! These macros are not public but are used by the super module only. They
//! are here so that `mod.rs` doesn’t become too unwieldly.

//------------ zone_record_data ----------------------------------------------

/// Creates the enum collecting the record data of all supported types.
macro_rules! zone_record_data {
    ( $( $(#[$attr:meta])* $rtype:ident => $variant:ident, )* ) => {
        //------------- ZoneRecordData ---------------------------------------

        /// Record data for all record types allowed in zone files.
        ///
        /// This enum collects the record data types for all record types
        /// the zone engine interprets. The data of all other types is kept
        /// as [`UnknownRecordData`].
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub enum ZoneRecordData {
            $( $(#[$attr])* $variant($variant), )*

            /// The data of a record type not interpreted by the engine.
            Unknown(UnknownRecordData),
        }

        impl ZoneRecordData {
            /// Scans the record data for the given record type.
            ///
            /// Record types without a dedicated type are scanned into
            /// [`UnknownRecordData`], which keeps the tokens as they are.
            pub fn scan<S: Scanner + ?Sized>(
                rtype: Rtype,
                scanner: &mut S,
            ) -> Result<Self, ScanError> {
                match rtype {
                    $(
                        Rtype::$rtype => {
                            $variant::scan(scanner).map(ZoneRecordData::$variant)
                        }
                    )*
                    _ => {
                        UnknownRecordData::scan(rtype, scanner)
                            .map(ZoneRecordData::Unknown)
                    }
                }
            }
        }

        //--- From

        $(
            impl From<$variant> for ZoneRecordData {
                fn from(value: $variant) -> Self {
                    ZoneRecordData::$variant(value)
                }
            }
        )*

        impl From<UnknownRecordData> for ZoneRecordData {
            fn from(value: UnknownRecordData) -> Self {
                ZoneRecordData::Unknown(value)
            }
        }

        //--- RecordData

        impl RecordData for ZoneRecordData {
            fn rtype(&self) -> Rtype {
                match *self {
                    $( ZoneRecordData::$variant(ref inner) => inner.rtype(), )*
                    ZoneRecordData::Unknown(ref inner) => inner.rtype(),
                }
            }

            fn to_lowercase(&self) -> Self {
                match *self {
                    $(
                        ZoneRecordData::$variant(ref inner) => {
                            ZoneRecordData::$variant(inner.to_lowercase())
                        }
                    )*
                    ZoneRecordData::Unknown(ref inner) => {
                        ZoneRecordData::Unknown(inner.to_lowercase())
                    }
                }
            }
        }

        //--- Display

        impl core::fmt::Display for ZoneRecordData {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                match *self {
                    $(
                        ZoneRecordData::$variant(ref inner) => {
                            core::fmt::Display::fmt(inner, f)
                        }
                    )*
                    ZoneRecordData::Unknown(ref inner) => {
                        core::fmt::Display::fmt(inner, f)
                    }
                }
            }
        }
    };
}

//------------ name_type -----------------------------------------------------

/// Creates a record data type that consists of a single domain name.
macro_rules! name_type {
    ( $(#[$attr:meta])* ( $target:ident, $rtype:ident, $field:ident,
                          $into_field:ident ) ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $target {
            $field: Name,
        }

        impl $target {
            pub fn new($field: Name) -> Self {
                $target { $field }
            }

            pub fn $field(&self) -> &Name {
                &self.$field
            }

            pub fn $into_field(self) -> Name {
                self.$field
            }

            pub fn scan<S: Scanner + ?Sized>(
                scanner: &mut S,
            ) -> Result<Self, ScanError> {
                scanner.scan_name().map(Self::new)
            }
        }

        //--- FromStr

        impl core::str::FromStr for $target {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<Name>().map(Self::new)
            }
        }

        //--- RecordData

        impl RecordData for $target {
            fn rtype(&self) -> Rtype {
                Rtype::$rtype
            }

            fn to_lowercase(&self) -> Self {
                Self::new(self.$field.to_lowercase())
            }
        }

        //--- Display

        impl core::fmt::Display for $target {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, "{}", self.$field)
            }
        }
    };
}
