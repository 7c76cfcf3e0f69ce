//! Closed-set enumerations stored as text.

/// Declares an enumeration stored as one of a fixed set of strings.
///
/// The generated type implements [`FieldCodec`](crate::codec::FieldCodec).
/// Decoding a string outside the declared set fails with
/// [`DecodeError::UnknownVariant`](crate::error::DecodeError::UnknownVariant);
/// there is no fallback variant.
///
/// ```
/// use hris_persistence::codec::{FieldCodec, StoredValue};
/// use hris_persistence::stored_enum;
///
/// stored_enum! {
///     /// How an interview is held.
///     pub enum InterviewFormat {
///         Onsite => "onsite",
///         Video => "video",
///     }
/// }
///
/// assert_eq!(InterviewFormat::Video.encode(), StoredValue::from("video"));
/// assert!(InterviewFormat::decode("format", &StoredValue::from("phone")).is_err());
/// ```
#[macro_export]
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Looks up a variant by its stored representation.
            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::codec::FieldCodec for $name {
            const SQL_TYPE: $crate::codec::SqlType = $crate::codec::SqlType::Text;

            fn encode(&self) -> $crate::codec::StoredValue {
                $crate::codec::StoredValue::Text(self.as_str().to_string())
            }

            fn decode(
                column: &str,
                value: &$crate::codec::StoredValue,
            ) -> ::std::result::Result<Self, $crate::error::DecodeError> {
                let text = $crate::codec::expect_text(column, value)?;
                Self::parse(text).ok_or_else(|| $crate::error::DecodeError::UnknownVariant {
                    column: column.to_string(),
                    value: text.to_string(),
                })
            }
        }
    };
}
