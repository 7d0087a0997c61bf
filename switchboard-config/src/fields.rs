//! Forgiving decoding of JSON objects into plain structs.
//!
//! Configuration documents and request bodies are decoded with these rules:
//!
//!  - The input must be a JSON object or `null`. Arrays, strings, numbers and booleans are
//!    rejected.
//!  - Object keys match field names case-insensitively. Unknown keys are ignored.
//!  - Keys are applied in order, so the last occurrence of a field wins. A repeated object is
//!    decoded into the value of its earlier occurrence, and a repeated array into the existing
//!    elements.
//!  - `null` leaves a field unchanged, except for lists, which it clears.
//!
//! Types opt in with the [`decode_fields!`](crate::decode_fields) macro, which also implements
//! [`Deserialize`] on top of [`DecodeInPlace`]:
//!
//! ```
//! #[derive(Debug, Default)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! switchboard_config::decode_fields!(Greeting { name });
//!
//! let greeting: Greeting = serde_json::from_str(r#"{"NAME": "Ada"}"#).unwrap();
//! assert_eq!(greeting.name, "Ada");
//! ```

use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

#[doc(hidden)]
pub use serde as __serde;

/// A value that can be updated from a deserializer.
pub trait DecodeInPlace {
    /// Decodes into `self`, keeping the current value where the input is `null`.
    fn decode_in_place<'de, D>(&mut self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>;
}

/// A struct decoded from the keys of a JSON object.
///
/// Implemented by [`decode_fields!`](crate::decode_fields).
pub trait DecodeFields {
    /// Expected input in error messages.
    const EXPECTING: &'static str;

    /// Consumes the value of `key` from `map`, assigning it if `key` names a field.
    fn decode_field<'de, A>(&mut self, key: &str, map: &mut A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>;
}

/// Returns `true` if an object key selects the given field name.
///
/// Field names are ASCII. Besides ASCII case, the Kelvin sign matches `k` and the long s matches
/// `s`, which fold to them.
pub fn key_matches(key: &str, field: &str) -> bool {
    let mut chars = key.chars();

    for expected in field.chars() {
        match chars.next() {
            Some(c) if folds_to(c, expected) => (),
            _ => return false,
        }
    }

    chars.next().is_none()
}

fn folds_to(c: char, expected: char) -> bool {
    c.eq_ignore_ascii_case(&expected)
        || matches!(
            (c, expected.to_ascii_lowercase()),
            ('\u{212A}', 'k') | ('\u{17F}', 's')
        )
}

/// Seed that decodes into an existing value.
pub struct InPlace<'a, T>(pub &'a mut T);

impl<'de, T: DecodeInPlace> DeserializeSeed<'de> for InPlace<'_, T> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        self.0.decode_in_place(deserializer)
    }
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl DecodeInPlace for $ty {
                fn decode_in_place<'de, D>(&mut self, deserializer: D) -> Result<(), D::Error>
                where
                    D: Deserializer<'de>,
                {
                    if let Some(value) = Option::<$ty>::deserialize(deserializer)? {
                        *self = value;
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar!(String, i64, bool);

struct ListVisitor<'a, T>(&'a mut Option<Vec<T>>);

impl<'de, T> Visitor<'de> for ListVisitor<'_, T>
where
    T: DecodeInPlace + Default,
{
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an array")
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        *self.0 = None;
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        let items = self.0.get_or_insert_with(Vec::new);
        let mut len = 0;

        loop {
            if len == items.len() {
                items.push(T::default());
            }

            if seq.next_element_seed(InPlace(&mut items[len]))?.is_none() {
                break;
            }
            len += 1;
        }

        items.truncate(len);
        Ok(())
    }
}

/// `None` stands for an absent list, which serializes as `null`.
impl<T> DecodeInPlace for Option<Vec<T>>
where
    T: DecodeInPlace + Default,
{
    fn decode_in_place<'de, D>(&mut self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ListVisitor(self))
    }
}

/// Visits a JSON object with the fields of `T`.
#[doc(hidden)]
pub struct FieldsVisitor<'a, T>(pub &'a mut T);

impl<'de, T: DecodeFields> Visitor<'de> for FieldsVisitor<'_, T> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(T::EXPECTING)
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(key) = map.next_key::<String>()? {
            self.0.decode_field(&key, &mut map)?;
        }
        Ok(())
    }
}

/// Consumes the value of an unknown key.
#[doc(hidden)]
pub fn skip_value<'de, A: MapAccess<'de>>(map: &mut A) -> Result<(), A::Error> {
    map.next_value::<de::IgnoredAny>().map(|_| ())
}

/// Deserializes a fresh `T` by decoding into its default value.
#[doc(hidden)]
pub fn deserialize_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DecodeInPlace + Default,
    D: Deserializer<'de>,
{
    let mut value = T::default();
    value.decode_in_place(deserializer)?;
    Ok(value)
}

/// Implements object decoding and [`Deserialize`] for a struct with named fields.
///
/// The struct must implement [`Default`], and every listed field must implement
/// [`DecodeInPlace`]. Fields are matched by their Rust name.
#[macro_export]
macro_rules! decode_fields {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::fields::DecodeFields for $ty {
            const EXPECTING: &'static str = concat!("a JSON object for ", stringify!($ty));

            fn decode_field<'de, A>(&mut self, key: &str, map: &mut A) -> Result<(), A::Error>
            where
                A: $crate::fields::__serde::de::MapAccess<'de>,
            {
                $(
                    if $crate::fields::key_matches(key, stringify!($field)) {
                        return map.next_value_seed($crate::fields::InPlace(&mut self.$field));
                    }
                )*
                $crate::fields::skip_value(map)
            }
        }

        impl $crate::fields::DecodeInPlace for $ty {
            fn decode_in_place<'de, D>(&mut self, deserializer: D) -> Result<(), D::Error>
            where
                D: $crate::fields::__serde::Deserializer<'de>,
            {
                deserializer.deserialize_any($crate::fields::FieldsVisitor(self))
            }
        }

        impl<'de> $crate::fields::__serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::fields::__serde::Deserializer<'de>,
            {
                $crate::fields::deserialize_default(deserializer)
            }
        }
    };
}
