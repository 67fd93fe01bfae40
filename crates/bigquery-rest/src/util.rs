//! Serde helpers for the quirks of the BigQuery wire format.

// used in `#[serde(skip_serializing_if = "util::is_false")]` attributes
#[inline]
pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

/// The API encodes 64 bit integers as JSON strings, since many JSON parsers
/// only handle `f64` precision. [`int64::optional`] goes on any such field
/// wrapped in an [`Option`].
pub(crate) mod int64 {
    use core::fmt;
    use core::marker::PhantomData;
    use core::str::FromStr;

    use serde::de;

    struct Int64Visitor<T>(PhantomData<fn(T)>);

    impl<T> Int64Visitor<T> {
        const fn new() -> Self {
            Self(PhantomData)
        }
    }

    impl<T> de::Visitor<'_> for Int64Visitor<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        type Value = T;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string encoded 64 bit integer")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.parse().map_err(de::Error::custom)
        }
    }

    struct AsString<'a, T>(&'a T);

    impl<T: fmt::Display> serde::Serialize for AsString<'_, T> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.collect_str(self.0)
        }
    }

    pub(crate) mod optional {
        use core::fmt;
        use core::str::FromStr;

        use serde::de;

        use super::{AsString, Int64Visitor};

        struct OptionalInt64Visitor<T>(Int64Visitor<T>);

        impl<'de, T> de::Visitor<'de> for OptionalInt64Visitor<T>
        where
            T: FromStr,
            T::Err: fmt::Display,
        {
            type Value = Option<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an optional string encoded 64 bit integer")
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(self.0).map(Some)
            }
        }

        pub(crate) fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
        where
            T: fmt::Display,
            S: serde::Serializer,
        {
            match value {
                Some(value) => serializer.serialize_some(&AsString(value)),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            T: FromStr,
            T::Err: fmt::Display,
            D: de::Deserializer<'de>,
        {
            deserializer.deserialize_option(OptionalInt64Visitor(Int64Visitor::new()))
        }
    }
}
