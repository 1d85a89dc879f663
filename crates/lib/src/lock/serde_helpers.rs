//! Deserialization helpers preserving the document order of JSON objects.
//!
//! PHP encodes an empty associative array as `[]`, so object fields also
//! accept an empty JSON array.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, Error, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// A JSON object kept as key/value pairs in document order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
  fn default() -> Self {
    OrderedMap(Vec::new())
  }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
      type Value = OrderedMap<V>;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object or an empty array")
      }

      fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        if access.next_element::<IgnoredAny>()?.is_some() {
          return Err(A::Error::invalid_length(1, &self));
        }
        Ok(OrderedMap::default())
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
          entries.push((key, value));
        }
        Ok(OrderedMap(entries))
      }
    }

    deserializer.deserialize_any(OrderedVisitor(PhantomData))
  }
}

/// A value that composer allows as either a single string or a list.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

impl OneOrMany {
  pub fn into_vec(self) -> Vec<String> {
    match self {
      OneOrMany::One(s) => vec![s],
      OneOrMany::Many(v) => v,
    }
  }
}

/// A list of paths given either as a JSON array or as an object whose values are used.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum PathList {
  List(Vec<String>),
  Map(OrderedMap<String>),
}

impl Default for PathList {
  fn default() -> Self {
    PathList::List(Vec::new())
  }
}

impl PathList {
  pub fn into_vec(self) -> Vec<String> {
    match self {
      PathList::List(v) => v,
      PathList::Map(m) => m.0.into_iter().map(|(_, v)| v).collect(),
    }
  }
}
