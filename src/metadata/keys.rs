//! Metadata key registry.
//!
//! Every key is a constant tying a [`KeyId`] to the Rust type its value is
//! read as. Adapters for other protocols extend the set with
//! [`KeyId::Custom`] keys of their own.

use std::fmt;
use std::marker::PhantomData;
use std::net::IpAddr;

/// Identity of a metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyId {
    Method,
    Host,
    Path,
    UserAgent,
    RemoteAddr,
    ContentLength,
    StatusCode,
    /// Protocol-specific key declared outside this crate.
    Custom(&'static str),
}

/// A value produced by an adapter, tagged with its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    U16(u16),
    U64(u64),
    Text(String),
    Ip(IpAddr),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::U16(v) => write!(f, "{}", v),
            MetadataValue::U64(v) => write!(f, "{}", v),
            MetadataValue::Text(v) => f.write_str(v),
            MetadataValue::Ip(v) => write!(f, "{}", v),
        }
    }
}

/// Rust types a [`MetadataKey`] can be declared with.
pub trait MetadataType: Sized {
    /// Returns `None` when the value has a different shape.
    fn from_value(value: MetadataValue) -> Option<Self>;

    fn into_value(self) -> MetadataValue;
}

impl MetadataType for u16 {
    fn from_value(value: MetadataValue) -> Option<Self> {
        match value {
            MetadataValue::U16(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> MetadataValue {
        MetadataValue::U16(self)
    }
}

impl MetadataType for u64 {
    fn from_value(value: MetadataValue) -> Option<Self> {
        match value {
            MetadataValue::U64(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> MetadataValue {
        MetadataValue::U64(self)
    }
}

impl MetadataType for String {
    fn from_value(value: MetadataValue) -> Option<Self> {
        match value {
            MetadataValue::Text(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> MetadataValue {
        MetadataValue::Text(self)
    }
}

impl MetadataType for IpAddr {
    fn from_value(value: MetadataValue) -> Option<Self> {
        match value {
            MetadataValue::Ip(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> MetadataValue {
        MetadataValue::Ip(self)
    }
}

/// A typed metadata key.
///
/// The type parameter is fixed by the constant's declaration, so
/// `try_get(response::STATUS_CODE)` can only ever yield a `u16`.
pub struct MetadataKey<T> {
    id: KeyId,
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> MetadataKey<T> {
    /// Declare a key. `name` is the attribute name tracers report it under.
    pub const fn new(id: KeyId, name: &'static str) -> Self {
        Self {
            id,
            name,
            _value: PhantomData,
        }
    }

    /// Identity used for lookups.
    pub const fn id(&self) -> KeyId {
        self.id
    }

    /// Semantic-convention attribute name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: MetadataType> MetadataKey<T> {
    /// Narrow an adapter's raw answer to this key's type.
    pub fn extract(&self, value: Option<MetadataValue>) -> Option<T> {
        value.and_then(T::from_value)
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for MetadataKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MetadataKey<T> {}

impl<T> PartialEq for MetadataKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for MetadataKey<T> {}

impl<T> fmt::Debug for MetadataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataKey")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Keys answered by request views.
pub mod request {
    use super::{KeyId, MetadataKey};
    use std::net::IpAddr;

    pub const METHOD: MetadataKey<String> = MetadataKey::new(KeyId::Method, "http.request.method");
    pub const HOST: MetadataKey<String> = MetadataKey::new(KeyId::Host, "server.address");
    pub const PATH: MetadataKey<String> = MetadataKey::new(KeyId::Path, "url.path");
    pub const USER_AGENT: MetadataKey<String> =
        MetadataKey::new(KeyId::UserAgent, "user_agent.original");
    pub const REMOTE_ADDR: MetadataKey<IpAddr> =
        MetadataKey::new(KeyId::RemoteAddr, "client.address");
    pub const CONTENT_LENGTH: MetadataKey<u64> =
        MetadataKey::new(KeyId::ContentLength, "http.request.body.size");
}

/// Keys answered by response views.
pub mod response {
    use super::{KeyId, MetadataKey};

    pub const STATUS_CODE: MetadataKey<u16> =
        MetadataKey::new(KeyId::StatusCode, "http.response.status_code");
    pub const CONTENT_LENGTH: MetadataKey<u64> =
        MetadataKey::new(KeyId::ContentLength, "http.response.body.size");
}
