#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};
use core::fmt::Debug;

/// The closed set of backend column type ids a [`SqlClient`] result set is
/// mapped into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BackendTypeId {
    /// `boolean`
    Boolean,
    /// `bigint`
    BigInt,
    /// `smallint`
    SmallInt,
    /// `integer`
    Integer,
    /// `text`
    Text,
    /// `real`
    Real,
    /// `double`
    Double,
    /// `varchar`
    Varchar,
    /// `date`
    Date,
    /// `timestamp`
    Timestamp,
    /// `timestamptz`
    TimestampTz,
    /// `uuid`
    Uuid,
    /// `jsonb`
    Jsonb,
    /// Anything not in the closed set above.
    Unknown,
}

/// One column-named row returned from a [`SqlClient::query`] call. The
/// core never inspects these values; they pass through to the caller.
pub trait ResultRow: Debug {
    /// The column names, in result order.
    fn columns(&self) -> &[String];
}

/// A single already-open backend connection. The core never constructs
/// one -- it is handed an implementation by the embedding process, per
/// the stated out-of-scope boundary on connection pooling and transport.
pub trait SqlClient {
    /// The row type returned from [`query`](SqlClient::query).
    type Row: ResultRow;
    /// The error type raised by this backend.
    type Error: Debug;

    /// Sets a statement-level timeout for the next query issued on this
    /// client, in milliseconds.
    fn set_statement_timeout(&mut self, timeout_ms: u64) -> Result<(), Self::Error>;

    /// Issues a parameterized statement (positional `$n` placeholders)
    /// and returns the resulting rows.
    fn query(&mut self, sql: &str, params: &[String]) -> Result<Vec<Self::Row>, Self::Error>;
}

/// A pool of already-open [`SqlClient`] connections. Out of scope: the
/// core only consumes this trait, it never implements pooling itself.
pub trait ConnectionPool {
    /// The client type handed out by [`connect`](ConnectionPool::connect).
    type Client: SqlClient;
    /// The error type raised acquiring a connection.
    type Error: Debug;

    /// Acquires a connection from the pool.
    fn connect(&self) -> Result<Self::Client, Self::Error>;
}

/// A cached query result, keyed by a stable serialization of the query
/// plus its execution context.
#[derive(Clone, Debug)]
pub struct CachedResult<T> {
    /// The cached value.
    pub result: T,
    /// Unix-epoch milliseconds the entry was created.
    pub created_at: u64,
    /// Unix-epoch milliseconds the entry expires.
    pub expires_at: u64,
    /// Approximate in-memory size of the cached value, in bytes.
    pub size_bytes: u64,
}

/// An opaque, externally-synchronized key/value cache. Default policy
/// (TTL 300s, capacity 1000, LRU eviction) is the embedder's
/// responsibility to enforce; the core only reads and writes through
/// this trait.
pub trait QueryCache<T> {
    /// Looks up a cached result by its stable key.
    fn get(&self, key: &str) -> Option<CachedResult<T>>;

    /// Inserts or replaces a cached result under the given key.
    fn put(&self, key: String, value: CachedResult<T>);
}
