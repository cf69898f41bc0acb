//! In-memory [`Directory`] implementation.
//!
//! Evaluates a subset of [RFC 4515] filters (`&`, `|`, `!`, equality,
//! presence and substring assertions) over a fixed set of [`Entry`]s.
//!
//! [RFC 4515]: https://datatracker.ietf.org/doc/html/rfc4515

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::ldap::Server,
    infra::directory::{self, Batch, Cookie, Entry, Request},
};
#[cfg(doc)]
use crate::infra::Directory;

/// In-memory [`Directory`].
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// [`Entry`]s of this [`Memory`] directory in their server order.
    entries: Arc<Vec<Entry>>,

    /// Indicator whether [`Memory::connect()`] fails.
    ///
    /// [`Memory::connect()`]: directory::Directory::connect
    unreachable: bool,

    /// 1-based number of the search round-trip failing with an error.
    failing_round: Option<usize>,

    /// Maximum number of entries returned by a search round-trip.
    size_limit: Option<usize>,

    /// [`Stats`] of this [`Memory`] directory usage.
    stats: Arc<Stats>,
}

impl Memory {
    /// Creates a new [`Memory`] directory of the provided [`Entry`]s.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            entries: Arc::new(entries.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Makes this [`Memory`] directory refuse any connection.
    #[must_use]
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Makes the provided 1-based search `round` fail on every
    /// [`Connection`].
    #[must_use]
    pub fn failing_at(mut self, round: usize) -> Self {
        self.failing_round = Some(round);
        self
    }

    /// Limits the number of entries returned by a single search round-trip.
    #[must_use]
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Returns [`Stats`] of this [`Memory`] directory usage.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl directory::Directory for Memory {
    type Connection = Connection;

    async fn connect(
        &self,
        server: &Server,
    ) -> Result<Self::Connection, Traced<directory::Error>> {
        if self.unreachable {
            return Err(tracerr::new!(directory::Error::from(
                Error::Unreachable(server.url())
            )));
        }

        _ = self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Connection {
            directory: self.clone(),
            round: 0,
        })
    }
}

/// Opened [`Memory`] connection.
#[derive(Debug)]
pub struct Connection {
    /// [`Memory`] directory this [`Connection`] is opened to.
    directory: Memory,

    /// Number of search round-trips performed.
    round: usize,
}

impl directory::Connection for Connection {
    async fn search(
        &mut self,
        request: &Request<'_>,
    ) -> Result<Batch, Traced<directory::Error>> {
        let dir = &self.directory;
        self.round += 1;
        _ = dir.stats.round_trips.fetch_add(1, Ordering::SeqCst);

        if dir.failing_round == Some(self.round) {
            return Err(tracerr::new!(directory::Error::from(
                Error::Broken(self.round)
            )));
        }

        let filter = Expr::parse(request.filter.as_ref()).ok_or_else(|| {
            tracerr::new!(directory::Error::from(Error::InvalidFilter(
                request.filter.to_string()
            )))
        })?;

        let offset = match &request.paging {
            Some(paging) if !paging.cookie.is_empty() => {
                let bytes = <[u8; 8]>::try_from(paging.cookie.as_bytes())
                    .map_err(|_| {
                        tracerr::new!(directory::Error::from(
                            Error::InvalidCookie
                        ))
                    })?;
                usize::try_from(u64::from_be_bytes(bytes)).unwrap_or(usize::MAX)
            }
            Some(_) | None => 0,
        };

        let mut matched = dir
            .entries
            .iter()
            .filter(|e| e.dn.ends_with(request.base_dn))
            .filter(|e| filter.matches(e))
            .skip(offset)
            .map(|e| Entry {
                dn: e.dn.clone(),
                attrs: e
                    .attrs
                    .iter()
                    .filter(|(name, _)| request.attribute.matches(name))
                    .map(|(name, values)| (name.clone(), values.clone()))
                    .collect(),
            })
            .peekable();

        let mut entries = Vec::new();
        let mut size_limit_exceeded = false;
        let mut cookie = request.paging.as_ref().map(|_| Cookie::default());
        while let Some(entry) = matched.next() {
            entries.push(entry);
            if matched.peek().is_none() {
                break;
            }
            if dir.size_limit.is_some_and(|l| entries.len() >= l) {
                size_limit_exceeded = true;
                break;
            }
            if let Some(paging) = &request.paging {
                if u32::try_from(entries.len())
                    .is_ok_and(|n| n >= paging.size.get())
                {
                    let next = u64::try_from(offset + entries.len())
                        .unwrap_or(u64::MAX);
                    cookie = Some(Cookie::from(next.to_be_bytes().to_vec()));
                    break;
                }
            }
        }

        Ok(Batch {
            entries,
            cookie,
            size_limit_exceeded,
        })
    }

    async fn close(self) {
        _ = self.directory.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Usage statistics of a [`Memory`] directory.
#[derive(Debug, Default)]
pub struct Stats {
    /// Number of opened [`Connection`]s.
    opened: AtomicUsize,

    /// Number of closed [`Connection`]s.
    closed: AtomicUsize,

    /// Number of performed search round-trips.
    round_trips: AtomicUsize,
}

impl Stats {
    /// Returns the number of opened [`Connection`]s.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Returns the number of closed [`Connection`]s.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns the number of performed search round-trips.
    #[must_use]
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }
}

/// [`Memory`] directory error.
#[derive(Clone, Debug, Display, StdError)]
pub enum Error {
    /// Server cannot be connected to.
    #[display("`{_0}` is unreachable")]
    Unreachable(#[error(not(source))] String),

    /// Search round-trip broke.
    #[display("Search round-trip {_0} broke")]
    Broken(#[error(not(source))] usize),

    /// Search filter cannot be parsed.
    #[display("Invalid search filter: `{_0}`")]
    InvalidFilter(#[error(not(source))] String),

    /// Paged search cookie is not the one issued.
    #[display("Invalid paged search cookie")]
    InvalidCookie,
}

/// Parsed search filter expression.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Expr {
    /// All the expressions match.
    And(Vec<Expr>),

    /// Any of the expressions matches.
    Or(Vec<Expr>),

    /// The expression doesn't match.
    Not(Box<Expr>),

    /// Attribute is present.
    Present(String),

    /// Attribute has the exact value.
    Equal(String, String),

    /// Attribute has a value matching the pattern.
    Substring {
        /// Attribute to match.
        attr: String,

        /// Leading part of the value.
        initial: String,

        /// Parts of the value in between, in order.
        any: Vec<String>,

        /// Trailing part of the value.
        last: String,
    },
}

impl Expr {
    /// Parses the provided filter string.
    fn parse(input: &str) -> Option<Self> {
        let mut parser = Parser(input.trim());
        let expr = parser.expr()?;
        parser.0.trim().is_empty().then_some(expr)
    }

    /// Checks whether the provided [`Entry`] matches this [`Expr`].
    fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::And(exprs) => exprs.iter().all(|e| e.matches(entry)),
            Self::Or(exprs) => exprs.iter().any(|e| e.matches(entry)),
            Self::Not(expr) => !expr.matches(entry),
            Self::Present(attr) => {
                lowercase_values(entry, attr).next().is_some()
            }
            Self::Equal(attr, value) => {
                lowercase_values(entry, attr).any(|v| v == value.to_lowercase())
            }
            Self::Substring {
                attr,
                initial,
                any,
                last,
            } => lowercase_values(entry, attr).any(|v| {
                let Some(mut rest) = v.strip_prefix(&initial.to_lowercase())
                else {
                    return false;
                };
                for part in any {
                    let part = part.to_lowercase();
                    let Some(at) = rest.find(&part) else {
                        return false;
                    };
                    rest = &rest[at + part.len()..];
                }
                rest.ends_with(&last.to_lowercase())
            }),
        }
    }
}

/// Returns lowercased values of the provided `attr`ibute of the [`Entry`].
fn lowercase_values<'a>(
    entry: &'a Entry,
    attr: &'a str,
) -> impl Iterator<Item = String> + 'a {
    entry
        .attrs
        .iter()
        .filter(move |(name, _)| name.eq_ignore_ascii_case(attr))
        .flat_map(|(_, values)| values.iter().map(|v| v.to_lowercase()))
}

/// Recursive descent parser of filter strings.
struct Parser<'a>(&'a str);

impl Parser<'_> {
    /// Consumes the provided `prefix` after optional whitespace.
    fn eat(&mut self, prefix: char) -> bool {
        let rest = self.0.trim_start();
        match rest.strip_prefix(prefix) {
            Some(rest) => {
                self.0 = rest;
                true
            }
            None => false,
        }
    }

    /// Parses a parenthesized expression.
    fn expr(&mut self) -> Option<Expr> {
        if !self.eat('(') {
            return None;
        }
        let expr = if self.eat('&') {
            Expr::And(self.list()?)
        } else if self.eat('|') {
            Expr::Or(self.list()?)
        } else if self.eat('!') {
            Expr::Not(Box::new(self.expr()?))
        } else {
            self.item()?
        };
        self.eat(')').then_some(expr)
    }

    /// Parses a list of expressions up to the closing parenthesis.
    fn list(&mut self) -> Option<Vec<Expr>> {
        let mut exprs = Vec::new();
        while self.0.trim_start().starts_with('(') {
            exprs.push(self.expr()?);
        }
        Some(exprs)
    }

    /// Parses a simple `attr=value` assertion.
    fn item(&mut self) -> Option<Expr> {
        let rest = self.0.trim_start();
        let end = rest.find(')')?;
        let (item, tail) = rest.split_at(end);
        self.0 = tail;

        let (attr, value) = item.split_once('=')?;
        let attr = attr.trim().to_owned();
        if attr.is_empty() {
            return None;
        }

        let mut parts = value
            .split('*')
            .map(unescape)
            .collect::<Option<Vec<_>>>()?;
        Some(match parts.len() {
            1 => Expr::Equal(attr, parts.pop()?),
            2 if parts.iter().all(String::is_empty) => Expr::Present(attr),
            _ => {
                let last = parts.pop()?;
                let initial = parts.remove(0);
                Expr::Substring {
                    attr,
                    initial,
                    any: parts.into_iter().filter(|p| !p.is_empty()).collect(),
                    last,
                }
            }
        })
    }
}

/// Decodes `\XX` escapes of the provided assertion value.
fn unescape(value: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut rest = value.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        if b == b'\\' {
            let hex = std::str::from_utf8(tail.get(..2)?).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}
