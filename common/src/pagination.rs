//! Abstractions for page-number pagination.

use std::num::NonZeroUsize;

/// A page of nodes.
///
/// The `count` always reflects the number of nodes returned in this [`Page`],
/// not the total number of nodes available.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Page<I> {
    /// Nodes of this [`Page`].
    results: Vec<I>,

    /// Number of nodes in this [`Page`].
    count: usize,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] out of the provided nodes.
    #[must_use]
    pub fn new(results: impl IntoIterator<Item = impl Into<I>>) -> Self {
        let results = results.into_iter().map(Into::into).collect::<Vec<_>>();
        Self {
            count: results.len(),
            results,
        }
    }

    /// Returns nodes of this [`Page`].
    #[must_use]
    pub fn results(&self) -> &[I] {
        &self.results
    }

    /// Returns the number of nodes in this [`Page`].
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Consumes this [`Page`] returning its nodes.
    #[must_use]
    pub fn into_results(self) -> Vec<I> {
        self.results
    }
}

impl<I> Default for Page<I> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
        }
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// 1-based index of the requested page.
    page: NonZeroUsize,

    /// Maximum number of nodes on a page.
    per_page: NonZeroUsize,
}

impl Arguments {
    /// Creates new [`Arguments`].
    ///
    /// [`None`] is returned if any of the arguments is missing, zero or
    /// doesn't fit into [`usize`].
    pub fn new<Num>(page: Option<Num>, per_page: Option<Num>) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        Some(Self {
            page: NonZeroUsize::new(page?.try_into().ok()?)?,
            per_page: NonZeroUsize::new(per_page?.try_into().ok()?)?,
        })
    }

    /// Returns 1-based index of the requested page.
    #[must_use]
    pub fn page(&self) -> NonZeroUsize {
        self.page
    }

    /// Returns maximum number of nodes on the requested page.
    #[must_use]
    pub fn per_page(&self) -> NonZeroUsize {
        self.per_page
    }

    /// Returns the [`Window`] occupied by the requested page.
    #[must_use]
    pub fn window(&self) -> Window {
        let first = (self.page.get() - 1)
            .saturating_mul(self.per_page.get())
            .saturating_add(1);
        Window {
            first,
            last: first.saturating_add(self.per_page.get() - 1),
        }
    }
}

/// Inclusive range of 1-based positions a page occupies in the full ordered
/// set of nodes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Window {
    /// Position of the first node on the page.
    first: usize,

    /// Position of the last node on the page.
    last: usize,
}

impl Window {
    /// Returns position of the first node in this [`Window`].
    #[must_use]
    pub fn first(&self) -> usize {
        self.first
    }

    /// Returns position of the last node in this [`Window`].
    #[must_use]
    pub fn last(&self) -> usize {
        self.last
    }

    /// Locates the provided 1-based `position` relatively to this [`Window`].
    #[must_use]
    pub fn locate(&self, position: usize) -> Location {
        if position < self.first {
            Location::Before
        } else if position > self.last {
            Location::After
        } else {
            Location::Inside
        }
    }
}

/// Location of a position relatively to a [`Window`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Location {
    /// Position precedes the [`Window`].
    Before,

    /// Position is inside the [`Window`].
    Inside,

    /// Position follows the [`Window`].
    After,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;
    };
}
