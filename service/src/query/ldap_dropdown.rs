//! [`Query`] collection picking LDAP dropdown [`Item`]s.

use std::ops::ControlFlow;

use common::{
    natural,
    pagination::{Location, Window},
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        form,
        ldap::{attribute, server, Attribute, Filter, Server},
        question,
    },
    infra::{
        directory::{self, Connection, Entry, Paging, Request},
        Directory,
    },
    read::dropdown::{
        list::{Arguments, Page},
        Item,
    },
    Service,
};

use super::Query;

/// Searches a directory [`Server`] for a [`Page`] of distinct [`Attribute`]
/// values.
#[derive(Clone, Debug)]
pub struct Search {
    /// [`Server`] to search on.
    pub server: Server,

    /// [`Attribute`] which values are picked.
    pub attribute: Attribute,

    /// [`Filter`] selecting the entries to pick from.
    pub filter: Filter,

    /// Text the picked values should contain.
    ///
    /// Empty text matches every value.
    pub search_text: String,

    /// [`Arguments`] of the requested [`Page`].
    pub arguments: Arguments,
}

impl<Dir> Query<Search> for Service<Dir>
where
    Dir: Directory + Sync,
{
    type Ok = Page;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Search) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Search {
            server,
            attribute,
            filter,
            search_text,
            arguments,
        } = query;
        let filter = filter.matching(&attribute, &search_text);

        let mut conn = self
            .directory()
            .connect(&server)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut request = Request {
            base_dn: &server.base_dn,
            filter: &filter,
            attribute: &attribute,
            paging: server.paging().map(|size| Paging {
                size,
                cookie: directory::Cookie::default(),
            }),
        };
        let mut acc = Accumulator::new(&attribute, arguments);
        let collected = collect(&mut conn, &mut request, &mut acc).await;
        conn.close().await;
        collected.map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut items = acc.items;
        items.sort_by(|a, b| natural::cmp(&a.text, &b.text));
        Ok(Page::new(items))
    }
}

/// Performs search round-trips until the [`Accumulator`] is full or the
/// server has no more entries.
async fn collect<C: Connection>(
    conn: &mut C,
    request: &mut Request<'_>,
    acc: &mut Accumulator<'_>,
) -> Result<(), Traced<directory::Error>> {
    loop {
        let batch = conn.search(request).await.map_err(tracerr::wrap!())?;
        if batch.size_limit_exceeded {
            tracing::warn!(
                base_dn = request.base_dn,
                filter = %request.filter,
                "directory size limit exceeded, using partial results",
            );
        }

        let flow = batch.entries.into_iter().try_for_each(|e| acc.push(&e));
        let (ControlFlow::Continue(()), Some(cookie), Some(paging)) =
            (flow, batch.cookie, request.paging.as_mut())
        else {
            break;
        };
        if cookie.is_empty() {
            break;
        }
        paging.cookie = cookie;
    }
    Ok(())
}

/// Running state of a single [`Search`].
#[derive(Debug)]
struct Accumulator<'a> {
    /// [`Attribute`] which values are picked.
    attribute: &'a Attribute,

    /// [`Window`] of the requested [`Page`].
    window: Window,

    /// Maximum number of [`Item`]s on the requested [`Page`].
    per_page: usize,

    /// Number of distinct values seen so far.
    found: usize,

    /// [`Item`]s of the requested [`Page`].
    items: Vec<Item>,
}

impl<'a> Accumulator<'a> {
    /// Creates a new empty [`Accumulator`].
    fn new(attribute: &'a Attribute, arguments: Arguments) -> Self {
        Self {
            attribute,
            window: arguments.window(),
            per_page: arguments.per_page().get(),
            found: 0,
            items: Vec::new(),
        }
    }

    /// Accounts the provided [`Entry`].
    ///
    /// Entries without the [`Attribute`] or with a value already picked are
    /// skipped without advancing the [`Window`] position.
    ///
    /// [`ControlFlow::Break`] is returned once no more entries are needed.
    fn push(&mut self, entry: &Entry) -> ControlFlow<()> {
        let Some(value) = entry.value(self.attribute) else {
            return ControlFlow::Continue(());
        };
        if self.items.iter().any(|i| i.id == value) {
            return ControlFlow::Continue(());
        }

        self.found += 1;
        match self.window.locate(self.found) {
            Location::Before => ControlFlow::Continue(()),
            Location::After => ControlFlow::Break(()),
            Location::Inside => {
                self.items.push(value.into());
                if self.items.len() >= self.per_page {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }
}

/// Searches for a [`Page`] of values answering a [`question::Question`].
#[derive(Clone, Debug)]
pub struct ByQuestion {
    /// ID of the [`question::Question`] to answer.
    pub question_id: question::Id,

    /// Text the picked values should contain.
    pub search_text: String,

    /// [`Arguments`] of the requested [`Page`].
    pub arguments: Arguments,
}

impl<Dir> Query<ByQuestion> for Service<Dir>
where
    Dir: Directory + Sync,
{
    type Ok = Page;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ByQuestion) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ByQuestion {
            question_id,
            search_text,
            arguments,
        } = query;
        let config = self.config();

        let question = config
            .questions
            .get(&question_id)
            .ok_or_else(|| tracerr::new!(E::QuestionNotExists(question_id)))?;
        if !question.form.is_active {
            return Err(tracerr::new!(E::FormInactive(question.form.id)));
        }

        let select = &question.config;
        let server = config
            .servers
            .get(&select.server_id)
            .ok_or_else(|| {
                tracerr::new!(E::ServerNotExists(select.server_id))
            })?;
        let attribute =
            config.attributes.get(&select.attribute_id).ok_or_else(|| {
                tracerr::new!(E::AttributeNotExists(select.attribute_id))
            })?;

        self.execute(Search {
            server: server.clone(),
            attribute: attribute.clone(),
            filter: select.filter.clone(),
            search_text,
            arguments,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// Error of [`Search`] or [`ByQuestion`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Directory`] is unavailable.
    #[display("`Directory` is unavailable: {_0}")]
    #[from]
    DirectoryUnavailable(directory::Error),

    /// [`question::Question`] with the provided ID doesn't exist.
    #[display("`Question(id: {_0})` doesn't exist")]
    QuestionNotExists(#[error(not(source))] question::Id),

    /// [`form::Form`] of the [`question::Question`] is inactive.
    #[display("`Form(id: {_0})` is inactive")]
    FormInactive(#[error(not(source))] form::Id),

    /// [`Server`] with the provided ID doesn't exist.
    #[display("`Server(id: {_0})` doesn't exist")]
    ServerNotExists(#[error(not(source))] server::Id),

    /// [`Attribute`] with the provided ID doesn't exist.
    #[display("`Attribute(id: {_0})` doesn't exist")]
    AttributeNotExists(#[error(not(source))] attribute::Id),
}
