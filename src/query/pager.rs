//! Paging helper
//!
//! [`SnSoap`] owns the connection; [`RecordPages`] is one query's lazy page
//! sequence. Per invocation the sequence moves through
//! `Init → (resolving identifiers) → Paging → Done`, and any error ends it.

use super::types::{in_query, KeysResult, Page, QueryParams, SYS_ID};
use crate::client::TableClient;
use crate::config::{validate_page_size, InstanceConfig};
use crate::error::Result;
use crate::http::SoapSession;
use futures::stream::{self, Stream};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

type DescriptorCache = Arc<RwLock<HashMap<String, Arc<crate::soap::WsdlDescriptor>>>>;

/// How a query picks its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Look up identifiers with a filter
    Filter(QueryParams),
    /// Use these identifiers; duplicates and `None` entries are dropped
    SysIds(Vec<Option<String>>),
}

impl Selection {
    /// Every record of the table
    pub fn all() -> Self {
        Self::Filter(QueryParams::new())
    }

    /// Select by identifiers
    pub fn sys_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SysIds(ids.into_iter().map(|id| Some(id.into())).collect())
    }
}

impl From<QueryParams> for Selection {
    fn from(params: QueryParams) -> Self {
        Self::Filter(params)
    }
}

impl From<Vec<Option<String>>> for Selection {
    fn from(ids: Vec<Option<String>>) -> Self {
        Self::SysIds(ids)
    }
}

impl From<Vec<String>> for Selection {
    fn from(ids: Vec<String>) -> Self {
        Self::sys_ids(ids)
    }
}

/// Drop duplicates and `None` entries, keeping first occurrences in order
pub fn dedup_sys_ids<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .flatten()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Everything needed to bind table clients; cheap to clone
#[derive(Debug, Clone)]
struct Connection {
    config: Arc<InstanceConfig>,
    session: SoapSession,
    cache: Option<DescriptorCache>,
}

impl Connection {
    async fn client(&self, table: &str) -> Result<TableClient> {
        let Some(cache) = &self.cache else {
            return TableClient::resolve(&self.session, &self.config, table).await;
        };

        if let Some(descriptor) = cache.read().await.get(table) {
            debug!(table, "using cached WSDL");
            return Ok(TableClient::new(
                table,
                Arc::clone(descriptor),
                self.session.clone(),
            ));
        }

        let client = TableClient::resolve(&self.session, &self.config, table).await?;
        cache
            .write()
            .await
            .insert(table.to_string(), Arc::clone(client.descriptor()));
        Ok(client)
    }
}

/// Connection to one instance's SOAP web services
///
/// Holds the instance settings and an authenticated HTTP session for its
/// whole lifetime. One query at a time is expected per helper.
#[derive(Debug, Clone)]
pub struct SnSoap {
    conn: Connection,
}

impl SnSoap {
    /// Connect to `instance` with basic credentials
    pub fn new(
        instance: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(InstanceConfig::new(instance, username, password))
    }

    /// Connect using a full instance config
    pub fn from_config(config: InstanceConfig) -> Result<Self> {
        config.validate()?;
        let session = SoapSession::new(&config)?;
        let cache = config.cache_wsdl.then(DescriptorCache::default);
        Ok(Self {
            conn: Connection {
                config: Arc::new(config),
                session,
                cache,
            },
        })
    }

    /// The instance config
    pub fn config(&self) -> &InstanceConfig {
        &self.conn.config
    }

    /// Bind a client to `table`'s endpoint
    pub async fn resolve_client(&self, table: &str) -> Result<TableClient> {
        self.conn.client(table).await
    }

    /// Run only the key lookup for `filter`
    pub async fn keys(&self, table: &str, filter: &QueryParams) -> Result<KeysResult> {
        filter.validate()?;
        self.conn.client(table).await?.get_keys(filter).await
    }

    /// Start a paged query
    ///
    /// Fails right away if `page_size` is outside `1..=250` or the filter has
    /// an unusable parameter name. Otherwise returns the lazy page sequence;
    /// no request is sent until the first page is pulled.
    pub fn run_query(
        &self,
        table: &str,
        selection: impl Into<Selection>,
        page_size: usize,
    ) -> Result<RecordPages> {
        validate_page_size(page_size)?;
        let selection = selection.into();
        if let Selection::Filter(params) = &selection {
            params.validate()?;
        }

        Ok(RecordPages {
            conn: self.conn.clone(),
            table: table.to_string(),
            page_size,
            state: PagerState::Init { selection },
        })
    }

    /// Start a paged query with the configured default page size
    pub fn query(&self, table: &str, selection: impl Into<Selection>) -> Result<RecordPages> {
        self.run_query(table, selection, self.conn.config.page_size)
    }
}

#[derive(Debug)]
enum PagerState {
    Init {
        selection: Selection,
    },
    Paging {
        client: TableClient,
        sys_ids: Vec<String>,
        offset: usize,
    },
    Done,
}

/// Lazy sequence of pages for one query
#[derive(Debug)]
pub struct RecordPages {
    conn: Connection,
    table: String,
    page_size: usize,
    state: PagerState,
}

impl RecordPages {
    /// Table being queried
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Maximum records per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Pages not yet fetched, once identifiers are resolved
    pub fn remaining_pages(&self) -> Option<usize> {
        match &self.state {
            PagerState::Init { .. } => None,
            PagerState::Paging {
                sys_ids, offset, ..
            } => Some((sys_ids.len() - offset).div_ceil(self.page_size)),
            PagerState::Done => Some(0),
        }
    }

    /// Whether the sequence has ended
    pub fn is_done(&self) -> bool {
        matches!(self.state, PagerState::Done)
    }

    /// Fetch the next page
    ///
    /// Returns `Ok(None)` once every page has been delivered. After an error
    /// the sequence is finished and later calls return `Ok(None)`.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        loop {
            match std::mem::replace(&mut self.state, PagerState::Done) {
                PagerState::Init { selection } => {
                    let client = self.conn.client(&self.table).await?;
                    let sys_ids = match selection {
                        Selection::Filter(filter) => client.get_keys(&filter).await?.sys_ids,
                        Selection::SysIds(ids) => dedup_sys_ids(ids),
                    };
                    info!(
                        table = %self.table,
                        sys_ids = sys_ids.len(),
                        pages = sys_ids.len().div_ceil(self.page_size),
                        "identifiers resolved"
                    );
                    if sys_ids.is_empty() {
                        return Ok(None);
                    }
                    self.state = PagerState::Paging {
                        client,
                        sys_ids,
                        offset: 0,
                    };
                }
                PagerState::Paging {
                    client,
                    sys_ids,
                    offset,
                } => {
                    let end = (offset + self.page_size).min(sys_ids.len());
                    let filter = QueryParams::encoded(in_query(SYS_ID, &sys_ids[offset..end]));
                    debug!(table = %self.table, offset, len = end - offset, "fetching page");

                    let page = client.get_records(&filter).await?;
                    if end < sys_ids.len() {
                        self.state = PagerState::Paging {
                            client,
                            sys_ids,
                            offset: end,
                        };
                    }
                    return Ok(Some(page));
                }
                PagerState::Done => return Ok(None),
            }
        }
    }

    /// Adapt the sequence into a stream of pages
    pub fn into_stream(self) -> impl Stream<Item = Result<Page>> {
        stream::unfold(Some(self), |pages| async move {
            let mut pages = pages?;
            match pages.next_page().await {
                Ok(Some(page)) => Some((Ok(page), Some(pages))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
