//! Query cache and the coordinator that refreshes it after mutations

use crate::api::models::{Member, Project, Task, Team};
use crate::api::{ApiClientTrait, ApiError};
use crate::session::Session;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A cached server query
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    Projects,
    Project(String),
    Tasks(String),
    Members,
    Teams(String),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Projects => write!(f, "projects"),
            QueryKey::Project(id) => write!(f, "project/{id}"),
            QueryKey::Tasks(project_id) => write!(f, "tasks/{project_id}"),
            QueryKey::Members => write!(f, "members"),
            QueryKey::Teams(user_id) => write!(f, "teams/{user_id}"),
        }
    }
}

/// Queries to refresh once a mutation has succeeded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefetchSet(BTreeSet<QueryKey>);

impl RefetchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(keys: impl IntoIterator<Item = QueryKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    pub fn insert(&mut self, key: QueryKey) -> bool {
        self.0.insert(key)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.0.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryKey> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Something that can reload a query
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Refetch: Send + Sync {
    async fn refetch(&self, session: &Session, key: &QueryKey) -> anyhow::Result<()>;
}

/// Which queries were refreshed and which stayed stale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefetchReport {
    pub refreshed: Vec<QueryKey>,
    pub failed: Vec<QueryKey>,
}

impl RefetchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct RefetchCoordinator<R> {
    target: Arc<R>,
}

impl<R> Clone for RefetchCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<R: Refetch> RefetchCoordinator<R> {
    pub fn new(target: Arc<R>) -> Self {
        Self { target }
    }

    /// Request every key concurrently and wait for all of them.
    ///
    /// Failures only degrade freshness: they are logged and reported,
    /// never returned as errors.
    pub async fn run(&self, session: &Session, set: &RefetchSet) -> RefetchReport {
        let target = &self.target;
        let results = join_all(set.iter().map(|key| async move {
            (key.clone(), target.refetch(session, key).await)
        }))
        .await;

        let mut report = RefetchReport::default();
        for (key, result) in results {
            match result {
                Ok(()) => {
                    debug!(query = %key, "Refetched");
                    report.refreshed.push(key);
                }
                Err(e) => {
                    warn!(query = %key, error = %e, "Refetch failed, cached data may be stale");
                    report.failed.push(key);
                }
            }
        }
        report
    }
}

/// Data held for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Projects(Vec<Project>),
    Project(Project),
    Tasks(Vec<Task>),
    Members(Vec<Member>),
    Teams(Vec<Team>),
}

/// The data-fetching layer: last known result of each query
pub struct QueryCache<C> {
    client: Arc<C>,
    entries: RwLock<HashMap<QueryKey, QueryData>>,
}

impl<C: ApiClientTrait> QueryCache<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<QueryData> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn projects(&self) -> Vec<Project> {
        match self.get(&QueryKey::Projects).await {
            Some(QueryData::Projects(projects)) => projects,
            _ => Vec::new(),
        }
    }

    pub async fn members(&self) -> Vec<Member> {
        match self.get(&QueryKey::Members).await {
            Some(QueryData::Members(members)) => members,
            _ => Vec::new(),
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn fetch(&self, session: &Session, key: &QueryKey) -> Result<QueryData, ApiError> {
        let data = match key {
            QueryKey::Projects => QueryData::Projects(self.client.list_projects(session).await?),
            QueryKey::Project(id) => QueryData::Project(self.client.get_project(session, id).await?),
            QueryKey::Tasks(project_id) => {
                QueryData::Tasks(self.client.list_tasks(session, project_id).await?)
            }
            QueryKey::Members => QueryData::Members(self.client.list_members(session).await?),
            QueryKey::Teams(user_id) => {
                QueryData::Teams(self.client.list_teams(session, user_id).await?)
            }
        };
        Ok(data)
    }
}

#[async_trait]
impl<C: ApiClientTrait> Refetch for QueryCache<C> {
    async fn refetch(&self, session: &Session, key: &QueryKey) -> anyhow::Result<()> {
        let data = self.fetch(session, key).await?;
        self.entries.write().await.insert(key.clone(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClientTrait;
    use crate::session::fixtures;
    use pretty_assertions::assert_eq;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            title: "Apollo".to_string(),
            description: String::new(),
            priority: Default::default(),
            start_date: None,
            due_date: None,
            lead: None,
            members: Vec::new(),
        }
    }

    #[test]
    fn test_refetch_set_deduplicates() {
        let mut set = RefetchSet::of([QueryKey::Projects, QueryKey::Project("p1".into())]);
        assert!(!set.insert(QueryKey::Projects));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&QueryKey::Project("p1".into())));
    }

    #[test]
    fn test_query_key_display() {
        assert_eq!(QueryKey::Tasks("p1".into()).to_string(), "tasks/p1");
        assert_eq!(QueryKey::Teams("u1".into()).to_string(), "teams/u1");
    }

    mod coordinator {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_failed_refetch_is_reported_not_raised() {
            let mut mock = MockRefetch::new();
            mock.expect_refetch()
                .times(2)
                .returning(|_, key| match key {
                    QueryKey::Members => Err(anyhow::anyhow!("timeout")),
                    _ => Ok(()),
                });

            let coordinator = RefetchCoordinator::new(Arc::new(mock));
            let set = RefetchSet::of([QueryKey::Projects, QueryKey::Members]);
            let report = coordinator.run(&fixtures::session(), &set).await;

            assert_eq!(report.refreshed, vec![QueryKey::Projects]);
            assert_eq!(report.failed, vec![QueryKey::Members]);
            assert!(!report.is_clean());
        }

        #[tokio::test]
        async fn test_only_named_queries_are_requested() {
            let mut mock = MockRefetch::new();
            mock.expect_refetch()
                .withf(|_, key| *key == QueryKey::Tasks("p1".into()))
                .times(1)
                .returning(|_, _| Ok(()));

            let coordinator = RefetchCoordinator::new(Arc::new(mock));
            let set = RefetchSet::of([QueryKey::Tasks("p1".into())]);
            assert!(coordinator.run(&fixtures::session(), &set).await.is_clean());
        }

        #[tokio::test]
        async fn test_empty_set_does_nothing() {
            let coordinator = RefetchCoordinator::new(Arc::new(MockRefetch::new()));
            let report = coordinator.run(&fixtures::session(), &RefetchSet::new()).await;
            assert_eq!(report, RefetchReport::default());
        }
    }

    mod cache {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_refetch_fills_cache() {
            let mut client = MockApiClientTrait::new();
            client
                .expect_list_projects()
                .times(1)
                .returning(|_| Ok(vec![project("p1")]));

            let cache = QueryCache::new(Arc::new(client));
            assert!(cache.projects().await.is_empty());
            cache
                .refetch(&fixtures::session(), &QueryKey::Projects)
                .await
                .unwrap();
            assert_eq!(cache.projects().await, vec![project("p1")]);
        }

        #[tokio::test]
        async fn test_failed_fetch_keeps_previous_data() {
            let mut client = MockApiClientTrait::new();
            let mut calls = 0;
            client.expect_list_projects().times(2).returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Ok(vec![project("p1")])
                } else {
                    Err(ApiError::Transport("down".into()))
                }
            });

            let cache = QueryCache::new(Arc::new(client));
            let session = fixtures::session();
            cache.refetch(&session, &QueryKey::Projects).await.unwrap();
            assert!(cache.refetch(&session, &QueryKey::Projects).await.is_err());
            assert_eq!(cache.projects().await.len(), 1);
        }

        #[tokio::test]
        async fn test_single_project_key() {
            let mut client = MockApiClientTrait::new();
            client
                .expect_get_project()
                .withf(|_, id| id == "p9")
                .returning(|_, id| Ok(project(id)));

            let cache = QueryCache::new(Arc::new(client));
            let key = QueryKey::Project("p9".into());
            cache.refetch(&fixtures::session(), &key).await.unwrap();
            assert_eq!(cache.get(&key).await, Some(QueryData::Project(project("p9"))));
        }
    }
}
