//! Capsule service: fetch, rank, open, and account teardown.
//!
//! Constructed once at the composition root with its collaborators
//! injected; the source app's global singletons have no counterpart here.

use std::sync::Arc;

use tokio::sync::RwLock;

use capsule_types::{Capsule, CapsuleId, GeoPoint, ListCapsuleCellItem, SortPolicy, UserId};

use crate::collaborators::{AuthGateway, CapsuleStore};
use crate::errors::{AuthError, WriteError};
use crate::feed::{CapsuleEvent, CapsuleEvents, CapsuleFeed};
use crate::ranking::rank;

pub struct CapsuleService {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn CapsuleStore>,
    /// Reference coordinate for distance ranking (last known or default
    /// location).
    reference: GeoPoint,
    /// Full records from the last fetch, for detail lookups.
    capsules: RwLock<Vec<Capsule>>,
    feed: CapsuleFeed,
    events: CapsuleEvents,
}

impl CapsuleService {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthGateway>, store: Arc<dyn CapsuleStore>, reference: GeoPoint) -> Self {
        Self {
            auth,
            store,
            reference,
            capsules: RwLock::new(Vec::new()),
            feed: CapsuleFeed::new(),
            events: CapsuleEvents::new(),
        }
    }

    /// Refetch the user's capsules, refresh the cache, and publish the
    /// list projection to the feed.
    pub async fn fetch_list(&self, user: &UserId) -> Result<Vec<ListCapsuleCellItem>, WriteError> {
        let capsules = self.store.read_capsules(user).await?;
        let items: Vec<ListCapsuleCellItem> = capsules.iter().map(Capsule::to_cell_item).collect();

        *self.capsules.write().await = capsules;
        self.feed.publish(items.clone());
        self.events.emit(CapsuleEvent::ListRefreshed { count: items.len() });
        Ok(items)
    }

    /// The current list projection ordered under `policy`.
    #[must_use]
    pub fn ranked_list(&self, policy: SortPolicy) -> Vec<ListCapsuleCellItem> {
        rank(self.feed.latest(), self.reference, policy)
    }

    /// Fetch one capsule for the detail view and trigger the best-effort
    /// open-count increment.
    ///
    /// The increment runs as a detached task; its failure is logged and
    /// swallowed, never surfaced to the detail view.
    pub async fn open_capsule(&self, id: CapsuleId) -> Result<Capsule, WriteError> {
        let capsule = self
            .capsules
            .read()
            .await
            .iter()
            .find(|c| c.uuid == id)
            .cloned()
            .ok_or(WriteError::NotFound(id))?;

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.increment_open_count(id).await {
                tracing::warn!(capsule = %id, error = %e, "open count increment failed");
            }
        });

        self.events.emit(CapsuleEvent::CapsuleOpened(id));
        Ok(capsule)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await
    }

    /// Delete every record belonging to `user`, then the account itself.
    ///
    /// Records go first: if the database deletion fails the account still
    /// exists and the user can retry.
    pub async fn delete_account(&self, user: &UserId) -> Result<(), AuthError> {
        self.store
            .delete_user_records(user)
            .await
            .map_err(|e| AuthError::DeleteAccount(e.to_string()))?;
        self.auth.delete_account(user).await
    }

    #[must_use]
    pub fn feed(&self) -> &CapsuleFeed {
        &self.feed
    }

    #[must_use]
    pub fn events(&self) -> &CapsuleEvents {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use capsule_types::{Capsule, CapsuleDraft, CapsuleId, GeoPoint, SortPolicy, UserId};

    use super::CapsuleService;
    use crate::collaborators::{AuthGateway, CapsuleStore, Credential, Session};
    use crate::errors::{AuthError, WriteError};
    use crate::feed::CapsuleEvent;

    fn capsule(title: &str, km_north: f64, year: i32) -> Capsule {
        CapsuleDraft {
            user_id: UserId::new("uid-1"),
            title: title.to_string(),
            description: String::new(),
            geopoint: GeoPoint::new(37.5665 + km_north / 111.32, 126.9780).unwrap(),
            memory_date: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
            simple_address: title.to_string(),
        }
        .into_capsule(vec![format!("https://img/{title}.jpg")], Utc::now())
    }

    #[derive(Default)]
    struct FakeStore {
        capsules: Vec<Capsule>,
        fail_delete: bool,
        fail_increment: bool,
        increments: AtomicUsize,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl CapsuleStore for FakeStore {
        async fn write_capsule(&self, _capsule: &Capsule) -> Result<(), WriteError> {
            Ok(())
        }

        async fn increment_open_count(&self, id: CapsuleId) -> Result<(), WriteError> {
            self.increments.fetch_add(1, Ordering::SeqCst);
            if self.fail_increment {
                return Err(WriteError::Commit(format!("increment failed for {id}")));
            }
            Ok(())
        }

        async fn read_capsules(&self, _user: &UserId) -> Result<Vec<Capsule>, WriteError> {
            Ok(self.capsules.clone())
        }

        async fn delete_user_records(&self, _user: &UserId) -> Result<(), WriteError> {
            if self.fail_delete {
                return Err(WriteError::Delete("records busy".to_string()));
            }
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAuth {
        deleted: AtomicBool,
    }

    #[async_trait]
    impl AuthGateway for FakeAuth {
        async fn sign_in(&self, _credential: Credential) -> Result<Session, AuthError> {
            Ok(Session {
                user_id: UserId::new("uid-1"),
            })
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            Ok(())
        }

        async fn delete_account(&self, _user: &UserId) -> Result<(), AuthError> {
            self.deleted.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn service(store: FakeStore, auth: Arc<FakeAuth>) -> (CapsuleService, Arc<FakeStore>) {
        let store = Arc::new(store);
        let collaborator: Arc<dyn CapsuleStore> = store.clone();
        let service =
            CapsuleService::new(auth, collaborator, GeoPoint::new(37.5665, 126.9780).unwrap());
        (service, store)
    }

    #[tokio::test]
    async fn fetch_publishes_projection_to_the_feed() {
        let store = FakeStore {
            capsules: vec![capsule("a", 1.0, 2022), capsule("b", 2.0, 2023)],
            ..FakeStore::default()
        };
        let (service, _) = service(store, Arc::new(FakeAuth::default()));

        let mut events = service.events().subscribe();
        let items = service.fetch_list(&UserId::new("uid-1")).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(service.feed().latest().len(), 2);
        assert_eq!(
            events.try_recv().unwrap(),
            CapsuleEvent::ListRefreshed { count: 2 }
        );
    }

    #[tokio::test]
    async fn ranked_list_orders_the_current_feed_value() {
        let store = FakeStore {
            capsules: vec![
                capsule("5km", 5.0, 2022),
                capsule("1km", 1.0, 2021),
                capsule("10km", 10.0, 2023),
            ],
            ..FakeStore::default()
        };
        let (service, _) = service(store, Arc::new(FakeAuth::default()));
        service.fetch_list(&UserId::new("uid-1")).await.unwrap();

        let nearest: Vec<String> = service
            .ranked_list(SortPolicy::Nearest)
            .into_iter()
            .map(|i| i.address)
            .collect();
        assert_eq!(nearest, ["1km", "5km", "10km"]);

        let latest: Vec<String> = service
            .ranked_list(SortPolicy::Latest)
            .into_iter()
            .map(|i| i.address)
            .collect();
        assert_eq!(latest, ["10km", "5km", "1km"]);
    }

    #[tokio::test]
    async fn open_returns_capsule_and_bumps_count() {
        let target = capsule("a", 1.0, 2022);
        let id = target.uuid;
        let store = FakeStore {
            capsules: vec![target],
            ..FakeStore::default()
        };
        let (service, store) = service(store, Arc::new(FakeAuth::default()));
        service.fetch_list(&UserId::new("uid-1")).await.unwrap();

        let opened = service.open_capsule(id).await.unwrap();
        assert_eq!(opened.uuid, id);

        // Detached increment task.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.increments.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn increment_failure_is_swallowed() {
        let target = capsule("a", 1.0, 2022);
        let id = target.uuid;
        let store = FakeStore {
            capsules: vec![target],
            fail_increment: true,
            ..FakeStore::default()
        };
        let (service, _) = service(store, Arc::new(FakeAuth::default()));
        service.fetch_list(&UserId::new("uid-1")).await.unwrap();

        // The open itself still succeeds.
        assert!(service.open_capsule(id).await.is_ok());
    }

    #[tokio::test]
    async fn open_unknown_capsule_is_not_found() {
        let (service, _) = service(FakeStore::default(), Arc::new(FakeAuth::default()));
        let result = service.open_capsule(CapsuleId::new()).await;
        assert!(matches!(result, Err(WriteError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_account_removes_records_before_the_account() {
        let auth = Arc::new(FakeAuth::default());
        let (service, _) = service(FakeStore::default(), Arc::clone(&auth));

        service.delete_account(&UserId::new("uid-1")).await.unwrap();
        assert!(auth.deleted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn record_deletion_failure_keeps_the_account() {
        let auth = Arc::new(FakeAuth::default());
        let store = FakeStore {
            fail_delete: true,
            ..FakeStore::default()
        };
        let (service, _) = service(store, Arc::clone(&auth));

        let result = service.delete_account(&UserId::new("uid-1")).await;
        assert!(matches!(result, Err(AuthError::DeleteAccount(_))));
        assert!(!auth.deleted.load(Ordering::SeqCst));
    }
}
