#![allow(clippy::unwrap_used)]
// Entity store behaviour against an in-memory service, plus session-level
// scenarios against a wiremock backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrine_core::pipeline;
use vitrine_core::{
    AuthState, CollectionResult, CoreError, DataSource, EntityId, EntityStore, ErrorKind,
    FilterPatch, KeyValueStore, MemoryStorage, Notifier, Product, ProductDraft, ProductPatch,
    ResourceService, Session, SessionConfig, Severity, SortDirection, SortPreset,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<(String, Severity)> {
        self.seen.lock().unwrap().clone()
    }

    fn last(&self) -> Option<(String, Severity)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.seen.lock().unwrap().push((message.to_owned(), severity));
    }
}

/// In-memory backend that runs the real pipeline over its rows.
#[derive(Default)]
struct FakeProducts {
    rows: Mutex<Vec<Product>>,
    next_id: AtomicU64,
    list_delays: Mutex<VecDeque<Duration>>,
    list_calls: AtomicUsize,
    mutations: AtomicUsize,
    fail_lists: Mutex<Option<ErrorKind>>,
}

impl FakeProducts {
    fn seeded() -> Self {
        let fake = Self::default();
        *fake.rows.lock().unwrap() = vec![
            product(1, "Notebook", 3500, "Eletronicos", true),
            product(2, "Livro de Rust", 120, "Livros", true),
            product(3, "Mouse", 80, "Acessorios", true),
            product(4, "Curso Vue", 200, "Cursos", true),
            product(5, "Caneca", 40, "", false),
        ];
        fake.next_id.store(6, Ordering::SeqCst);
        fake
    }

    fn row(&self, id: u64) -> Option<Product> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == EntityId::Number(id))
            .cloned()
    }
}

impl ResourceService for FakeProducts {
    type Entity = Product;

    async fn list(
        &self,
        filter: &vitrine_core::Filter,
    ) -> Result<CollectionResult<Product>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = *self.fail_lists.lock().unwrap();
        if let Some(kind) = failing {
            return Err(failure(kind));
        }
        let rows = self.rows.lock().unwrap().clone();
        let items = pipeline::apply(&rows, filter);
        Ok(CollectionResult {
            total: items.len() as u64,
            items,
            source: DataSource::Live,
        })
    }

    async fn get(&self, id: &EntityId) -> Result<Product, CoreError> {
        let id = id.as_number().unwrap_or(0);
        self.row(id).ok_or_else(|| CoreError::NotFound {
            message: ErrorKind::NotFound.default_message().to_owned(),
        })
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Option<Product>, CoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Product {
            id: EntityId::Number(id),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            stock: draft.stock,
            category: draft.category.clone(),
            active: draft.active,
            image_url: draft.image_url.clone(),
            created_at: None,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(Some(created))
    }

    async fn update(&self, id: &EntityId, patch: &ProductPatch) -> Result<Option<Product>, CoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|p| &p.id == id) else {
            return Err(CoreError::NotFound {
                message: "Produto não encontrado".into(),
            });
        };
        if let Some(active) = patch.active {
            row.active = active;
        }
        if let Some(price) = patch.price {
            row.price = price;
        }
        if let Some(name) = &patch.name {
            row.name.clone_from(name);
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().retain(|p| &p.id != id);
        Ok(())
    }
}

fn failure(kind: ErrorKind) -> CoreError {
    match kind {
        ErrorKind::Connection => CoreError::Connection {
            message: kind.default_message().to_owned(),
        },
        _ => CoreError::Server {
            message: kind.default_message().to_owned(),
        },
    }
}

fn product(id: u64, name: &str, price: i64, category: &str, active: bool) -> Product {
    Product {
        id: EntityId::Number(id),
        name: name.to_owned(),
        description: String::new(),
        price: Decimal::from(price),
        stock: 3,
        category: category.to_owned(),
        active,
        image_url: None,
        created_at: None,
    }
}

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_owned(),
        description: "Novo item".into(),
        price: Decimal::new(4990, 2),
        stock: 7,
        category: "Livros".into(),
        active: true,
        image_url: None,
    }
}

fn store() -> (EntityStore<FakeProducts>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = EntityStore::new(FakeProducts::seeded(), Arc::clone(&notifier) as Arc<dyn Notifier>);
    (store, notifier)
}

fn names(store: &EntityStore<FakeProducts>) -> Vec<String> {
    store.items().into_iter().map(|p| p.name).collect()
}

// ── Loading and filters ─────────────────────────────────────────────

#[tokio::test]
async fn unset_category_returns_every_category() {
    let (store, _) = store();
    store.set_filter(FilterPatch::default().active(None));
    store.load().await.unwrap();

    assert_eq!(store.total(), 5);
    assert_eq!(store.source(), DataSource::Live);
    assert!(!store.is_busy());
}

#[tokio::test]
async fn set_filter_merges_and_does_not_reload() {
    let (store, _) = store();
    store.set_filter(FilterPatch::default().category(Some("Livros".into())));
    store.set_filter(FilterPatch::default().search(Some("rust".into())));

    let filter = store.filter();
    assert_eq!(filter.category.as_deref(), Some("Livros"));
    assert_eq!(filter.search.as_deref(), Some("rust"));
    assert_eq!(filter.active, Some(true));
    assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 0);

    store.load().await.unwrap();
    assert_eq!(names(&store), vec!["Livro de Rust"]);

    store.reset_filter();
    assert_eq!(store.filter(), vitrine_core::Filter::default());
}

#[tokio::test]
async fn price_sort_orders_ascending_and_descending() {
    let (store, _) = store();
    store.set_filter(FilterPatch::default().preset(SortPreset::PriceAsc));
    store.load().await.unwrap();
    assert_eq!(names(&store), vec!["Mouse", "Livro de Rust", "Curso Vue", "Notebook"]);

    store.set_filter(FilterPatch::default().sort("preco", SortDirection::Desc));
    store.load().await.unwrap();
    assert_eq!(names(&store), vec!["Notebook", "Curso Vue", "Livro de Rust", "Mouse"]);
}

#[tokio::test]
async fn derived_views_split_and_group() {
    let (store, _) = store();
    store.set_filter(FilterPatch::default().active(None));
    store.load().await.unwrap();

    assert_eq!(store.active().len(), 4);
    assert_eq!(store.inactive().len(), 1);

    let groups = store.by_category();
    assert_eq!(groups["Outros"][0].name, "Caneca");
    assert_eq!(groups.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn superseded_load_is_discarded() {
    let (store, _) = store();
    store
        .service()
        .list_delays
        .lock()
        .unwrap()
        .extend([Duration::from_millis(500), Duration::ZERO]);

    let slow = async {
        store.load().await.unwrap();
    };
    let fast = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.set_filter(FilterPatch::default().category(Some("Cursos".into())));
        store.load().await.unwrap();
    };
    tokio::join!(slow, fast);

    assert_eq!(names(&store), vec!["Curso Vue"]);
    assert_eq!(store.snapshot().version, 1);
    assert!(!store.is_busy());
}

#[tokio::test(start_paused = true)]
async fn superseded_failed_load_is_silent() {
    let (store, notifier) = store();
    store
        .service()
        .list_delays
        .lock()
        .unwrap()
        .extend([Duration::from_millis(500), Duration::ZERO]);

    let slow = store.load();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.set_filter(FilterPatch::default().category(Some("Cursos".into())));
        store.load().await.unwrap();
        // The slow request resolves only after this point, and fails.
        *store.service().fail_lists.lock().unwrap() = Some(ErrorKind::Server);
    };
    let (slow, ()) = tokio::join!(slow, fast);

    assert!(slow.is_ok());
    assert_eq!(names(&store), vec!["Curso Vue"]);
    assert!(
        notifier.messages().iter().all(|(_, severity)| *severity != Severity::Error),
        "stale failure must not notify: {:?}",
        notifier.messages()
    );
    assert!(!store.is_busy());
}

#[tokio::test]
async fn failed_load_notifies_and_reraises() {
    let (store, notifier) = store();
    *store.service().fail_lists.lock().unwrap() = Some(ErrorKind::Server);

    let err = store.load().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(
        notifier.last(),
        Some((ErrorKind::Server.default_message().to_owned(), Severity::Error))
    );
    assert!(!store.is_busy());
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_is_visible_after_reload() {
    let (store, notifier) = store();
    let created = store.create(&draft("Rust Avançado")).await.unwrap().unwrap();

    assert!(names(&store).contains(&"Rust Avançado".to_owned()));
    assert!(store.items().iter().any(|p| p.id == created.id));
    assert_eq!(
        notifier.last(),
        Some(("Product created successfully".to_owned(), Severity::Success))
    );
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_service() {
    let (store, notifier) = store();
    let mut bad = draft("ab");
    bad.category = "Brinquedos".into();

    let err = store.create(&bad).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.service().mutations.load(Ordering::SeqCst), 0);
    assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.messages().len(), 1);
    assert_eq!(notifier.last().unwrap().1, Severity::Error);
}

#[tokio::test]
async fn delete_removes_entity_and_current() {
    let (store, notifier) = store();
    let id = EntityId::Number(2);
    store.fetch(&id).await.unwrap();
    assert_eq!(store.current().unwrap().name, "Livro de Rust");

    store.delete(&id).await.unwrap();

    assert!(store.items().iter().all(|p| p.id != id));
    assert!(store.current().is_none());
    assert_eq!(
        notifier.last(),
        Some(("Product deleted successfully".to_owned(), Severity::Success))
    );
}

#[tokio::test]
async fn toggle_inactive_then_reload_shows_ativo_false() {
    let (store, notifier) = store();
    store.set_filter(FilterPatch::default().active(None));
    let id = EntityId::Number(3);

    store.set_active(&id, false).await.unwrap();

    let mouse = store.items().into_iter().find(|p| p.id == id).unwrap();
    assert!(!mouse.active);
    assert_eq!(
        notifier.last(),
        Some(("Product deactivated".to_owned(), Severity::Success))
    );

    store.set_active(&id, true).await.unwrap();
    assert_eq!(notifier.last().unwrap().0, "Product activated");
}

#[tokio::test]
async fn failed_mutation_notifies_once_and_skips_reload() {
    let (store, notifier) = store();
    let patch = ProductPatch {
        price: Some(Decimal::from(10)),
        ..ProductPatch::default()
    };

    let err = store.update(&EntityId::Number(99), &patch).await.unwrap_err();

    assert_eq!(err.user_message(), "Produto não encontrado");
    assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.messages(), vec![("Produto não encontrado".to_owned(), Severity::Error)]);
}

#[tokio::test]
async fn fetch_unknown_id_notifies_not_found() {
    let (store, notifier) = store();
    let err = store.fetch(&EntityId::Number(42)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(notifier.last().unwrap().1, Severity::Error);
    assert!(store.current().is_none());
}

// ── Session against a backend ───────────────────────────────────────

fn session_for(api_url: &str, fallback: bool) -> (Session, Arc<RecordingNotifier>, Arc<dyn KeyValueStore>) {
    let mut config = SessionConfig::new(Url::parse(api_url).unwrap());
    config.fallback_enabled = fallback;
    config.timeout = Duration::from_secs(5);
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let session = Session::with_notifier(
        &config,
        Arc::clone(&storage),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    )
    .unwrap();
    (session, notifier, storage)
}

#[tokio::test]
async fn unreachable_backend_serves_fallback_when_enabled() {
    let (session, notifier, _) = session_for("http://127.0.0.1:9", true);

    session.products.load().await.unwrap();

    let snapshot = session.products.snapshot();
    assert_eq!(snapshot.source, DataSource::Fallback);
    assert!(!snapshot.items.is_empty());
    assert!(snapshot.items.iter().all(|p| p.active));
    assert_eq!(snapshot.total, snapshot.items.len() as u64);
    assert!(session.is_degraded());
    assert_eq!(notifier.last().unwrap().1, Severity::Warning);
    assert_eq!(session.notifications().active().len(), 1);
}

#[tokio::test]
async fn unreachable_backend_without_fallback_is_connection_error() {
    let (session, notifier, _) = session_for("http://127.0.0.1:9", false);

    let err = session.cars.load().await.unwrap_err();

    assert!(err.is_unreachable());
    assert!(!session.is_degraded());
    assert_eq!(
        notifier.last(),
        Some((ErrorKind::Connection.default_message().to_owned(), Severity::Error))
    );
}

fn car_json(id: u64, model: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "marca": "Toyota",
        "modelo": model,
        "ano": 2020,
        "preco": 98000.0,
        "quilometragem": 42000,
        "categoria": "Sedan",
        "ativo": active
    })
}

#[tokio::test]
async fn car_deactivation_reloads_through_envelopes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/carros"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "carros": [car_json(1, "Corolla", true), car_json(2, "Yaris", true)],
            "total": 2
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/carros/2"))
        .and(body_json(json!({"ativo": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Carro atualizado",
            "carro": car_json(2, "Yaris", false)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/carros"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "carros": [car_json(1, "Corolla", true), car_json(2, "Yaris", false)]
        })))
        .mount(&server)
        .await;

    let (session, notifier, _) = session_for(&server.uri(), false);
    let cars = &session.cars;
    cars.set_filter(FilterPatch::default().active(None));
    cars.load().await.unwrap();
    assert_eq!(cars.inactive().len(), 0);

    cars.set_active(&EntityId::Number(2), false).await.unwrap();

    assert_eq!(cars.total(), 2);
    let yaris = cars.items().into_iter().find(|c| c.model == "Yaris").unwrap();
    assert!(!yaris.active);
    assert_eq!(cars.inactive().len(), 1);
    assert_eq!(
        notifier.last(),
        Some(("Car deactivated".to_owned(), Severity::Success))
    );
}

#[tokio::test]
async fn live_price_range_filters_client_side() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/produtos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "produtos": [
                {"id": 1, "nome": "A", "preco": 50},
                {"id": 2, "nome": "B", "preco": 150},
                {"id": 3, "nome": "C", "preco": 250}
            ],
            "total": 3
        })))
        .mount(&server)
        .await;

    let (session, _, _) = session_for(&server.uri(), false);
    session
        .products
        .set_filter(FilterPatch::default().price_range(Some(Decimal::from(100)), Some(Decimal::from(250))));
    session.products.load().await.unwrap();

    let snapshot = session.products.snapshot();
    assert_eq!(snapshot.total, 2);
    assert_eq!(
        snapshot.items.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["B", "C"]
    );
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(k, _)| !k.contains("prec")));
}

#[tokio::test]
async fn login_then_session_expiry_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "user": {"id": 1, "nome": "Ana", "email": "ana@example.com"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})))
        .mount(&server)
        .await;

    let (session, notifier, storage) = session_for(&server.uri(), false);
    let password = SecretString::from("s3cret".to_owned());

    let user = session.auth.login("ana@example.com", &password).await.unwrap();
    assert_eq!(user.unwrap().name, "Ana");
    assert!(session.auth.is_authenticated());
    assert_eq!(session.auth.display_name(), "Ana");
    assert_eq!(
        notifier.last(),
        Some(("Login successful!".to_owned(), Severity::Success))
    );

    let mut state = session.auth.auth_state();
    let err = session.dashboard.load_stats().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);

    assert_eq!(*state.borrow_and_update(), AuthState::LoginRequired);
    assert!(!session.auth.is_authenticated());
    assert_eq!(session.auth.display_name(), "User");
    assert!(storage.get("auth_token").unwrap().is_none());
    assert!(storage.get("user_data").unwrap().is_none());
}

#[tokio::test]
async fn wrong_password_uses_credentials_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (session, notifier, _) = session_for(&server.uri(), false);
    let err = session
        .auth
        .login("ana@example.com", &SecretString::from("nope".to_owned()))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid email or password.");
    assert_eq!(notifier.last().unwrap().0, "Invalid email or password.");
    assert_eq!(*session.auth.auth_state().borrow(), AuthState::SignedOut);
}

#[tokio::test]
async fn dashboard_keeps_ten_most_recent_activities() {
    let server = MockServer::start().await;
    let activities: Vec<_> = (0..15)
        .map(|i| json!({"id": i, "descricao": format!("Atividade {i}")}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/dashboard/atividades"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "atividades": activities })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_produtos": 15})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categorias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"categorias": ["Livros"]})))
        .mount(&server)
        .await;

    let (session, _, _) = session_for(&server.uri(), false);
    session.dashboard.load_all().await.unwrap();

    let recent = session.dashboard.activities();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].description, "Atividade 0");
    assert_eq!(session.dashboard.stats().total_products, 15);
    assert_eq!(session.dashboard.categories().as_slice(), ["Livros".to_owned()]);
}
