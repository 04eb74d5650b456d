use crate::orchestrator::{Orchestrator, draft_from_entry};
use crate::tools::{Collaborators, optimize};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vitrin_core::commerce::{
    AttributePayload, CatalogEntry, Category, CommerceApi, EntryImage, EntryPayload, EntryStatus,
    UploadedImage,
};
use vitrin_core::draft::{GeneratedContent, ImageRef, MetaField, ProductDraft};
use vitrin_core::error::{Result, VitrinError};
use vitrin_core::fetch::ImageFetcher;
use vitrin_core::generation::{ContentGenerator, StoreContext, Suggestion};
use vitrin_core::intent::IntentResolver;
use vitrin_core::messaging::MessagingTransport;
use vitrin_core::session::SessionStore;
use vitrin_core::settings::{SettingsProvider, StoreSettings};
use vitrin_core::tool::ToolRequest;
use vitrin_core::turn::{TurnAction, TurnInput};

// ============================================================================
// Mock collaborators
// ============================================================================

#[derive(Default)]
struct MockStore {
    drafts: Mutex<HashMap<String, ProductDraft>>,
}

impl MockStore {
    fn seed(&self, session_id: &str, draft: ProductDraft) {
        self.drafts
            .lock()
            .unwrap()
            .insert(session_id.to_string(), draft);
    }

    fn stored(&self, session_id: &str) -> Option<ProductDraft> {
        self.drafts.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl SessionStore for MockStore {
    async fn load(&self, session_id: &str) -> Result<ProductDraft> {
        Ok(self
            .drafts
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, session_id: &str, draft: &ProductDraft) -> Result<()> {
        self.drafts
            .lock()
            .unwrap()
            .insert(session_id.to_string(), draft.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.drafts.lock().unwrap().remove(session_id);
        Ok(())
    }
}

struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn load(&self, _session_id: &str) -> Result<ProductDraft> {
        Err(VitrinError::store("redis is down"))
    }
    async fn save(&self, _session_id: &str, _draft: &ProductDraft) -> Result<()> {
        Err(VitrinError::store("redis is down"))
    }
    async fn delete(&self, _session_id: &str) -> Result<()> {
        Err(VitrinError::store("redis is down"))
    }
}

#[derive(Default)]
struct MockCommerce {
    entries: Mutex<HashMap<u64, CatalogEntry>>,
    categories: Mutex<Vec<Category>>,
    created: Mutex<Vec<EntryPayload>>,
    updated: Mutex<Vec<(u64, EntryPayload)>>,
    uploads: AtomicUsize,
    fail_save: Mutex<Option<VitrinError>>,
}

impl MockCommerce {
    fn with_entry(self, entry: CatalogEntry) -> Self {
        self.entries.lock().unwrap().insert(entry.id, entry);
        self
    }

    fn fail_next_save(&self, err: VitrinError) {
        *self.fail_save.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl CommerceApi for MockCommerce {
    async fn get_entry(&self, id: u64) -> Result<Option<CatalogEntry>> {
        Ok(self.entries.lock().unwrap().get(&id).cloned())
    }

    async fn create_entry(&self, payload: &EntryPayload) -> Result<CatalogEntry> {
        if let Some(err) = self.fail_save.lock().unwrap().take() {
            return Err(err);
        }
        self.created.lock().unwrap().push(payload.clone());
        Ok(entry_from_payload(101, payload))
    }

    async fn update_entry(&self, id: u64, payload: &EntryPayload) -> Result<CatalogEntry> {
        if let Some(err) = self.fail_save.lock().unwrap().take() {
            return Err(err);
        }
        self.updated.lock().unwrap().push((id, payload.clone()));
        Ok(entry_from_payload(id, payload))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn upload_image(&self, _bytes: Vec<u8>, file_name: &str) -> Result<UploadedImage> {
        let id = self.uploads.fetch_add(1, Ordering::SeqCst) as u64 + 900;
        Ok(UploadedImage {
            id,
            url: format!("https://cdn.example/{file_name}"),
        })
    }
}

fn entry_from_payload(id: u64, payload: &EntryPayload) -> CatalogEntry {
    CatalogEntry {
        id,
        name: payload.name.clone(),
        sku: payload.sku.clone(),
        slug: payload.slug.clone(),
        price_minor: payload.price_minor,
        description: payload.description.clone(),
        short_description: payload.short_description.clone(),
        status: payload.status,
        categories: Vec::new(),
        tags: payload.tags.clone(),
        images: Vec::new(),
        attributes: payload.attributes.clone(),
        meta_fields: payload.meta_fields.clone(),
    }
}

#[derive(Default)]
struct MockGenerator {
    generate_calls: AtomicUsize,
    suggest_signals: Mutex<Option<Vec<String>>>,
    fail_generate: Mutex<Option<VitrinError>>,
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(
        &self,
        _draft: &ProductDraft,
        _context: &StoreContext,
    ) -> Result<GeneratedContent> {
        if let Some(err) = self.fail_generate.lock().unwrap().take() {
            return Err(err);
        }
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedContent {
            name: "Solid Pine Kids Bed".to_string(),
            slug: Some("solid-pine-kids-bed".to_string()),
            description: "A sturdy handmade bed for kids.".to_string(),
            short_description: "Sturdy pine bed.".to_string(),
            tags: vec!["kids".to_string(), "bed".to_string()],
            categories: vec!["Beds".to_string()],
            image_alts: vec!["kids bed front view".to_string()],
            ..Default::default()
        })
    }

    async fn suggest(&self, trend_signals: &[String]) -> Result<Vec<Suggestion>> {
        *self.suggest_signals.lock().unwrap() = Some(trend_signals.to_vec());
        Ok(vec![
            Suggestion {
                name: "Oak Wardrobe".to_string(),
                reason: "search volume is climbing".to_string(),
            },
            Suggestion {
                name: "Bunk Bed".to_string(),
                reason: "steady seasonal demand".to_string(),
            },
            Suggestion {
                name: "Toy Chest".to_string(),
                reason: "pairs with your bestsellers".to_string(),
            },
        ])
    }

    async fn generate_post(
        &self,
        entry: &CatalogEntry,
        topic: &str,
        _tone: Option<&str>,
    ) -> Result<String> {
        Ok(format!("{}: {topic}", entry.name))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Photo { url: String, caption: String },
    Album { urls: Vec<String>, caption: String },
}

#[derive(Default)]
struct MockTransport {
    sent: Mutex<Vec<Sent>>,
}

#[async_trait]
impl MessagingTransport for MockTransport {
    async fn send_text(&self, _chat_id: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_photo(&self, _chat_id: &str, url: &str, caption: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Photo {
            url: url.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn send_album(&self, _chat_id: &str, urls: &[String], caption: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Album {
            urls: urls.to_vec(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

struct MockSettings {
    settings: StoreSettings,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            settings: StoreSettings {
                contact_links: "t.me/myshop".to_string(),
                keyword_guide: "warm, handmade".to_string(),
                trend_signals: vec!["kids bed".to_string()],
                channel_chat_id: Some("@myshop".to_string()),
                watermark: None,
            },
        }
    }
}

#[async_trait]
impl SettingsProvider for MockSettings {
    async fn load(&self) -> Result<StoreSettings> {
        Ok(self.settings.clone())
    }
}

#[derive(Default)]
struct MockFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0xAB, 0xCD])
    }
}

#[derive(Default)]
struct MockResolver {
    calls: AtomicUsize,
    answer: Mutex<Option<ToolRequest>>,
}

#[async_trait]
impl IntentResolver for MockResolver {
    async fn resolve(&self, _text: &str, _draft: &ProductDraft) -> Result<Option<ToolRequest>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.lock().unwrap().clone())
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    orchestrator: Orchestrator,
    store: Arc<MockStore>,
    commerce: Arc<MockCommerce>,
    generator: Arc<MockGenerator>,
    transport: Arc<MockTransport>,
    fetcher: Arc<MockFetcher>,
    resolver: Arc<MockResolver>,
}

fn harness_with_commerce(commerce: MockCommerce) -> Harness {
    let store = Arc::new(MockStore::default());
    let commerce = Arc::new(commerce);
    let generator = Arc::new(MockGenerator::default());
    let transport = Arc::new(MockTransport::default());
    let fetcher = Arc::new(MockFetcher::default());
    let resolver = Arc::new(MockResolver::default());
    let collaborators = Collaborators {
        commerce: commerce.clone(),
        generator: generator.clone(),
        messaging: transport.clone(),
        settings: Arc::new(MockSettings::default()),
        fetcher: fetcher.clone(),
    };
    Harness {
        orchestrator: Orchestrator::new(store.clone(), resolver.clone(), collaborators),
        store,
        commerce,
        generator,
        transport,
        fetcher,
        resolver,
    }
}

fn harness() -> Harness {
    harness_with_commerce(MockCommerce::default())
}

fn ready_draft() -> ProductDraft {
    ProductDraft {
        raw_name: Some("Kids Bed".to_string()),
        price_minor: Some(420_000),
        images: vec![ImageRef::staged(vec![1, 2, 3])],
        ..Default::default()
    }
}

fn generated_draft() -> ProductDraft {
    let mut draft = ready_draft();
    draft.generated = Some(GeneratedContent {
        name: "Solid Pine Kids Bed".to_string(),
        description: "A sturdy handmade bed.".to_string(),
        short_description: "Sturdy pine bed.".to_string(),
        ..Default::default()
    });
    draft
}

fn stored_entry(id: u64, image_count: usize) -> CatalogEntry {
    CatalogEntry {
        id,
        name: "Kids Bed".to_string(),
        sku: None,
        slug: None,
        price_minor: Some(420_000),
        description: "desc".to_string(),
        short_description: "short".to_string(),
        status: EntryStatus::Published,
        categories: Vec::new(),
        tags: vec!["kids".to_string()],
        images: (0..image_count)
            .map(|i| EntryImage {
                id: i as u64 + 1,
                url: format!("https://cdn.example/{i}.jpg"),
                alt: None,
            })
            .collect(),
        attributes: vec![AttributePayload {
            name: "Material".to_string(),
            values: vec!["pine".to_string()],
        }],
        meta_fields: vec![MetaField {
            key: "seo_keywords".to_string(),
            value: "kids bed, pine bed".to_string(),
        }],
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn first_empty_turn_greets_and_persists_an_empty_draft() {
    let h = harness();
    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::empty())
        .await
        .unwrap();
    assert!(reply.text.contains("price"));
    assert!(h.store.stored("chat-1").unwrap().is_empty());
}

#[tokio::test]
async fn gathering_extracts_name_and_price_from_one_message() {
    let h = harness();
    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::text("Kids Bed 4200"))
        .await
        .unwrap();
    let stored = h.store.stored("chat-1").unwrap();
    assert_eq!(stored.raw_name.as_deref(), Some("Kids Bed"));
    assert_eq!(stored.price_minor, Some(420_000));
    // Still missing a photo, and the reply says so.
    assert!(reply.text.contains("photo"));
}

#[tokio::test]
async fn gathering_with_unusable_text_asks_for_the_missing_fields() {
    let h = harness();
    h.store.seed(
        "chat-1",
        ProductDraft {
            raw_name: Some("Kids Bed".to_string()),
            ..Default::default()
        },
    );
    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::text("??"))
        .await
        .unwrap();
    assert!(reply.text.contains("price"));
    assert!(reply.text.contains("photo"));
    assert!(!reply.text.contains("name,"));
}

#[tokio::test]
async fn update_details_merge_leaves_other_fields_untouched() {
    let h = harness();
    let mut seeded = ready_draft();
    seeded.material = Some("pine".to_string());
    seeded.generated = None;
    seeded.price_minor = None;
    h.store.seed("chat-1", seeded);

    h.orchestrator
        .handle_turn("chat-1", TurnInput::text("4200"))
        .await
        .unwrap();

    let stored = h.store.stored("chat-1").unwrap();
    assert_eq!(stored.price_minor, Some(420_000));
    assert_eq!(stored.raw_name.as_deref(), Some("Kids Bed"));
    assert_eq!(stored.material.as_deref(), Some("pine"));
    assert_eq!(stored.images.len(), 1);
}

#[tokio::test]
async fn confirmation_keyword_invokes_optimize_without_the_resolver() {
    let h = harness();
    h.store.seed("chat-1", ready_draft());

    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::text("optimize"))
        .await
        .unwrap();

    assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
    assert!(reply.text.contains("Solid Pine Kids Bed"));
    let stored = h.store.stored("chat-1").unwrap();
    assert!(stored.generated.is_some());
}

#[tokio::test]
async fn every_confirmation_keyword_bypasses_the_resolver() {
    for keyword in ["YES", "Proceed", "run optimization", "AI Optimize Now", " optimize "] {
        let h = harness();
        h.store.seed("chat-1", ready_draft());
        h.orchestrator
            .handle_turn("chat-1", TurnInput::text(keyword))
            .await
            .unwrap();
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0, "{keyword}");
        assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 1, "{keyword}");
    }
}

#[tokio::test]
async fn free_text_at_ready_state_consults_the_resolver() {
    let h = harness();
    h.store.seed("chat-1", ready_draft());
    *h.resolver.answer.lock().unwrap() = Some(ToolRequest::Optimize);

    h.orchestrator
        .handle_turn("chat-1", TurnInput::text("make it shine please"))
        .await
        .unwrap();

    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resolver_declining_yields_a_summary_prompt() {
    let h = harness();
    h.store.seed("chat-1", ready_draft());

    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::text("hmm what do you think"))
        .await
        .unwrap();

    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 0);
    assert!(reply.text.contains("Kids Bed"));
    assert!(reply.text.contains("optimize"));
}

#[tokio::test]
async fn optimize_precondition_fails_closed_without_an_external_call() {
    let h = harness();
    let mut draft = ProductDraft {
        raw_name: Some("Kids Bed".to_string()),
        ..Default::default()
    };
    let reply = optimize(&mut draft, &collaborators_of(&h)).await;
    assert!(reply.text.contains("price"));
    assert!(draft.generated.is_none());
    assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 0);
}

fn collaborators_of(h: &Harness) -> Collaborators {
    Collaborators {
        commerce: h.commerce.clone(),
        generator: h.generator.clone(),
        messaging: h.transport.clone(),
        settings: Arc::new(MockSettings::default()),
        fetcher: h.fetcher.clone(),
    }
}

#[tokio::test]
async fn optimize_fetches_url_images_once_and_caches_bytes_in_the_draft() {
    let h = harness();
    let mut draft = ready_draft();
    draft.images = vec![ImageRef::existing(
        7,
        "https://cdn.example/old.jpg".to_string(),
        None,
    )];
    let collaborators = collaborators_of(&h);

    optimize(&mut draft, &collaborators).await;
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(draft.images[0].bytes().is_some());

    // The second run finds bytes already cached in the draft.
    optimize(&mut draft, &collaborators).await;
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn awaiting_save_answers_free_text_with_the_fixed_hint() {
    let h = harness();
    h.store.seed("chat-1", generated_draft());

    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::text("looks great!"))
        .await
        .unwrap();

    assert!(reply.text.contains("save or publish"));
    assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Save
// ============================================================================

#[tokio::test]
async fn saving_a_new_draft_creates_one_entry_and_deletes_the_session() {
    let h = harness();
    h.store.seed("chat-1", generated_draft());

    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Draft,
            }),
        )
        .await
        .unwrap();

    let created = h.commerce.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].status, EntryStatus::Draft);
    assert_eq!(created[0].name, "Solid Pine Kids Bed");
    assert!(h.store.stored("chat-1").is_none());
    assert!(reply.text.contains("Solid Pine Kids Bed"));
}

#[tokio::test]
async fn staged_images_are_uploaded_before_the_entry_is_created() {
    let h = harness();
    h.store.seed("chat-1", generated_draft());

    h.orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Published,
            }),
        )
        .await
        .unwrap();

    assert_eq!(h.commerce.uploads.load(Ordering::SeqCst), 1);
    let created = h.commerce.created.lock().unwrap();
    assert_eq!(created[0].images.len(), 1);
    assert!(created[0].images[0].id.is_some());
}

#[tokio::test]
async fn failed_save_keeps_the_draft_byte_for_byte_and_reports_upstream() {
    let h = harness();
    let seeded = generated_draft();
    h.store.seed("chat-1", seeded.clone());
    h.commerce
        .fail_next_save(VitrinError::external("commerce", "store exploded"));

    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Draft,
            }),
        )
        .await
        .unwrap();

    assert!(reply.text.contains("store exploded"));
    assert_eq!(h.store.stored("chat-1").unwrap(), seeded);
    assert!(h.commerce.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rate_limited_save_surfaces_a_typed_retry_after() {
    let h = harness();
    h.store.seed("chat-1", generated_draft());
    h.commerce.fail_next_save(VitrinError::rate_limited(
        "commerce",
        Duration::from_secs(42),
        "too many requests",
    ));

    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Draft,
            }),
        )
        .await
        .unwrap();

    assert_eq!(reply.retry_after, Some(Duration::from_secs(42)));
    // Session survives so the identical input can be resubmitted.
    assert!(h.store.stored("chat-1").is_some());
}

#[tokio::test]
async fn saving_an_edited_entry_updates_instead_of_creating() {
    let h = harness();
    let mut draft = generated_draft();
    draft.edit_target_id = Some(55);
    h.store.seed("chat-1", draft);

    h.orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Published,
            }),
        )
        .await
        .unwrap();

    assert!(h.commerce.created.lock().unwrap().is_empty());
    let updated = h.commerce.updated.lock().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, 55);
}

#[tokio::test]
async fn edited_entry_saves_without_regeneration_and_sends_no_empty_content() {
    // A price-only edit never runs the generator, so the update payload
    // must not carry blank content that would replace the stored entry.
    let h = harness();
    let draft = ProductDraft {
        edit_target_id: Some(55),
        raw_name: Some("Kids Bed".to_string()),
        price_minor: Some(450_000),
        ..Default::default()
    };
    h.store.seed("chat-1", draft);

    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Published,
            }),
        )
        .await
        .unwrap();

    let updated = h.commerce.updated.lock().unwrap();
    assert_eq!(updated.len(), 1);
    let (id, payload) = &updated[0];
    assert_eq!(*id, 55);
    assert_eq!(payload.name, "Kids Bed");
    assert_eq!(payload.price_minor, Some(450_000));
    assert!(payload.description.is_empty());
    assert!(payload.categories.is_empty());
    assert!(payload.tags.is_empty());
    assert!(h.store.stored("chat-1").is_none());
    assert!(reply.text.contains("updated"));
}

#[tokio::test]
async fn saving_nothing_asks_to_optimize_first() {
    let h = harness();
    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::Save {
                status: EntryStatus::Draft,
            }),
        )
        .await
        .unwrap();
    assert!(reply.text.contains("optimization"));
    assert!(h.commerce.created.lock().unwrap().is_empty());
}

// ============================================================================
// Load-for-edit
// ============================================================================

#[tokio::test]
async fn load_for_edit_reverse_maps_the_entry_into_a_draft() {
    let h = harness_with_commerce(MockCommerce::default().with_entry(stored_entry(55, 2)));

    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::LoadForEdit { entry_id: 55 }),
        )
        .await
        .unwrap();

    assert!(reply.text.contains("Kids Bed"));
    let stored = h.store.stored("chat-1").unwrap();
    assert_eq!(stored.edit_target_id, Some(55));
    assert_eq!(stored.price_minor, Some(420_000));
    assert_eq!(stored.material.as_deref(), Some("pine"));
    assert_eq!(stored.focus_keywords, vec!["kids bed", "pine bed"]);
    assert_eq!(stored.images.len(), 2);
    assert_eq!(stored.images[0].external_id, Some(1));
    assert!(!stored.images[0].is_new_upload);
}

#[test]
fn reverse_mapping_falls_back_to_tags_without_the_seo_meta_field() {
    let mut entry = stored_entry(55, 1);
    entry.meta_fields.clear();
    let draft = draft_from_entry(entry);
    assert_eq!(draft.focus_keywords, vec!["kids"]);
}

#[tokio::test]
async fn load_for_edit_refuses_to_clobber_an_active_draft() {
    let h = harness_with_commerce(MockCommerce::default().with_entry(stored_entry(55, 1)));
    h.store.seed("chat-1", ready_draft());

    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::LoadForEdit { entry_id: 55 }),
        )
        .await
        .unwrap();

    assert!(reply.text.contains("already have a draft"));
    assert_eq!(h.store.stored("chat-1").unwrap(), ready_draft());
}

// ============================================================================
// Channel posting
// ============================================================================

async fn post_with_image_count(count: usize) -> Harness {
    let h = harness_with_commerce(MockCommerce::default().with_entry(stored_entry(55, count)));
    let mut draft = ProductDraft::default();
    draft.edit_target_id = Some(55);
    draft.raw_name = Some("Kids Bed".to_string());
    h.store.seed("chat-1", draft);

    h.orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::PostToChannel {
                topic: "weekend discount".to_string(),
                tone: None,
            }),
        )
        .await
        .unwrap();
    h
}

#[tokio::test]
async fn one_image_goes_out_as_a_single_captioned_photo() {
    let h = post_with_image_count(1).await;
    let sent = h.transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Sent::Photo { caption, .. } => assert!(caption.contains("weekend discount")),
        other => panic!("expected a single photo, got {other:?}"),
    }
}

#[tokio::test]
async fn several_images_go_out_as_one_album_with_caption_on_the_first() {
    let h = post_with_image_count(3).await;
    let sent = h.transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Sent::Album { urls, caption } => {
            assert_eq!(urls.len(), 3);
            assert!(caption.contains("weekend discount"));
        }
        other => panic!("expected an album, got {other:?}"),
    }
}

#[tokio::test]
async fn more_than_ten_images_are_capped_at_ten() {
    let h = post_with_image_count(14).await;
    let sent = h.transport.sent.lock().unwrap();
    match &sent[0] {
        Sent::Album { urls, .. } => assert_eq!(urls.len(), 10),
        other => panic!("expected an album, got {other:?}"),
    }
}

#[tokio::test]
async fn posting_without_an_edit_target_is_refused_locally() {
    let h = harness();
    let reply = h
        .orchestrator
        .handle_turn(
            "chat-1",
            TurnInput::Action(TurnAction::PostToChannel {
                topic: "discount".to_string(),
                tone: None,
            }),
        )
        .await
        .unwrap();
    assert!(reply.text.contains("Load the product"));
    assert!(h.transport.sent.lock().unwrap().is_empty());
}

// ============================================================================
// Suggestions, store failures
// ============================================================================

#[tokio::test]
async fn suggestions_feed_trend_signals_to_the_generator() {
    let h = harness();
    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::Action(TurnAction::SuggestIdeas))
        .await
        .unwrap();

    assert!(reply.text.contains("Oak Wardrobe"));
    assert!(reply.text.contains("Toy Chest"));
    assert_eq!(
        h.generator.suggest_signals.lock().unwrap().as_deref(),
        Some(["kids bed".to_string()].as_slice())
    );
}

#[tokio::test]
async fn a_store_failure_aborts_the_turn() {
    let resolver: Arc<MockResolver> = Arc::new(MockResolver::default());
    let h = harness();
    let orchestrator = Orchestrator::new(
        Arc::new(FailingStore),
        resolver,
        collaborators_of(&h),
    );
    let err = orchestrator
        .handle_turn("chat-1", TurnInput::text("hello"))
        .await
        .unwrap_err();
    assert!(err.is_store());
}

#[tokio::test]
async fn generation_rate_limit_persists_the_draft_and_sets_retry_after() {
    let h = harness();
    h.store.seed("chat-1", ready_draft());
    *h.generator.fail_generate.lock().unwrap() = Some(VitrinError::rate_limited(
        "generator",
        Duration::from_secs(30),
        "busy",
    ));

    let reply = h
        .orchestrator
        .handle_turn("chat-1", TurnInput::text("optimize"))
        .await
        .unwrap();

    assert_eq!(reply.retry_after, Some(Duration::from_secs(30)));
    let stored = h.store.stored("chat-1").unwrap();
    assert!(stored.generated.is_none());
    assert!(stored.ready_for_optimize());
}
