use catalogue_browser::app::debouncer::TimerToken;
use catalogue_browser::app::{FetchState, Viewport, SOURCE_ID_ARG};
use catalogue_browser::domain::{SourceDescriptor, SourceId};
use catalogue_browser::runtime::{
    CatalogueHost, Collaborators, ImageLoader, Navigator, SearchWidget, ViewRenderer,
};
use catalogue_browser::source::FixtureCatalogue;
use catalogue_browser::storage::{JsonStateStore, StateStore};
use catalogue_browser::ui::CatalogueViewModel;
use catalogue_browser::worker::{WorkerMessage, WorkerResponse};
use catalogue_browser::{
    handle_event, initialize, Action, CatalogueViewController, Config, ControllerSettings, Event,
    MangaSummary, MangasPage,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SOURCE: SourceId = SourceId(1);

fn descriptor() -> SourceDescriptor {
    SourceDescriptor::new(SOURCE, "Batoto").with_header("Referer", "https://bato.to")
}

fn controller() -> CatalogueViewController {
    let registry = FixtureCatalogue::new(20).with_source(descriptor(), vec![]);
    let args = BTreeMap::from([(SOURCE_ID_ARG.to_string(), SOURCE.to_string())]);
    let (controller, actions) =
        CatalogueViewController::create(&args, &registry, None, ControllerSettings::default())
            .expect("controller");
    assert_eq!(fetches(&actions), vec![(String::new(), 0)]);
    controller
}

fn items(from: i64, count: i64) -> Vec<MangaSummary> {
    (from..from + count)
        .map(|id| MangaSummary::new(id, format!("entry {id}")))
        .collect()
}

fn page(query: &str, index: u32, items: Vec<MangaSummary>) -> Event {
    Event::WorkerResponse(WorkerResponse::PageLoaded {
        query: query.to_string(),
        page: MangasPage::new(index, items),
    })
}

fn fetches(actions: &[Action]) -> Vec<(String, u32)> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::PostToWorker(WorkerMessage::FetchPage {
                query, page_index, ..
            }) => Some((query.clone(), *page_index)),
            _ => None,
        })
        .collect()
}

fn scheduled(actions: &[Action]) -> Option<TimerToken> {
    actions.iter().find_map(|action| match action {
        Action::ScheduleTimer { token, .. } => Some(*token),
        _ => None,
    })
}

#[test]
fn scenario_a_endless_scroll_until_exhausted() {
    let mut controller = controller();

    handle_event(&mut controller, &page("", 0, items(0, 40)));
    assert_eq!(controller.fetch_state(), FetchState::HasMore);
    assert!(controller.has_next_page());
    assert_eq!(controller.visible_items().len(), 40);

    let (_, far) = handle_event(&mut controller, &Event::Scrolled(Viewport::new(0, 10, 40)));
    assert!(fetches(&far).is_empty());

    let (_, near) = handle_event(&mut controller, &Event::Scrolled(Viewport::new(26, 10, 40)));
    assert_eq!(fetches(&near), vec![(String::new(), 1)]);

    let (_, again) = handle_event(&mut controller, &Event::Scrolled(Viewport::new(30, 10, 40)));
    assert!(fetches(&again).is_empty());

    handle_event(&mut controller, &page("", 1, vec![]));
    assert_eq!(controller.fetch_state(), FetchState::Exhausted);
    assert!(!controller.has_next_page());
    assert_eq!(controller.visible_items().len(), 40);

    let (_, after) = handle_event(&mut controller, &Event::Scrolled(Viewport::new(30, 10, 40)));
    assert!(fetches(&after).is_empty());
}

#[test]
fn scenario_b_typing_burst_delivers_last_value_once() {
    let mut controller = controller();
    handle_event(&mut controller, &Event::Activated);

    let mut tokens = Vec::new();
    let mut all_fetches = Vec::new();
    for text in ["n", "na", "nar", "naru"] {
        let (_, actions) = handle_event(&mut controller, &Event::SearchTextChanged(text.to_string()));
        all_fetches.extend(fetches(&actions));
        tokens.push(scheduled(&actions).expect("timer scheduled"));
    }
    assert!(all_fetches.is_empty());

    // Fire every timer, as a host that failed to cancel superseded ones would.
    for token in tokens {
        let (_, actions) = handle_event(&mut controller, &Event::TimerElapsed(token));
        all_fetches.extend(fetches(&actions));
    }

    assert_eq!(all_fetches, vec![("naru".to_string(), 0)]);
    assert_eq!(controller.query(), "naru");
}

#[test]
fn scenario_c_submit_supersedes_pending_keystroke() {
    let mut controller = controller();
    handle_event(&mut controller, &Event::Activated);

    let (_, actions) = handle_event(&mut controller, &Event::SearchTextChanged("one piec".into()));
    let pending = scheduled(&actions).expect("timer scheduled");

    let (_, actions) = handle_event(&mut controller, &Event::SearchSubmitted("one piece".into()));
    assert!(actions.contains(&Action::CancelTimer { token: pending }));
    assert!(actions.contains(&Action::ScrollToTop));
    assert_eq!(fetches(&actions), vec![("one piece".to_string(), 0)]);
    assert_eq!(controller.query(), "one piece");

    let (render, actions) = handle_event(&mut controller, &Event::TimerElapsed(pending));
    assert!(!render);
    assert!(actions.is_empty());
    assert_eq!(controller.query(), "one piece");
}

#[test]
fn scenario_d_stale_next_page_is_discarded_after_restart() {
    let mut controller = controller();
    handle_event(&mut controller, &page("", 0, items(0, 40)));
    let (_, actions) = handle_event(&mut controller, &Event::Scrolled(Viewport::new(30, 10, 40)));
    assert_eq!(fetches(&actions), vec![(String::new(), 1)]);

    let (_, actions) = handle_event(&mut controller, &Event::SearchSubmitted("x".into()));
    assert_eq!(fetches(&actions), vec![("x".to_string(), 0)]);
    assert!(controller.visible_items().is_empty());

    let (render, _) = handle_event(&mut controller, &page("", 1, items(40, 20)));
    assert!(!render);
    assert!(controller.visible_items().is_empty());
    assert_eq!(controller.fetch_state(), FetchState::FetchingFirstPage);

    handle_event(&mut controller, &page("x", 0, items(100, 3)));
    let ids: Vec<i64> = controller.visible_items().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![100, 101, 102]);
}

#[test]
fn unchanged_query_restart_is_inert() {
    let mut controller = controller();
    handle_event(&mut controller, &page("", 0, items(0, 10)));

    let (render, actions) = handle_event(&mut controller, &Event::SearchSubmitted(String::new()));
    assert!(!render);
    assert!(actions.is_empty());
    assert_eq!(controller.fetch_state(), FetchState::HasMore);
    assert_eq!(controller.visible_items().len(), 10);
}

#[derive(Default)]
struct Recorded {
    frames: usize,
    scroll_to_top: usize,
    opened: Vec<(i64, bool)>,
    presets: Vec<String>,
    thumbnails: Vec<(usize, usize, String)>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Recorded>>);

impl Recorder {
    fn with<T>(&self, f: impl FnOnce(&mut Recorded) -> T) -> T {
        let mut guard = self.0.lock().expect("recorder lock");
        f(&mut guard)
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            navigator: Box::new(self.clone()),
            images: Box::new(self.clone()),
            search: Box::new(self.clone()),
            renderer: Box::new(self.clone()),
        }
    }
}

impl Navigator for Recorder {
    fn open_detail(&mut self, manga: &MangaSummary, from_network: bool) {
        self.with(|r| r.opened.push((manga.id, from_network)));
    }
}

impl ImageLoader for Recorder {
    fn load_thumbnail(&mut self, position: usize, slot: usize, url: &str, _: &BTreeMap<String, String>) {
        self.with(|r| r.thumbnails.push((position, slot, url.to_string())));
    }
}

impl SearchWidget for Recorder {
    fn preset_query(&mut self, query: &str) {
        self.with(|r| r.presets.push(query.to_string()));
    }
}

impl ViewRenderer for Recorder {
    fn rows(&self) -> usize {
        10
    }

    fn render(&mut self, _: &CatalogueViewModel) {
        self.with(|r| r.frames += 1);
    }

    fn scroll_to_top(&mut self) {
        self.with(|r| r.scroll_to_top += 1);
    }
}

fn fixture() -> FixtureCatalogue {
    let manga = (0..45)
        .map(|id| {
            let title = if id % 2 == 0 {
                format!("Berserk vol {id}")
            } else {
                format!("Naruto vol {id}")
            };
            MangaSummary::new(id, title)
        })
        .collect();
    FixtureCatalogue::new(20).with_source(descriptor(), manga)
}

fn config(debounce_ms: u64) -> Config {
    Config {
        source_id: Some(SOURCE),
        debounce_ms,
        ..Config::default()
    }
}

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn host_debounces_typing_through_real_timers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonStateStore::new(dir.path().join("state.json")).expect("store");
    let catalogue = fixture();
    let (controller, actions) = initialize(&config(30), &catalogue, &store).expect("initialize");

    let recorder = Recorder::default();
    let mut host =
        CatalogueHost::new(controller, actions, Box::new(catalogue), recorder.collaborators()).expect("host");
    host.dispatch(&Event::Activated).expect("activate");
    assert!(host
        .pump_until(WAIT, |c| c.visible_items().len() == 20)
        .expect("pump"));

    let mailbox = host.mailbox();
    for text in ["b", "be", "ber"] {
        mailbox.send(Event::SearchTextChanged(text.to_string())).expect("send");
    }

    assert!(host
        .pump_until(WAIT, |c| c.query() == "ber" && c.fetch_state() != FetchState::FetchingFirstPage)
        .expect("pump"));
    assert_eq!(host.pending_timers(), 0);
    assert_eq!(recorder.with(|r| r.scroll_to_top), 1);
    assert!(host
        .controller()
        .visible_items()
        .iter()
        .all(|m| m.title.starts_with("Berserk")));

    host.shutdown().expect("shutdown");
}

#[test]
fn saved_view_restores_without_fetching() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state_path = dir.path().join("nested").join("state.json");

    let saved_ids: Vec<i64> = {
        let mut store = JsonStateStore::new(state_path.clone()).expect("store");
        let catalogue = fixture();
        let (controller, actions) = initialize(&config(1000), &catalogue, &store).expect("initialize");
        assert!(!controller.was_restored());

        let recorder = Recorder::default();
        let mut host =
            CatalogueHost::new(controller, actions, Box::new(catalogue), recorder.collaborators()).expect("host");
        host.dispatch(&Event::SearchSubmitted("naruto".into())).expect("submit");
        assert!(host
            .pump_until(WAIT, |c| c.query() == "naruto" && c.fetch_state() == FetchState::HasMore)
            .expect("pump"));

        host.dispatch(&Event::ItemSelected(0)).expect("select");
        let first = host.controller().visible_items()[0].clone();
        assert_eq!(recorder.with(|r| r.opened.clone()), vec![(first.id, true)]);

        let thumb = first.clone().with_thumbnail("https://img/cover.jpg");
        host.dispatch(&Event::MangaUpdated(thumb)).expect("update");
        assert_eq!(
            recorder.with(|r| r.thumbnails.clone()),
            vec![(0, 0, "https://img/cover.jpg".to_string())]
        );

        let ids = host.controller().visible_items().iter().map(|m| m.id).collect();
        let state = host.shutdown().expect("shutdown").expect("saved state");
        assert_eq!(state.query, "naruto");
        store.save(&state).expect("save");
        ids
    };

    let store = JsonStateStore::new(state_path).expect("reopen store");
    let catalogue = fixture();
    let (controller, actions) = initialize(&config(1000), &catalogue, &store).expect("initialize");

    assert!(actions.is_empty());
    assert!(controller.was_restored());
    assert_eq!(controller.query(), "naruto");
    assert_eq!(controller.fetch_state(), FetchState::HasMore);
    let restored_ids: Vec<i64> = controller.visible_items().iter().map(|m| m.id).collect();
    assert_eq!(restored_ids, saved_ids);
    assert_eq!(
        controller.visible_items()[0].thumbnail_url.as_deref(),
        Some("https://img/cover.jpg")
    );

    let recorder = Recorder::default();
    let mut host =
        CatalogueHost::new(controller, actions, Box::new(catalogue), recorder.collaborators()).expect("host");
    host.dispatch(&Event::SearchWidgetBuilt).expect("widget");
    assert_eq!(recorder.with(|r| r.presets.clone()), vec!["naruto".to_string()]);
    assert!(!host.pump(Duration::from_millis(50)).expect("pump"));
    host.shutdown().expect("shutdown");
}

#[test]
fn missing_source_is_a_configuration_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonStateStore::new(dir.path().join("state.json")).expect("store");
    let catalogue = fixture();

    let result = initialize(&Config::default(), &catalogue, &store);
    assert!(matches!(result, Err(catalogue_browser::CatalogueError::Config(_))));

    let unknown = Config {
        source_id: Some(SourceId(77)),
        ..Config::default()
    };
    assert!(initialize(&unknown, &catalogue, &store).is_err());
}
