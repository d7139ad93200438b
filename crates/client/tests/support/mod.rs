//! Shared fixtures for the client integration tests

#![allow(dead_code)]

use parlor_client::services::{ChatService, FriendService};
use parlor_client::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use parlor_client::views::{
    ChatPanel, ChatView, DashboardView, Feedback, FormView, FriendRequestRow, FriendRequestView,
    RenderedMessage,
};
use parlor_client::{
    AuthenticatedClient, ClientConfig, Contact, MemoryTokenStore, NavigationLog, PublicClient,
    Session, TokenStore, UserId,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

/// Route library logs through the test harness; `RUST_LOG` controls verbosity
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Everything a test needs to talk to a mock chat service
pub struct Harness {
    pub server: MockServer,
    pub config: ClientConfig,
    pub store: Arc<MemoryTokenStore>,
    pub navigator: Arc<NavigationLog>,
    pub client: AuthenticatedClient,
    pub session: Session,
    pub view: Arc<RecordingView>,
}

impl Harness {
    pub async fn start() -> Self {
        init_tracing();
        let server = MockServer::start().await;
        let config = ClientConfig {
            poll_interval_ms: 50,
            login_redirect_delay_ms: 20,
            request_timeout_ms: Some(5_000),
            ..ClientConfig::new(server.uri())
        };
        let store = Arc::new(MemoryTokenStore::new());
        let navigator = Arc::new(NavigationLog::new());
        let client = AuthenticatedClient::new(
            PublicClient::new(&config).unwrap(),
            store.clone(),
            navigator.clone(),
        );

        Self {
            server,
            config,
            store,
            navigator,
            client,
            session: Session::new(),
            view: Arc::new(RecordingView::default()),
        }
    }

    pub fn with_tokens(self, access: Option<&str>, refresh: Option<&str>) -> Self {
        if let Some(access) = access {
            self.store.set(ACCESS_TOKEN_KEY, access).unwrap();
        }
        if let Some(refresh) = refresh {
            self.store.set(REFRESH_TOKEN_KEY, refresh).unwrap();
        }
        self
    }

    pub fn signed_in(self, user_id: i64) -> Self {
        self.session.set_user_id(UserId::from(user_id));
        self
    }

    pub fn chat_panel(&self) -> ChatPanel {
        ChatPanel::new(
            ChatService::new(self.client.clone()),
            self.session.clone(),
            self.view.clone(),
            self.config.poll_interval(),
        )
    }

    pub fn friend_service(&self) -> FriendService {
        FriendService::new(self.client.clone())
    }

    /// Requests the mock server saw whose path is exactly `path`
    pub async fn hits(&self, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }
}

pub fn contact(id: i64, name: &str) -> Contact {
    Contact {
        user_id: UserId::from(id),
        username: Some(name.to_string()),
        email: None,
    }
}

pub async fn settle(intervals: u32) {
    tokio::time::sleep(Duration::from_millis(50 * u64::from(intervals))).await;
}

/// Everything a view was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ContentVisible(bool),
    Loading,
    LoadingHidden,
    Error(String),
    Success(String),
    DisplayName(String),
    Requests(Vec<FriendRequestRow>),
    Placeholder(String),
    Feedback(Feedback),
    FeedbackCleared,
    Contacts(Vec<Contact>, Option<UserId>),
    ContactsPlaceholder(String),
    Highlight(UserId),
    ChatLabel(String),
    ComposeVisible(bool),
    Messages(Vec<RenderedMessage>),
    MessagesPlaceholder(String),
    MessagesCleared,
    InputCleared,
    Scrolled,
}

#[derive(Debug, Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &ViewEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }

    pub fn last_messages(&self) -> Option<Vec<RenderedMessage>> {
        self.events().into_iter().rev().find_map(|e| match e {
            ViewEvent::Messages(m) => Some(m),
            _ => None,
        })
    }
}

impl DashboardView for RecordingView {
    fn set_content_visible(&self, visible: bool) {
        self.push(ViewEvent::ContentVisible(visible));
    }
    fn show_loading(&self) {
        self.push(ViewEvent::Loading);
    }
    fn hide_loading(&self) {
        self.push(ViewEvent::LoadingHidden);
    }
    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }
    fn set_display_name(&self, name: &str) {
        self.push(ViewEvent::DisplayName(name.to_string()));
    }
}

impl FriendRequestView for RecordingView {
    fn render_requests(&self, rows: &[FriendRequestRow]) {
        self.push(ViewEvent::Requests(rows.to_vec()));
    }
    fn show_placeholder(&self, text: &str) {
        self.push(ViewEvent::Placeholder(text.to_string()));
    }
    fn show_feedback(&self, feedback: &Feedback) {
        self.push(ViewEvent::Feedback(feedback.clone()));
    }
    fn clear_feedback(&self) {
        self.push(ViewEvent::FeedbackCleared);
    }
}

impl ChatView for RecordingView {
    fn render_contacts(&self, contacts: &[Contact], selected: Option<&UserId>) {
        self.push(ViewEvent::Contacts(contacts.to_vec(), selected.cloned()));
    }
    fn show_contacts_placeholder(&self, text: &str) {
        self.push(ViewEvent::ContactsPlaceholder(text.to_string()));
    }
    fn highlight_contact(&self, user_id: &UserId) {
        self.push(ViewEvent::Highlight(user_id.clone()));
    }
    fn set_chat_label(&self, label: &str) {
        self.push(ViewEvent::ChatLabel(label.to_string()));
    }
    fn set_compose_visible(&self, visible: bool) {
        self.push(ViewEvent::ComposeVisible(visible));
    }
    fn render_messages(&self, messages: &[RenderedMessage]) {
        self.push(ViewEvent::Messages(messages.to_vec()));
    }
    fn show_messages_placeholder(&self, text: &str) {
        self.push(ViewEvent::MessagesPlaceholder(text.to_string()));
    }
    fn clear_messages(&self) {
        self.push(ViewEvent::MessagesCleared);
    }
    fn clear_input(&self) {
        self.push(ViewEvent::InputCleared);
    }
    fn scroll_to_latest(&self) {
        self.push(ViewEvent::Scrolled);
    }
}

impl FormView for RecordingView {
    fn show_success(&self, message: &str) {
        self.push(ViewEvent::Success(message.to_string()));
    }
    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }
}
