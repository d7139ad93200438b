//! Chat panel
//!
//! Two states: no contact selected, or a contact selected with a recurring
//! message refresh. At most one refresh task exists per panel; it is aborted
//! before another one starts, when the tab is left, and when the panel is
//! dropped. Every fetch carries the selection generation it was issued for,
//! and results for an older generation are thrown away.

use super::lock;
use crate::error::ClientError;
use crate::services::ChatService;
use crate::session::Session;
use crate::types::{ChatMessage, Contact, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

pub const SELECT_PROMPT: &str = "Select a contact to chat";
pub const NO_CONTACTS: &str = "No contacts yet.";
pub const NO_MESSAGES: &str = "No messages yet.";

/// A message prepared for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Written by the current user
    pub own: bool,
    pub sender_label: String,
    pub timestamp: String,
    pub text: String,
}

impl RenderedMessage {
    pub fn new(message: &ChatMessage, current_user: &UserId) -> Self {
        let own = message.is_own(current_user);
        let sender_label = if own {
            "You".to_string()
        } else {
            message
                .sender
                .as_ref()
                .and_then(|s| s.username.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string())
        };

        Self {
            own,
            sender_label,
            timestamp: message
                .created_at
                .as_ref()
                .map(|at| at.localized())
                .unwrap_or_default(),
            text: message.message_text.clone(),
        }
    }
}

pub trait ChatView: Send + Sync {
    fn render_contacts(&self, contacts: &[Contact], selected: Option<&UserId>);
    fn show_contacts_placeholder(&self, text: &str);
    fn highlight_contact(&self, user_id: &UserId);
    fn set_chat_label(&self, label: &str);
    fn set_compose_visible(&self, visible: bool);
    fn render_messages(&self, messages: &[RenderedMessage]);
    fn show_messages_placeholder(&self, text: &str);
    fn clear_messages(&self);
    fn clear_input(&self);
    fn scroll_to_latest(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    NoContactSelected,
    Polling { contact: Contact },
}

struct Inner {
    service: ChatService,
    session: Session,
    view: Arc<dyn ChatView>,
    poll_interval: Duration,
    state: Mutex<ChatState>,
    generation: AtomicU64,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate everything in flight and return the new generation
    fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Abort the refresh task held in `poller`; the caller holds its lock
    fn stop_polling(poller: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = poller.take() {
            debug!("Stopping chat polling");
            handle.abort();
        }
    }

    async fn refresh_messages(&self, contact_id: &UserId, generation: u64) -> Result<(), ClientError> {
        let user_id = self.session.user_id().ok_or(ClientError::MissingIdentity)?;
        let messages = self.service.messages(&user_id, contact_id).await?;

        if self.current_generation() != generation {
            debug!(%contact_id, generation, "Discarding stale message list");
            return Ok(());
        }

        if messages.is_empty() {
            self.view.show_messages_placeholder(NO_MESSAGES);
            return Ok(());
        }

        let rendered: Vec<RenderedMessage> = messages
            .iter()
            .map(|m| RenderedMessage::new(m, &user_id))
            .collect();
        self.view.render_messages(&rendered);
        self.view.scroll_to_latest();
        Ok(())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self
            .poller
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// Contact list, conversation view and compose form
#[derive(Clone)]
pub struct ChatPanel {
    inner: Arc<Inner>,
}

impl ChatPanel {
    pub fn new(
        service: ChatService,
        session: Session,
        view: Arc<dyn ChatView>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                session,
                view,
                poll_interval,
                state: Mutex::new(ChatState::NoContactSelected),
                generation: AtomicU64::new(0),
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> ChatState {
        lock(&self.inner.state).clone()
    }

    /// Contact whose messages are being refreshed, if any
    pub fn polling_contact(&self) -> Option<UserId> {
        match &*lock(&self.inner.state) {
            ChatState::Polling { contact } if self.is_polling() => Some(contact.user_id.clone()),
            _ => None,
        }
    }

    /// Whether a refresh task is currently running
    pub fn is_polling(&self) -> bool {
        lock(&self.inner.poller)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Tab shown: wait for the identity, reset the conversation and load contacts
    pub async fn activate(&self) -> Result<Vec<Contact>, ClientError> {
        if self.inner.session.wait_for_identity().await.is_none() {
            return Err(ClientError::MissingIdentity);
        }
        self.reset();
        self.load_contacts().await
    }

    /// Tab left: stop refreshing and forget the selection
    pub fn deactivate(&self) {
        let mut poller = lock(&self.inner.poller);
        Inner::stop_polling(&mut poller);
        self.inner.advance_generation();
        *lock(&self.inner.state) = ChatState::NoContactSelected;
    }

    fn reset(&self) {
        self.deactivate();
        let view = &self.inner.view;
        view.set_compose_visible(false);
        view.set_chat_label(SELECT_PROMPT);
        view.clear_messages();
    }

    /// Fetch and render the contact list
    pub async fn load_contacts(&self) -> Result<Vec<Contact>, ClientError> {
        let user_id = self.inner.session.user_id().ok_or(ClientError::MissingIdentity)?;
        let contacts = self.inner.service.contacts(&user_id).await?;
        debug!(count = contacts.len(), "Loaded chat contacts");

        if contacts.is_empty() {
            self.inner.view.show_contacts_placeholder(NO_CONTACTS);
        } else {
            let selected = match &*lock(&self.inner.state) {
                ChatState::Polling { contact } => Some(contact.user_id.clone()),
                ChatState::NoContactSelected => None,
            };
            self.inner.view.render_contacts(&contacts, selected.as_ref());
        }
        Ok(contacts)
    }

    /// Open the conversation with `contact` and keep it refreshed
    ///
    /// Any refresh task for a previous selection is aborted first. The initial
    /// fetch runs before this returns; later ones run on the poll interval.
    pub async fn select_contact(&self, contact: Contact) -> Result<(), ClientError> {
        let contact_id = contact.user_id.clone();

        // Held across the generation bump and the task swap: the running
        // task always carries the latest generation
        let generation = {
            let mut poller = lock(&self.inner.poller);
            let generation = self.inner.advance_generation();

            let view = &self.inner.view;
            view.highlight_contact(&contact_id);
            view.set_chat_label(&format!("Chat with {}", contact.display_name()));
            view.set_compose_visible(true);

            *lock(&self.inner.state) = ChatState::Polling { contact };
            self.start_polling(&mut poller, contact_id.clone(), generation);
            generation
        };

        self.inner.refresh_messages(&contact_id, generation).await
    }

    fn start_polling(
        &self,
        poller: &mut Option<JoinHandle<()>>,
        contact_id: UserId,
        generation: u64,
    ) {
        Inner::stop_polling(poller);

        let period = self.inner.poll_interval;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        debug!(%contact_id, ?period, "Starting chat polling");

        *poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                // Failures don't stop the refresh; the next tick tries again
                if let Err(err) = inner.refresh_messages(&contact_id, generation).await {
                    warn!(%contact_id, error = %err, "Chat refresh failed");
                }
            }
        }));
    }

    /// Send `text` to the selected contact and refresh the conversation
    ///
    /// Blank text or no selection does nothing and returns `false`. A status
    /// the service rejects is logged; the input is still cleared and the
    /// conversation refetched.
    pub async fn send_message(&self, text: &str) -> Result<bool, ClientError> {
        let content = text.trim();
        let target = match &*lock(&self.inner.state) {
            ChatState::Polling { contact } => Some(contact.user_id.clone()),
            ChatState::NoContactSelected => None,
        };
        let Some(contact_id) = target else {
            return Ok(false);
        };
        if content.is_empty() {
            return Ok(false);
        }

        let user_id = self.inner.session.user_id().ok_or(ClientError::MissingIdentity)?;
        let generation = self.inner.current_generation();

        let status = self.inner.service.send(&user_id, &contact_id, content).await?;
        if !status.is_success() {
            warn!(%contact_id, %status, "Chat service did not accept the message");
        }
        self.inner.view.clear_input();
        self.inner.refresh_messages(&contact_id, generation).await?;
        Ok(true)
    }
}
