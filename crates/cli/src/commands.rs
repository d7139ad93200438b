//! CLI commands

use anyhow::{Context, Result, anyhow, bail};
use clap::Subcommand;
use parlor_client::services::{AuthService, ChatService, FriendService};
use parlor_client::views::{
    BootstrapOutcome, ChatPanel, Dashboard, FriendRequestPanel, LoginForm, RegisterForm, logout,
};
use parlor_client::{
    AuthenticatedClient, ClientConfig, ClientError, Contact, FileTokenStore, NavigationLog,
    PublicClient, Session,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::config;
use crate::terminal::TerminalView;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        username: String,

        /// Prompted for on stdin when omitted
        #[arg(long, env = "PARLOR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Prompted for on stdin when omitted
        #[arg(long, env = "PARLOR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who the stored session belongs to
    Whoami,

    /// Incoming friend requests
    Requests {
        #[command(subcommand)]
        command: RequestCommands,
    },

    /// List the people you can chat with
    Contacts,

    /// Open a conversation; each line on stdin is sent, EOF or Ctrl-C leaves
    Chat {
        /// Contact username, email or user id
        contact: String,
    },
}

#[derive(Subcommand)]
pub enum RequestCommands {
    /// List requests addressed to you (* marks pending ones)
    List,

    /// Accept a pending request
    Accept { request_id: i64 },

    /// Reject a pending request
    Reject { request_id: i64 },

    /// Send a request to a username or email
    Send { query: String },
}

impl Commands {
    /// Runs until the user leaves rather than to completion
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Chat { .. })
    }

    pub async fn execute(self, client_config: ClientConfig, data_dir: PathBuf) -> Result<()> {
        let app = App::new(client_config, &data_dir)?;

        match self {
            Self::Login { username, password } => {
                let password = read_password(password).await?;
                app.login(&username, &password).await
            }
            Self::Register {
                username,
                email,
                password,
            } => {
                let password = read_password(password).await?;
                app.register(&username, &email, &password).await
            }
            Self::Logout => {
                logout(&*app.store, &*app.navigator)?;
                println!("Logged out.");
                Ok(())
            }
            Self::Whoami => {
                let dashboard = app.sign_in().await?;
                if let Some(user_id) = dashboard.session().user_id() {
                    println!("User id: {user_id}");
                }
                Ok(())
            }
            Self::Requests { command } => command.execute(&app).await,
            Self::Contacts => {
                let dashboard = app.sign_in().await?;
                dashboard
                    .chat()
                    .load_contacts()
                    .await
                    .map_err(login_hint)?;
                Ok(())
            }
            Self::Chat { contact } => app.chat(&contact).await,
        }
    }
}

impl RequestCommands {
    async fn execute(self, app: &App) -> Result<()> {
        let dashboard = app.sign_in().await?;
        let friends = dashboard.friends();

        match self {
            Self::List => {
                friends.load().await.map_err(login_hint)?;
            }
            Self::Accept { request_id } => {
                friends.accept(request_id).await.map_err(login_hint)?;
            }
            Self::Reject { request_id } => {
                friends.reject(request_id).await.map_err(login_hint)?;
            }
            Self::Send { query } => {
                friends.send_request(&query).await.map_err(login_hint)?;
            }
        }
        Ok(())
    }
}

/// Shared plumbing for one CLI invocation
struct App {
    config: ClientConfig,
    public: PublicClient,
    store: Arc<FileTokenStore>,
    navigator: Arc<NavigationLog>,
    view: Arc<TerminalView>,
}

impl App {
    fn new(config: ClientConfig, data_dir: &Path) -> Result<Self> {
        let public = PublicClient::new(&config).context("Invalid client configuration")?;
        let store = Arc::new(config::open_token_store(data_dir)?);
        debug!(path = %store.path().display(), "Opened session file");

        Ok(Self {
            config,
            public,
            store,
            navigator: Arc::new(NavigationLog::new()),
            view: Arc::new(TerminalView::new()),
        })
    }

    fn client(&self) -> AuthenticatedClient {
        AuthenticatedClient::new(
            self.public.clone(),
            self.store.clone(),
            self.navigator.clone(),
        )
    }

    fn dashboard(&self) -> Dashboard {
        let client = self.client();
        let session = Session::new();
        Dashboard::new(
            client.clone(),
            session.clone(),
            self.view.clone(),
            FriendRequestPanel::new(
                FriendService::new(client.clone()),
                session.clone(),
                self.view.clone(),
            ),
            ChatPanel::new(
                ChatService::new(client),
                session,
                self.view.clone(),
                self.config.poll_interval(),
            ),
            self.config.login_redirect_delay(),
        )
    }

    /// Validate the stored session; fails unless the identity is known
    async fn sign_in(&self) -> Result<Dashboard> {
        let dashboard = self.dashboard();
        match dashboard.load().await {
            BootstrapOutcome::Ready(user_id) => {
                debug!(%user_id, "Session ready");
                Ok(dashboard)
            }
            BootstrapOutcome::ProfileUnavailable => {
                bail!("the session is valid but the profile could not be loaded")
            }
            BootstrapOutcome::RedirectedToLogin => bail!("not logged in; run `parlor login`"),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let form = LoginForm::new(
            AuthService::new(self.public.clone()),
            self.store.clone(),
            self.navigator.clone(),
            self.view.clone(),
        );
        if !form.submit(username, password).await? {
            bail!("login rejected");
        }
        println!("Logged in as {username}.");
        Ok(())
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let form = RegisterForm::new(AuthService::new(self.public.clone()), self.view.clone());
        if !form.submit(username, email, password).await? {
            bail!("registration rejected");
        }
        Ok(())
    }

    async fn chat(&self, query: &str) -> Result<()> {
        let dashboard = self.sign_in().await?;
        let chat = dashboard.chat();

        let contacts = chat.activate().await.map_err(login_hint)?;
        let contact = find_contact(&contacts, query)
            .ok_or_else(|| anyhow!("no contact matches {query:?}"))?;
        info!(contact_id = %contact.user_id, "Opening conversation");

        if let Err(err) = chat.select_contact(contact).await {
            if err.is_login_redirect() {
                chat.deactivate();
                return Err(login_hint(err));
            }
            warn!(error = %err, "Initial message fetch failed");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let outcome = loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => match chat.send_message(&line).await {
                        Ok(_) => {}
                        Err(err) if err.is_login_redirect() => break Err(login_hint(err)),
                        Err(err) => {
                            warn!(error = %err, "Sending message failed");
                            eprintln!("Message not sent: {err}");
                        }
                    },
                    Ok(None) => break Ok(()),
                    Err(err) => break Err(err.into()),
                },
                _ = tokio::signal::ctrl_c() => break Ok(()),
            }
        };

        chat.deactivate();
        outcome
    }
}

/// Match by user id, or case-insensitively by username or email
fn find_contact(contacts: &[Contact], query: &str) -> Option<Contact> {
    let query = query.trim();
    let matches = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case(query))
    };

    contacts
        .iter()
        .find(|c| c.user_id.as_str() == query || matches(&c.username) || matches(&c.email))
        .cloned()
}

fn login_hint(err: ClientError) -> anyhow::Error {
    if err.is_login_redirect() {
        anyhow!("session expired; run `parlor login`")
    } else {
        err.into()
    }
}

async fn read_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read password")?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("a password is required");
    }
    Ok(password.to_string())
}
