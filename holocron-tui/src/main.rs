//! HOLOCRON TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use holocron_cache::{CacheError, QuerySlot};
use holocron_client::{user_slot, PageRequest, PatchUserMutation, RestClient};
use holocron_core::{Page, QueryKey, UserRecord};
use holocron_tui::config::TuiConfig;
use holocron_tui::error::TuiError;
use holocron_tui::events::{Command, TuiEvent};
use holocron_tui::logging;
use holocron_tui::notifier::EventNotifier;
use holocron_tui::state::App;
use holocron_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::de::DeserializeOwned;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    logging::init(&config.log_path)?;

    let client = Arc::new(RestClient::new(
        &config.api.base_url,
        config.request_timeout(),
    )?);
    let user = user_slot(Arc::clone(&client));
    user.set(Some(config.user.seed_record()));

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let notifier = Arc::new(EventNotifier::new(event_tx.clone()));
    let effects = Effects {
        client: Arc::clone(&client),
        user: user.clone(),
        mutation: PatchUserMutation::new(user.clone(), client, notifier),
        sender: event_tx.clone(),
    };

    let tick_rate = config.refresh_interval();
    let mut app = App::new(config, user);

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx.clone());
    for command in app.start() {
        effects.run(command);
    }

    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                // The loop drains this channel; a full queue already forces a redraw.
                let _ = event_tx.try_send(TuiEvent::Tick);
            }
            Some(event) = event_rx.recv() => {
                let mut quit = false;
                for command in app.handle_event(event) {
                    quit |= effects.run(command);
                }
                if quit {
                    break;
                }
            }
        }
    }

    tracing::info!("shutting down");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                // Receiver gone: the UI loop has exited.
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

/// Runs the side effects the application state asks for.
struct Effects {
    client: Arc<RestClient>,
    user: QuerySlot<UserRecord>,
    mutation: PatchUserMutation<RestClient, EventNotifier>,
    sender: mpsc::Sender<TuiEvent>,
}

impl Effects {
    /// Returns true when the app should exit.
    fn run(&self, command: Command) -> bool {
        match command {
            Command::FetchPage(request) => {
                if request.key == QueryKey::PEOPLE {
                    self.fetch_page(request, |request, result| TuiEvent::PeopleLoaded {
                        request,
                        result,
                    });
                } else if request.key == QueryKey::SPECIES {
                    self.fetch_page(request, |request, result| TuiEvent::SpeciesLoaded {
                        request,
                        result,
                    });
                } else {
                    tracing::warn!(key = %request.key, "no list for page request");
                }
            }
            Command::SubmitUser(record) => self.submit_user(record),
            Command::RefetchUser => self.refetch_user(),
            Command::Quit => return true,
        }
        false
    }

    fn fetch_page<T>(
        &self,
        request: PageRequest,
        wrap: fn(PageRequest, Result<Page<T>, String>) -> TuiEvent,
    ) where
        T: DeserializeOwned + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = client
                .get_page::<T>(&request.url)
                .await
                .map_err(|e| e.to_string());
            let _ = sender.send(wrap(request, result)).await;
        });
    }

    fn submit_user(&self, record: UserRecord) {
        let handle = self.mutation.spawn(Some(record));
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = match handle.await {
                Ok(result) => result.map(|_| ()).map_err(|e| e.to_string()),
                Err(join_err) => Err(join_err.to_string()),
            };
            let _ = sender.send(TuiEvent::MutationSettled(outcome)).await;
        });
    }

    fn refetch_user(&self) {
        let user = self.user.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            match user.refetch().await {
                Ok(_) | Err(CacheError::Cancelled { .. }) => {}
                Err(err) => {
                    let _ = sender
                        .send(TuiEvent::ApiError(format!("Profile load failed: {}", err)))
                        .await;
                }
            }
        });
    }
}
