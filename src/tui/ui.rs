use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::constants::UI_REFRESH_INTERVAL_MS;
use crate::conversation::{ChatOutcome, OutboundChat};
use crate::tui::app::{App, Screen};
use crate::tui::input::{InputAction, InputHandler};
use crate::tui::render::render_ui;

/// A finished round trip, tagged with the conversation it belongs to
type Completion = (u64, ChatOutcome);

/// Run the terminal UI
pub async fn run_ui(mut app: App) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("CareCompanion needs an interactive terminal.");
        eprintln!("   For scripted use try: carecompanion say \"your message\"");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.clear()?;

    // Chat completions come back on this channel
    let (tx, mut rx) = mpsc::channel::<Completion>(16);

    // Run the UI loop
    let res = run_app(&mut terminal, &mut app, tx, &mut rx).await;

    // Tear the conversation down before leaving: no timer outlives the UI
    if let Some(chat) = app.chat.as_mut() {
        chat.cancel_recording();
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tx: mpsc::Sender<Completion>,
    rx: &mut mpsc::Receiver<Completion>,
) -> Result<()> {
    let handler = InputHandler::new();

    loop {
        if let Some(chat) = app.chat.as_mut() {
            chat.poll_recording();
        }

        // Draw UI
        terminal.draw(|f| render_ui(f, app))?;

        // Handle input events
        if event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let screen = app.screen();
                    let recording = app
                        .chat
                        .as_ref()
                        .is_some_and(|chat| chat.recorder().is_recording());

                    let action = handler.handle_key(key, screen, recording);
                    match screen {
                        Screen::Login => {
                            if action == InputAction::Submit {
                                // Show "Signing in..." before waiting on the service
                                app.login.pending = true;
                                terminal.draw(|f| render_ui(f, app))?;
                            }
                            handle_login_action(app, action).await;
                        }
                        Screen::Chat => handle_chat_action(app, action, &tx),
                    }
                }
            }
        }

        // Deliver finished round trips
        while let Ok((generation, outcome)) = rx.try_recv() {
            match app.chat.as_mut() {
                Some(chat) if generation == app.chat_generation => {
                    chat.complete_send(outcome);
                    app.scroll_offset = 0;
                    app.status_message = None;
                }
                _ => debug!("Dropping reply for a closed conversation"),
            }
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}

async fn handle_login_action(app: &mut App, action: InputAction) {
    match action {
        InputAction::Submit => app.submit_login().await,
        InputAction::SwitchField => app.login.switch_field(),
        InputAction::Insert(c) => app.login.focused_mut().push(c),
        InputAction::Delete => {
            app.login.focused_mut().pop();
        }
        InputAction::Quit => app.quit(),
        _ => {}
    }
}

fn handle_chat_action(app: &mut App, action: InputAction, tx: &mpsc::Sender<Completion>) {
    let generation = app.chat_generation;

    match action {
        InputAction::Quit => app.quit(),
        InputAction::Logout => app.logout(),
        InputAction::ScrollUp(lines) => app.scroll_up(lines),
        InputAction::ScrollDown(lines) => app.scroll_down(lines),
        _ => {
            let Some(chat) = app.chat.as_mut() else {
                return;
            };
            let mut held_recording = false;

            let outbound = match action {
                InputAction::Submit => chat.submit_input(),
                // Shortcuts only work while the panel is shown
                InputAction::QuickAction(quick) if chat.shows_quick_actions() => {
                    chat.begin_quick_action(quick)
                }
                InputAction::ToggleRecording if chat.recorder().is_recording() => {
                    let outbound = chat.stop_recording();
                    held_recording = outbound.is_none() && chat.recorder().is_recording();
                    outbound
                }
                InputAction::ToggleRecording => {
                    chat.start_recording();
                    None
                }
                InputAction::CancelRecording => {
                    chat.cancel_recording();
                    None
                }
                InputAction::Insert(c) => {
                    chat.input_mut().push(c);
                    None
                }
                InputAction::Delete => {
                    chat.input_mut().pop();
                    None
                }
                _ => None,
            };

            if held_recording {
                app.set_status("Still waiting for a reply. Press Enter again to send your voice message.");
            }
            if let Some(outbound) = outbound {
                app.scroll_offset = 0;
                spawn_round_trip(outbound, generation, tx);
            }
        }
    }
}

/// Run the chat request off the UI loop and post its completion back
fn spawn_round_trip(outbound: OutboundChat, generation: u64, tx: &mpsc::Sender<Completion>) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = outbound.dispatch().await;
        let _ = tx.send((generation, outcome)).await;
    });
}
