use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::constants::{DEMO_EMAIL, DEMO_PASSWORD};
use crate::conversation::{Author, ConversationController, QuickAction};
use crate::tui::app::{App, LoginField, Screen};

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    match (app.screen(), app.chat.as_ref()) {
        (Screen::Chat, Some(chat)) => render_chat_screen(frame, app, chat),
        _ => render_login(frame, app),
    }
}

/// Center a fixed-size box inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_login(frame: &mut Frame, app: &App) {
    let form = &app.login;
    let area = centered(frame.area(), 60, 18);

    let field_style = |field: LoginField| {
        if form.focus == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let masked = "•".repeat(form.password.chars().count());

    let mut lines = vec![
        Line::from(Span::styled(
            "♥ Elder Care Assistant",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your caring companion",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Email     ", field_style(LoginField::Email)),
            Span::raw(form.email.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Password  ", field_style(LoginField::Password)),
            Span::raw(masked),
        ]),
        Line::from(""),
    ];

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    let button = if form.pending { "Signing in..." } else { "[Enter] Sign In" };
    lines.push(Line::from(Span::styled(
        button,
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "Tab: next field   Esc: quit",
        Style::default().fg(Color::DarkGray),
    )));

    if app.ui.demo_hint {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Demo Account: {} / {}", DEMO_EMAIL, DEMO_PASSWORD),
            Style::default().fg(Color::Blue),
        )));
    }

    let login = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Sign In "),
        );
    frame.render_widget(login, area);
}

fn render_chat_screen(frame: &mut Frame, app: &App, chat: &ConversationController) {
    let panel_height = if chat.shows_quick_actions() { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(3),            // Header
                Constraint::Min(6),               // Messages
                Constraint::Length(panel_height), // Quick actions
                Constraint::Length(3),            // Input or recording
                Constraint::Length(1),            // Status bar
            ]
            .as_ref() as &[Constraint],
        )
        .split(frame.area());

    render_header(frame, chunks[0], chat);
    render_messages(frame, chunks[1], app, chat);
    if chat.shows_quick_actions() {
        render_quick_actions(frame, chunks[2]);
    }
    render_input(frame, chunks[3], chat);
    render_status_bar(frame, chunks[4], app, chat);
}

/// Render the header
fn render_header(frame: &mut Frame, area: Rect, chat: &ConversationController) {
    let header_text = vec![Line::from(vec![
        Span::styled("♥ ", Style::default().fg(Color::Red)),
        Span::styled(
            format!("Hello, {}", chat.session().display_name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled("Your AI Companion", Style::default().fg(Color::Gray)),
    ])];

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

/// Render the message log
fn render_messages(frame: &mut Frame, area: Rect, app: &App, chat: &ConversationController) {
    let mut lines = Vec::new();

    for msg in chat.messages() {
        let (speaker, color) = match msg.author {
            Author::User => ("You", Color::Blue),
            Author::Assistant => ("Companion", Color::Green),
        };

        let mut speaker_line = vec![Span::styled(
            format!("[{}] ", speaker),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if msg.is_voice_origin {
            speaker_line.push(Span::styled("🎤 ", Style::default().fg(Color::Red)));
        }
        if app.ui.show_timestamps {
            speaker_line.push(Span::styled(
                msg.timestamp.format("%H:%M:%S").to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(speaker_line));

        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }

        let mut badges = Vec::new();
        if app.ui.show_mood {
            if let Some(score) = msg.mood_score {
                badges.push(Span::styled(
                    format!("Mood: {}/10", score),
                    Style::default().fg(Color::Blue),
                ));
            }
        }
        if msg.flagged_concern == Some(true) {
            if !badges.is_empty() {
                badges.push(Span::raw("  "));
            }
            badges.push(Span::styled(
                "Shared with your caregiver",
                Style::default().fg(Color::Yellow),
            ));
        }
        if !badges.is_empty() {
            lines.push(Line::from(badges));
        }

        lines.push(Line::from("")); // Empty line between messages
    }

    if chat.is_awaiting_reply() {
        lines.push(Line::from(Span::styled(
            "Companion is typing...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the newest lines in view unless the user scrolled up
    let visible = area.height.saturating_sub(2);
    let total = lines.len() as u16;
    let scroll = total
        .saturating_sub(visible)
        .saturating_sub(app.scroll_offset);

    let messages = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Conversation "),
        );
    frame.render_widget(messages, area);
}

fn render_quick_actions(frame: &mut Frame, area: Rect) {
    let colors = [Color::Magenta, Color::Cyan, Color::Red, Color::LightRed];
    let mut buttons = Vec::new();
    for (idx, action) in QuickAction::ALL.iter().enumerate() {
        buttons.push(Span::styled(
            format!(" F{} {} ", idx + 1, action.label()),
            Style::default()
                .fg(Color::Black)
                .bg(colors[idx])
                .add_modifier(Modifier::BOLD),
        ));
        buttons.push(Span::raw("  "));
    }

    let panel = Paragraph::new(vec![
        Line::from(Span::styled(
            "How can I help you today?",
            Style::default().fg(Color::Gray),
        )),
        Line::from(buttons),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(panel, area);
}

fn render_input(frame: &mut Frame, area: Rect, chat: &ConversationController) {
    let recorder = chat.recorder();
    let (content, title, border) = if recorder.is_recording() {
        (
            Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Red)),
                Span::styled(
                    format!("Recording... {}s", recorder.elapsed_secs()),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "   Enter: stop and send   Esc: cancel",
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            " Voice Message ",
            Color::Red,
        )
    } else if chat.input().is_empty() {
        (
            Line::from(Span::styled(
                "Type your message...",
                Style::default().fg(Color::DarkGray),
            )),
            " Message ",
            Color::Cyan,
        )
    } else {
        (Line::from(chat.input().to_string()), " Message ", Color::Cyan)
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    frame.render_widget(input, area);

    if !recorder.is_recording() {
        let cursor_x = area.x + 1 + chat.input().chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, chat: &ConversationController) {
    let text = match &app.status_message {
        Some(status) => status.clone(),
        None if chat.recorder().is_recording() => "Recording voice message".to_string(),
        None => "Enter: send | Ctrl+R: voice | Ctrl+L: sign out | Ctrl+C: quit".to_string(),
    };

    let status = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_box() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(area, 60, 18), Rect::new(20, 11, 60, 18));

        // Never larger than the screen
        let small = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(small, 60, 18), Rect::new(0, 0, 40, 10));
    }
}
