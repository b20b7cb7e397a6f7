use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use storyteller_core::ChatRole;
use crate::app::App;

const SPINNER: [&str; 3] = ["◐", "◓", "◑"];
const SEND_LABEL: &str = "[ Send ]";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input row, footer
    let [header_area, chat_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_row);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" History Storyteller ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}]", app.session_id), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn role_line(role: ChatRole) -> Line<'static> {
    let color = match role {
        ChatRole::User => Color::Cyan,
        ChatRole::Assistant => Color::Yellow,
    };
    Line::from(Span::styled(
        format!("{}:", role.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// The chat panel content, wrapped the same way for drawing and line counting
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(text) = &app.loading {
        let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{} {}", spinner, text),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
    }

    for msg in &app.messages {
        lines.push(role_line(msg.role));
        for line in msg.text().lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.typing {
        lines.push(role_line(ChatRole::Assistant));
        // Three dots, the brightest one cycles with the animation tick
        let dots: Vec<Span> = (0..3)
            .map(|i| {
                let color = if i == app.animation_frame as usize { Color::White } else { Color::DarkGray };
                Span::styled("● ", Style::default().fg(color))
            })
            .collect();
        lines.push(Line::from(dots));
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    let (height, width) = (area.height.saturating_sub(2), area.width.saturating_sub(2));
    app.chat_area = Some(area);
    if (height, width) != (app.chat_height, app.chat_width) {
        app.chat_height = height;
        app.chat_width = width;
        app.scroll_to_bottom();
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let total_lines = app.total_lines();
    let chat = chat_paragraph(app)
        .block(block)
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);

    // Render scrollbar
    if total_lines > app.chat_height as usize {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(app.scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_LABEL.len() as u16 + 2),
    ])
    .areas(area);

    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    let (border_color, text_color, title) = if !app.input_enabled {
        (Color::DarkGray, Color::DarkGray, " Waiting for the storyteller... ")
    } else if app.input_focused {
        (Color::Yellow, Color::Cyan, " Ask about history ")
    } else {
        (Color::Gray, Color::Cyan, " Ask about history ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(input_block);

    frame.render_widget(input, input_area);

    // Show cursor only while the field has focus
    if app.input_enabled && app.input_focused {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((
            input_area.x + cursor_x + 1,
            input_area.y + 1,
        ));
    }

    let send_style = if app.input_enabled {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let send = Paragraph::new(Span::styled(SEND_LABEL, send_style))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border_color)));
    frame.render_widget(send, send_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.typing {
        " waiting for reply "
    } else if app.is_revealing() {
        " typing "
    } else {
        " ready "
    };

    let footer = Line::from(vec![
        Span::styled(status, Style::default().bg(Color::Blue).fg(Color::White)),
        Span::styled(
            " Enter send  PgUp/PgDn scroll  Esc quit",
            Style::default().fg(Color::Gray),
        ),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}
