use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::{app::App, ui::palette::Palette};

pub fn render_home(app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3 + palette.spacing), // greeting
            Constraint::Min(3),                      // tracks
            Constraint::Length(2),                   // legend
        ])
        .split(area);

    let continue_title = app
        .catalog()
        .get(&app.continue_track_id())
        .map(|t| t.title.clone())
        .unwrap_or_default();
    let greeting = Paragraph::new(vec![
        Line::from(Span::styled("Olá! Ready to keep learning?", palette.accent)),
        Line::from(Span::styled(
            format!("Press c to continue with \"{continue_title}\""),
            palette.text,
        )),
    ])
    .style(palette.text)
    .wrap(Wrap { trim: true });
    f.render_widget(greeting, chunks[0]);

    let items: Vec<ListItem> = app
        .catalog()
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if i == app.home_cursor { "▶ " } else { "  " };
            let (label, style) = if track.locked {
                (format!("{marker}🔒 {}", track.title), palette.locked)
            } else {
                let steps = track.steps.len();
                let noun = if steps == 1 { "step" } else { "steps" };
                (format!("{marker}{} ({steps} {noun})", track.title), palette.text)
            };
            let style = if i == app.home_cursor && !track.locked {
                palette.selected
            } else {
                style
            };
            let mut lines = vec![Line::from(Span::styled(label, style))];
            lines.extend((0..palette.spacing).map(|_| Line::from("")));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Tracks"))
        .style(palette.text);
    // keeps the cursor on screen when large text pushes tracks past the bottom
    let mut state = ListState::default().with_selected(Some(app.home_cursor));
    f.render_stateful_widget(list, chunks[1], &mut state);

    let legend = Paragraph::new(Span::styled(
        "(↑/↓) choose / (enter) open / (c)ontinue / (s)ettings / (o)nboarding / (q)uit",
        palette.dim,
    ))
    .wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[2]);
}
