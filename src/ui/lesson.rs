use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    lesson::{Affordance, DictationState, StepView},
    ui::palette::Palette,
};

const HORIZONTAL_MARGIN: u16 = 2;

pub fn render_lesson(app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
    let Some(view) = app.view() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(2),                   // title + subtitle
            Constraint::Length(1),                   // progress
            Constraint::Length(1 + palette.spacing), // padding
            Constraint::Min(4),                      // card
            Constraint::Length(1),                   // status
            Constraint::Length(2),                   // legend
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(view.title.clone(), palette.accent)),
        Line::from(vec![
            Span::styled(view.subtitle.clone(), palette.dim),
            Span::raw("  "),
            Span::styled(step_dots(view), palette.accent),
        ]),
    ]);
    f.render_widget(header, chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(palette.gauge)
        .percent(view.progress_percent.min(100) as u16)
        .label(format!("{}%", view.progress_percent));
    f.render_widget(gauge, chunks[1]);

    let card = Paragraph::new(card_lines(view, palette, chunks[3].width))
        .block(Block::default().borders(Borders::ALL))
        .style(palette.text)
        .wrap(Wrap { trim: false });
    f.render_widget(card, chunks[3]);

    if let Some(status) = app.status() {
        let status = Paragraph::new(Span::styled(status.to_string(), palette.status))
            .alignment(Alignment::Center);
        f.render_widget(status, chunks[4]);
    }

    let legend = Paragraph::new(Span::styled(legend(view), palette.dim)).wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[5]);
}

/// One dot per step, filled up to the current one
fn step_dots(view: &StepView) -> String {
    (1..=view.total_steps)
        .map(|n| if n <= view.step_number { '●' } else { '○' })
        .join(" ")
}

fn blank_lines(palette: &Palette) -> impl Iterator<Item = Line<'static>> {
    (0..palette.spacing.max(1)).map(|_| Line::from(""))
}

fn card_lines(view: &StepView, palette: &Palette, width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(view.question.clone(), palette.accent))];
    lines.extend(blank_lines(palette));
    lines.push(Line::from(Span::styled(view.instruction.clone(), palette.text)));
    lines.extend(blank_lines(palette));

    match &view.affordance {
        Affordance::TextField {
            placeholder,
            value,
            dictation,
        } => {
            let field = if value.is_empty() {
                Span::styled(placeholder.clone(), palette.dim)
            } else {
                Span::styled(value.clone(), palette.text)
            };
            // pad the field to a visible box width
            let inner = width.saturating_sub(8) as usize;
            let shown = if value.is_empty() { placeholder } else { value };
            let pad = " ".repeat(inner.saturating_sub(shown.width()));
            lines.push(Line::from(vec![
                Span::styled("Answer: ", palette.text),
                field,
                Span::styled("▏", palette.accent),
                Span::styled(pad, palette.dim),
            ]));
            let mic = match dictation {
                DictationState::Unavailable => "🎤 dictation unavailable",
                DictationState::Ready => "🎤 ctrl+d to dictate",
                DictationState::Listening => "🎤 listening... (ctrl+d to stop)",
            };
            lines.push(Line::from(Span::styled(mic, palette.dim)));
        }
        Affordance::Options { labels, selected } => {
            for (i, label) in labels.iter().enumerate() {
                let style = if *selected == Some(i) {
                    palette.selected
                } else {
                    palette.text
                };
                lines.push(Line::from(Span::styled(format!(" {} {label} ", i + 1), style)));
                lines.extend((0..palette.spacing).map(|_| Line::from("")));
            }
        }
    }
    lines
}

fn legend(view: &StepView) -> String {
    let mut keys = vec!["(enter) next", "(tab) skip", "(esc) home", "(ctrl+r) read aloud"];
    match view.affordance {
        Affordance::TextField { .. } => keys.push("(ctrl+d) dictate"),
        Affordance::Options { .. } => keys.push("(1-9/↑↓) choose"),
    }
    if view.has_link {
        keys.push("(ctrl+o) open course");
    }
    keys.iter().join(" / ")
}
