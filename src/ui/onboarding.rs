use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::{app::App, onboarding::QUESTIONS, ui::palette::Palette};

pub fn render_onboarding(app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
    let mut lines = Vec::new();

    if let Some(id) = app.onboarding.recommended_in(app.catalog()) {
        let title = app
            .catalog()
            .get(id)
            .map(|t| t.title.as_str())
            .unwrap_or(id);
        lines.push(Line::from(Span::styled("We suggest starting with:", palette.text)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(title.to_string(), palette.accent)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "(enter) start / (esc) back",
            palette.dim,
        )));
    } else if let Some(question) = app.onboarding.current_question() {
        lines.push(Line::from(Span::styled(
            format!(
                "Question {} of {}",
                app.onboarding.question_number(),
                QUESTIONS.len()
            ),
            palette.dim,
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(question.prompt, palette.accent)));
        lines.extend((0..palette.spacing + 1).map(|_| Line::from("")));
        lines.push(Line::from(Span::styled(
            "(y) yes / (n) no / (esc) back",
            palette.dim,
        )));
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Getting started"))
        .style(palette.text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(body, area);
}
