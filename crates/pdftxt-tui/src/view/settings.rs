use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use pdftxt_core::Method;

use crate::app::App;
use crate::model::settings::{SettingsItem, SettingsState};
use crate::theme::Theme;

/// Render the settings screen into the given area.
pub fn render_in(f: &mut Frame, app: &App, area: Rect, footer_area: Rect) {
    let theme = &app.theme;
    let settings = &app.settings;

    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Length(1), // config file path
        Constraint::Min(5),    // content
        Constraint::Length(1), // status
    ])
    .split(area);

    let mut header_spans = vec![
        Span::styled(" pdftxt ", theme.header_style()),
        Span::styled(
            " > Settings",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ];
    if settings.dirty {
        header_spans.push(Span::styled(
            "  (unsaved)",
            Style::default().fg(theme.fallback),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(header_spans)), chunks[0]);

    let path_text = pdftxt_core::config_file::config_path()
        .map(|p| format!("  Config: {}", p.display()))
        .unwrap_or_else(|| "  Config: (no config directory)".to_string());
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            path_text,
            Style::default().fg(theme.dim),
        ))),
        chunks[1],
    );

    let mut lines: Vec<Line> = vec![Line::from("")];
    for (i, item) in SettingsItem::ALL.iter().enumerate() {
        let selected = settings.cursor == i;
        let cursor = if selected { "> " } else { "  " };
        let editing = selected && settings.editing;
        let (value, value_style) = if editing {
            (
                format!("{}\u{2588}", settings.edit_buffer),
                Style::default().fg(theme.active),
            )
        } else {
            value_for(*item, settings, theme)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}{:<20}", cursor, item.label()),
                Style::default().fg(theme.text),
            ),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Methods:",
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )));
    for method in Method::ALL {
        let (mark, style) = if settings.is_available(method) {
            ("\u{2713}", Style::default().fg(theme.done))
        } else {
            ("\u{2717}", Style::default().fg(theme.dim))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("    {} {:<8}", mark, method.label()), style),
            Span::styled(method.description(), Style::default().fg(theme.dim)),
        ]));
    }

    let content = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(content, chunks[2]);

    if let Some(msg) = &app.status_message {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", msg),
                Style::default().fg(theme.dim),
            ))),
            chunks[3],
        );
    }

    let footer_text = if settings.editing {
        " Type value, Enter:confirm, Esc:cancel".to_string()
    } else {
        let hint = match settings.current_item() {
            SettingsItem::Language => "Enter:edit  Space:next preset  x:reset",
            SettingsItem::OutputDir => "Enter:edit  x:next to each PDF",
            _ => "Space/Enter:change",
        };
        let active_note = if app.processing {
            "  \u{26A0} changes apply to next batch"
        } else {
            ""
        };
        format!(
            " j/k:navigate  {}  Ctrl+S:save  Esc:back{}",
            hint, active_note
        )
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(footer_text, theme.footer_style()))),
        footer_area,
    );
}

fn value_for(item: SettingsItem, settings: &SettingsState, theme: &Theme) -> (String, Style) {
    let dim = Style::default().fg(theme.dim);
    let opts = &settings.options;
    match item {
        SettingsItem::Method => {
            if settings.is_available(opts.method) {
                (opts.method.label().to_string(), dim)
            } else {
                (
                    format!("{} (unavailable)", opts.method.label()),
                    Style::default().fg(theme.failed),
                )
            }
        }
        SettingsItem::Fallback => (on_off(opts.fallback), dim),
        SettingsItem::Language => (SettingsState::language_label(&opts.ocr.language), dim),
        SettingsItem::Quality => (opts.ocr.quality.label().to_string(), dim),
        SettingsItem::OutputDir => {
            if settings.output_dir.trim().is_empty() {
                ("(next to each PDF)".to_string(), dim)
            } else {
                (settings.output_dir.clone(), dim)
            }
        }
        SettingsItem::FailureReport => (on_off(opts.write_failure_report), dim),
        SettingsItem::Theme => (settings.theme_name.clone(), dim),
    }
}

fn on_off(value: bool) -> String {
    if value { "[\u{2713}] on" } else { "[ ] off" }.to_string()
}
