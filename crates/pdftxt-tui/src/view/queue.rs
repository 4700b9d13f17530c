use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::App;
use crate::model::queue::{FilePhase, FileState};
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

/// Render the Queue screen into the given area.
/// `footer_area` is a full-width row below the main content.
pub fn render_in(f: &mut Frame, app: &App, area: Rect, footer_area: Rect) {
    let theme = &app.theme;

    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Length(1), // progress bar
        Constraint::Length(1), // status line
        Constraint::Min(5),    // table
        Constraint::Length(3), // detail of the file under the cursor
    ])
    .split(area);

    render_header(f, chunks[0], app, theme);
    render_progress_bar(f, chunks[1], app, theme);
    render_status(f, chunks[2], app, theme);
    render_table(f, chunks[3], app);
    render_detail(f, chunks[4], app, theme);
    render_footer(f, footer_area, app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let settings = &app.settings;
    let mut method = settings.options.method.label().to_string();
    if settings.options.fallback {
        method.push_str(" + fallback");
    }
    let output = settings
        .output_dir_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "next to each PDF".to_string());

    let header = Line::from(vec![
        Span::styled(" pdftxt ", theme.header_style()),
        Span::styled(
            " > Queue",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{}]  output: {}", method, output),
            Style::default().fg(theme.dim),
        ),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn render_progress_bar(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let total = app.files.len();
    let done = app.files.iter().filter(|p| p.phase.is_terminal()).count();
    let ratio = if total > 0 {
        done as f64 / total as f64
    } else {
        0.0
    };

    // ██████░░░░ 12/50 0:30
    let elapsed = app.elapsed();
    let elapsed_str = format!("{}:{:02}", elapsed.as_secs() / 60, elapsed.as_secs() % 60);
    let count_str = format!(" {}/{} ", done, total);
    let non_bar = 1 + count_str.len() + elapsed_str.len();
    let bar_width = (area.width as usize).saturating_sub(non_bar);
    let filled = (ratio * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(empty);

    let spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(bar, Style::default().fg(theme.active)),
        Span::styled(count_str, Style::default().fg(theme.text)),
        Span::styled(elapsed_str, Style::default().fg(theme.dim)),
    ];
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let (prefix, style) = if app.processing {
        (
            format!(" {} ", spinner_char(app.tick)),
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        )
    } else {
        let color = match &app.last_outcome {
            Some(o) if o.cancelled || o.succeeded < o.total => theme.fallback,
            Some(_) => theme.done,
            None => theme.text,
        };
        (" ".to_string(), Style::default().fg(color))
    };
    let line = Line::from(Span::styled(format!("{}{}", prefix, app.status_line()), style));
    f.render_widget(Paragraph::new(line), area);
}

fn method_text(file: &FileState) -> String {
    match (file.method, &file.phase) {
        (Some(m), FilePhase::Done) if file.fell_back => format!("{} (fallback)", m.label()),
        (Some(m), FilePhase::Done | FilePhase::Converting) => m.label().to_string(),
        _ => "\u{2014}".to_string(),
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let wide = area.width >= 80;

    let header_cells = if wide {
        vec!["#", "File", "Status", "Method", "Chars"]
    } else {
        vec!["#", "File", "Status"]
    };
    let header = Row::new(header_cells.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
    }))
    .height(1);

    let rows: Vec<Row> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let name = truncate(&file.filename, (area.width as usize).saturating_sub(40));
            let phase_style = Style::default().fg(theme.phase_color(&file.phase));
            let status_text = match file.phase {
                FilePhase::Converting => {
                    format!("{} {}", spinner_char(app.tick), file.phase.label())
                }
                _ => file.phase.label().to_string(),
            };

            if wide {
                let method_style = if file.fell_back {
                    Style::default().fg(theme.fallback)
                } else {
                    Style::default().fg(theme.dim)
                };
                let chars = if file.phase == FilePhase::Done {
                    file.chars.to_string()
                } else {
                    "\u{2014}".to_string()
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(name),
                    Cell::from(status_text).style(phase_style),
                    Cell::from(method_text(file)).style(method_style),
                    Cell::from(chars).style(Style::default().fg(theme.dim)),
                ])
            } else {
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(name),
                    Cell::from(status_text).style(phase_style),
                ])
            }
        })
        .collect();

    let widths = if wide {
        vec![
            Constraint::Length(4),  // #
            Constraint::Min(15),    // File
            Constraint::Length(16), // Status
            Constraint::Length(20), // Method
            Constraint::Length(9),  // Chars
        ]
    } else {
        vec![
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(16),
        ]
    };

    let table = Table::new(rows, &widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(format!(" Files ({}) ", app.files.len())),
        )
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default();
    if !app.files.is_empty() {
        state.select(Some(app.queue_cursor));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_detail(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let lines = match app.files.get(app.queue_cursor) {
        Some(file) => {
            let mut lines = vec![Line::from(Span::styled(
                format!(" {}", file.path.display()),
                Style::default().fg(theme.text),
            ))];
            if let Some(error) = &file.error {
                lines.push(Line::from(Span::styled(
                    format!(" {}", error),
                    Style::default().fg(theme.failed),
                )));
            } else if let Some(output) = &file.output {
                lines.push(Line::from(Span::styled(
                    format!(" -> {}", output.display()),
                    Style::default().fg(theme.dim),
                )));
            }
            lines
        }
        None => Vec::new(),
    };
    let detail = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(theme.border_style()),
    );
    f.render_widget(detail, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans: Vec<Span> = Vec::new();

    if app.processing {
        spans.push(Span::styled(
            " [c] Cancel ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.failed)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            " j/k:navigate  ,:settings  ?:help  q:quit",
            theme.footer_style(),
        ));
    } else if !app.files.is_empty() {
        spans.push(Span::styled(
            " [r] Start ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.active)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            " o:add  x:clear  ,:settings  Ctrl+S:save  ?:help  q:quit",
            theme.footer_style(),
        ));
    } else {
        spans.push(Span::styled(
            " o:add files  ,:settings  ?:help  q:quit",
            theme.footer_style(),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
