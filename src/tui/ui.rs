//! UI rendering for the TUI.
//!
//! Every wizard state has its own view. The header, status bar and key hint
//! line are shared, and an open modal is drawn on top of everything.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{AppMode, Focus, WizardState};
use crate::core::{ListEntry, ModalKind, SelectList, TextArea};
use crate::tui::Theme;
use crate::App;

/// Draw the main UI.
pub fn draw(frame: &mut Frame, app: &App) {
    if app.show_help {
        draw_help_screen(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // State view
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match app.state {
        WizardState::SettingCredential => draw_credential(frame, app, chunks[1]),
        WizardState::ChoosingCommit => draw_commit_menu(frame, app, chunks[1]),
        WizardState::ChoosingType => draw_type_list(frame, app, chunks[1]),
        WizardState::ChoosingScope => draw_scope_browser(frame, app, chunks[1]),
        WizardState::WritingMessage => draw_message(frame, app, chunks[1]),
        WizardState::EditingMessage => {
            draw_text_area(frame, &app.theme, chunks[1], &app.edit_input, " Edit AI response ", true);
        }
        WizardState::ReleaseMainMenu => draw_release_menu(frame, app, chunks[1]),
        WizardState::ReleaseChoosingCommits => draw_release_commits(frame, app, chunks[1]),
        WizardState::ReleaseBuildingText => draw_release_building(frame, app, chunks[1]),
        WizardState::Confirming => draw_release_preview(frame, app, chunks[1]),
    }

    draw_status_bar(frame, app, chunks[2]);
    draw_key_hints(frame, app, chunks[3]);

    if app.modal.is_open() {
        draw_modal(frame, app);
    }
}

/// Header with the workspace, the mode and the commit being built.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let workspace = app
        .workspace()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| app.workspace().display().to_string());

    let mut spans = vec![
        Span::styled(format!(" {workspace} "), Style::default().fg(theme.secondary)),
        Span::styled("│ ", Style::default().fg(theme.border)),
        Span::styled(
            app.state.title(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ];

    if app.mode == AppMode::Commit && !app.draft.commit_type.is_empty() {
        spans.push(Span::styled("  ", Style::default()));
        spans.push(Span::styled(
            app.config.format_type(&app.draft.commit_type),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ));
        if !app.draft.scope.is_empty() {
            spans.push(Span::styled(format!(" {}:", app.draft.scope), Style::default().fg(theme.text_dim)));
        }
    }

    let mode = match app.mode {
        AppMode::Commit => " commit ",
        AppMode::Release => " release ",
    };

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(" commitcraft ")
            .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
            .title_bottom(Line::from(mode).right_aligned()),
    );
    frame.render_widget(header, area);
}

fn draw_credential(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let intro = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            " No Groq API key was found.",
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Paste your key below and press Enter. It is stored in the config directory",
            Style::default().fg(theme.text_dim),
        )),
        Line::from(Span::styled(
            " and read back from GROQ_API_KEY on the next start.",
            Style::default().fg(theme.text_dim),
        )),
    ])
    .wrap(Wrap { trim: false });
    frame.render_widget(intro, chunks[0]);

    let masked: String = app.api_key_input.value().chars().map(|_| '•').collect();
    let input = Paragraph::new(Span::styled(masked, Style::default().fg(theme.text))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(" GROQ_API_KEY "),
    );
    frame.render_widget(input, chunks[1]);

    let (_, col) = app.api_key_input.cursor();
    frame.set_cursor_position((chunks[1].x + 1 + col as u16, chunks[1].y + 1));
}

/// Render a filterable list. The highlighted row gets the selection style.
fn draw_list<T, F>(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    list: &SelectList<T>,
    title: &str,
    render: F,
) where
    T: ListEntry,
    F: Fn(&T) -> Line<'static>,
{
    let items: Vec<ListItem> = list.visible().map(|item| ListItem::new(render(item))).collect();

    let count = if list.filter().is_empty() {
        format!(" {} ", list.items().len())
    } else {
        format!(" {}/{} ", list.visible_len(), list.items().len())
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {title} "))
        .title_style(Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD))
        .title_bottom(Line::from(count).right_aligned());

    if list.is_filtering() || !list.filter().is_empty() {
        let cursor = if list.is_filtering() { "│" } else { "" };
        block = block.title_bottom(Line::from(Span::styled(
            format!(" /{}{cursor} ", list.filter()),
            Style::default().fg(theme.accent),
        )));
    }

    if items.is_empty() {
        let empty = Paragraph::new(Span::styled(
            if list.items().is_empty() { " Nothing here yet" } else { " No matches" },
            Style::default().fg(theme.text_muted),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.selected_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(list.selected_position()));
    frame.render_stateful_widget(list_widget, area, &mut state);
}

fn split_list_preview(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn draw_preview(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, lines: Vec<Line>, scroll: u16) {
    let preview = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(format!(" {title} "))
                .title_style(Style::default().fg(theme.text_dim)),
        );
    frame.render_widget(preview, area);
}

fn draw_commit_menu(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = split_list_preview(area);

    let tag_style = Style::default().fg(theme.secondary);
    let dim = Style::default().fg(theme.text_muted);
    draw_list(frame, theme, chunks[0], &app.commits, "Commits", |record| {
        Line::from(vec![
            Span::styled(format!("{:>4} ", record.id), dim),
            Span::styled(format!("{} ", record.commit_type), tag_style),
            Span::raw(record.title()),
        ])
    });

    let lines = match app.commits.selected() {
        Some(record) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    app.config.final_commit_message(&record.commit_type, &record.scope, ""),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(record.description(), dim)),
                Line::from(""),
            ];
            lines.extend(record.message_translated.lines().map(|l| Line::from(l.to_string())));
            lines
        }
        None => vec![Line::from(Span::styled("Press n to write a new commit", dim))],
    };
    draw_preview(frame, theme, chunks[1], "Message", lines, 0);
}

fn draw_type_list(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let dim = Style::default().fg(theme.text_dim);
    draw_list(frame, theme, area, &app.commit_types, "Select a prefix", |commit_type| {
        Line::from(vec![
            Span::styled(
                format!("{:<10}", app.config.format_type(&commit_type.tag)),
                Style::default().fg(theme.tag_color(commit_type)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(commit_type.description.clone(), dim),
        ])
    });
}

fn draw_scope_browser(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let Some(browser) = app.scope.as_ref() else {
        return;
    };

    let title = format!("/{}", browser.relative_pwd().display());
    draw_list(frame, theme, area, &browser.entries, &title, |entry| {
        let marker = match entry.status.as_deref() {
            Some(code) => Span::styled(format!("{code} "), Style::default().fg(theme.git_status_color(code))),
            None => Span::raw("  "),
        };
        let name_style = if entry.is_dir {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        Line::from(vec![marker, Span::styled(entry.title(), name_style)])
    });
}

fn draw_message(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_text_area(
        frame,
        theme,
        chunks[0],
        &app.message_input,
        " Summary of the changes ",
        app.focus == Focus::Message,
    );

    let border = if app.focus == Focus::AiResponse { theme.primary } else { theme.border };
    let body: Vec<Line> = if app.draft.message_translated.is_empty() {
        let hint = match app.status.spinner_glyph() {
            Some(glyph) => format!("{glyph} waiting for the AI ..."),
            None => "Press ctrl+b to build the commit message".to_string(),
        };
        vec![Line::from(Span::styled(hint, Style::default().fg(theme.text_muted)))]
    } else {
        app.draft.message_translated.lines().map(|l| Line::from(l.to_string())).collect()
    };

    let response = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((app.ai_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" AI response ")
                .title_bottom(Line::from(" ctrl+e edit ").right_aligned()),
        );
    frame.render_widget(response, chunks[1]);
}

/// Render a text area and place the cursor when it is focused.
fn draw_text_area(frame: &mut Frame, theme: &Theme, area: Rect, input: &TextArea, title: &str, focused: bool) {
    let inner_height = area.height.saturating_sub(2);
    let (row, col) = input.cursor();
    let scroll = (row as u16).saturating_sub(inner_height.saturating_sub(1));

    let lines: Vec<Line> = input.lines().iter().map(|l| Line::from(l.as_str())).collect();
    let border = if focused { theme.primary } else { theme.border };
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(theme.text))
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
    frame.render_widget(paragraph, area);

    if focused {
        let x = area.x + 1 + (col as u16).min(area.width.saturating_sub(3));
        let y = area.y + 1 + (row as u16).saturating_sub(scroll);
        frame.set_cursor_position((x, y));
    }
}

fn draw_release_menu(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = split_list_preview(area);

    let tag_style = Style::default().fg(theme.secondary);
    draw_list(frame, theme, chunks[0], &app.releases, "Releases", |release| {
        Line::from(vec![
            Span::styled(format!("{:<6} ", release.release_type), tag_style),
            Span::raw(release.title.clone()),
        ])
    });

    let dim = Style::default().fg(theme.text_muted);
    let lines = match app.releases.selected() {
        Some(release) => {
            let mut lines = vec![
                Line::from(Span::styled(release.description(), dim)),
                Line::from(Span::styled(
                    format!("{} commit(s)", release.commit_hashes.len()),
                    dim,
                )),
                Line::from(""),
                Line::from(Span::styled(
                    release.title.clone(),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            lines.extend(release.body.lines().map(|l| Line::from(l.to_string())));
            lines
        }
        None => vec![Line::from(Span::styled("Press n to build a new release", dim))],
    };
    draw_preview(frame, theme, chunks[1], "Release", lines, 0);
}

fn draw_release_commits(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = split_list_preview(area);

    let title = format!("Commits ({} selected)", app.selection.len());
    draw_list(frame, theme, chunks[0], &app.release_commits, &title, |commit| {
        let checked = app.selection.contains(&commit.hash);
        let (mark, style) = if checked {
            ("[x] ", Style::default().fg(theme.success))
        } else {
            ("[ ] ", Style::default().fg(theme.text_muted))
        };
        Line::from(vec![
            Span::styled(mark, style),
            Span::styled(format!("{} ", commit.short_hash()), Style::default().fg(theme.accent)),
            Span::raw(commit.subject.clone()),
        ])
    });

    let dim = Style::default().fg(theme.text_muted);
    let lines = match app.release_commits.selected() {
        Some(commit) => {
            let mut lines = vec![
                Line::from(Span::styled(format!("{} {}", commit.hash, commit.date), dim)),
                Line::from(""),
                Line::from(Span::styled(commit.subject.clone(), Style::default().add_modifier(Modifier::BOLD))),
            ];
            lines.extend(commit.body.lines().map(|l| Line::from(l.to_string())));
            if !commit.diff.is_empty() {
                lines.push(Line::from(""));
                lines.extend(commit.diff.lines().map(|l| Line::from(Span::styled(l.to_string(), dim))));
            }
            lines
        }
        None => Vec::new(),
    };
    let context = format!(
        "{} {}",
        app.release_context.branch,
        if app.release_context.version.is_empty() { "untagged" } else { app.release_context.version.as_str() }
    );
    draw_preview(frame, theme, chunks[1], &context, lines, 0);
}

fn draw_release_building(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let glyph = app.status.spinner_glyph().unwrap_or(" ");

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {glyph} Building the release notes from {} commit(s) ...", app.selection.len()),
            Style::default().fg(theme.warning),
        )),
        Line::from(""),
    ];
    lines.extend(app.selection.ordered().iter().map(|commit| {
        Line::from(vec![
            Span::styled(format!("   {} ", commit.short_hash()), Style::default().fg(theme.accent)),
            Span::styled(commit.subject.clone(), Style::default().fg(theme.text_dim)),
        ])
    }));

    draw_preview(frame, theme, area, "Release", lines, app.preview_scroll);
}

fn draw_release_preview(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let Some(draft) = app.release_draft.as_ref() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            draft.title.clone(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(draft.body.lines().map(|l| Line::from(l.to_string())));

    let title = format!("{} {}", draft.branch, draft.version);
    draw_preview(frame, theme, area, title.trim(), lines, app.preview_scroll);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let color = theme.level_color(app.status.level());

    let mut spans = vec![Span::styled(
        format!(" {} ", app.status.level().label()),
        Style::default().bg(color).fg(theme.background).add_modifier(Modifier::BOLD),
    )];
    if let Some(glyph) = app.status.spinner_glyph() {
        spans.push(Span::styled(format!(" {glyph}"), Style::default().fg(theme.warning)));
    }
    spans.push(Span::styled(format!(" {}", app.status.content()), Style::default().fg(color)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_key_hints(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let hints: &[(&str, &str)] = match app.state {
        WizardState::SettingCredential => &[("enter", "save"), ("esc", "clear"), ("ctrl+c", "quit")],
        WizardState::ChoosingCommit => {
            &[("n", "new"), ("e", "edit"), ("d", "delete"), ("enter", "use"), ("/", "filter"), ("q", "quit")]
        }
        WizardState::ChoosingType => &[("enter", "select"), ("/", "filter"), ("esc", "back")],
        WizardState::ChoosingScope => {
            &[("←", "up"), ("→", "open"), ("enter", "select"), ("/", "filter"), ("esc", "back")]
        }
        WizardState::WritingMessage => &[
            ("ctrl+b", "build"),
            ("ctrl+e", "edit"),
            ("tab", "focus"),
            ("enter", "save"),
            ("esc", "back"),
        ],
        WizardState::EditingMessage => {
            &[("enter", "apply"), ("shift+enter", "newline"), ("ctrl+k", "delete line"), ("esc", "discard")]
        }
        WizardState::ReleaseMainMenu => {
            &[("n", "new"), ("d", "delete"), ("enter", "actions"), ("/", "filter"), ("q", "quit")]
        }
        WizardState::ReleaseChoosingCommits => {
            &[("space", "toggle"), ("enter", "build"), ("/", "filter"), ("esc", "back")]
        }
        WizardState::ReleaseBuildingText => &[("esc", "abandon")],
        WizardState::Confirming => &[("enter", "save"), ("↑/↓", "scroll"), ("esc", "back")],
    };

    let mut spans = Vec::new();
    for (key, description) in hints {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!(" {description} "), Style::default().fg(theme.text_muted)));
    }
    spans.push(Span::styled(" ? help", Style::default().fg(theme.text_muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered rectangle of the given size, clamped to `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn draw_modal(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let Some(request) = app.modal.request() else {
        return;
    };

    match request.kind {
        ModalKind::Confirmation => {
            let popup = centered_rect(60, 7, frame.area());
            frame.render_widget(Clear, popup);

            let body = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(request.message.clone(), Style::default().fg(theme.text))),
                Line::from(""),
                Line::from(vec![
                    Span::styled("enter/y", Style::default().fg(theme.success).add_modifier(Modifier::BOLD)),
                    Span::styled(" confirm   ", Style::default().fg(theme.text_dim)),
                    Span::styled("esc/n", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)),
                    Span::styled(" cancel", Style::default().fg(theme.text_dim)),
                ]),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.warning))
                    .title(format!(" {} ", request.title))
                    .style(Style::default().bg(theme.background)),
            );
            frame.render_widget(body, popup);
        }
        ModalKind::ListChoice => {
            let height = request.choices.len() as u16 + 2;
            let popup = centered_rect(36, height, frame.area());
            frame.render_widget(Clear, popup);

            let selected = app.modal.selected();
            let items: Vec<ListItem> = request
                .choices
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let is_selected = i == selected;
                    let line = Line::from(vec![
                        Span::styled(if is_selected { " > " } else { "   " }, Style::default().fg(theme.accent)),
                        Span::styled(
                            label.clone(),
                            Style::default()
                                .fg(if is_selected { theme.text } else { theme.text_dim })
                                .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() }),
                        ),
                    ]);
                    ListItem::new(line).style(if is_selected {
                        Style::default().bg(theme.selected_bg)
                    } else {
                        Style::default()
                    })
                })
                .collect();

            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.primary))
                    .title(format!(" {} ", request.title))
                    .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(theme.background)),
            );
            frame.render_widget(list, popup);
        }
    }
}

fn draw_help_screen(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(2)])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        " Keyboard Shortcuts ",
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.primary)));
    frame.render_widget(title, chunks[0]);

    let section = |name: &'static str| {
        Line::from(Span::styled(name, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    };

    let lines = vec![
        section("Lists"),
        Line::from(""),
        help_line("↑ / k", "Move selection up", theme),
        help_line("↓ / j", "Move selection down", theme),
        help_line("PageUp/Down", "Move 10 items", theme),
        help_line("/", "Fuzzy filter the list", theme),
        help_line("space", "Toggle a commit (release)", theme),
        help_line("← / →", "Leave or enter a directory (scope)", theme),
        Line::from(""),
        section("Commit messages"),
        Line::from(""),
        help_line("ctrl+b", "Build the message with the AI", theme),
        help_line("ctrl+e", "Edit the AI response", theme),
        help_line("tab", "Switch between summary and response", theme),
        help_line("shift+enter", "New line", theme),
        help_line("ctrl+k", "Delete the current line", theme),
        Line::from(""),
        section("General"),
        Line::from(""),
        help_line("enter", "Confirm", theme),
        help_line("esc", "Go back", theme),
        help_line("q", "Quit from a menu", theme),
        help_line("ctrl+c", "Quit from anywhere", theme),
    ];

    let content = Paragraph::new(lines).block(
        Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(content, chunks[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(theme.text_muted),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[2]);
}

/// Helper to create a help line with key and description.
fn help_line<'a>(key: &'a str, description: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:14}", key), Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD)),
        Span::styled(description, Style::default().fg(theme.text)),
    ])
}
