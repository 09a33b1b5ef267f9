use super::*;

const LABEL_WIDTH: usize = 26;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(4),
            Constraint::Length(2),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    match app.scene() {
        Scene::Launcher => draw_launcher(frame, app, chunks[1]),
        Scene::CreateForm => draw_create_form(frame, app, chunks[1]),
        Scene::EditForm => draw_edit_form(frame, app, chunks[1]),
        Scene::EditTable => draw_placeholder(frame, chunks[1]),
        Scene::ConfirmDestroy => draw_confirm_destroy(frame, app, chunks[1]),
    }
    draw_tooltip(frame, app, chunks[2]);

    let hints = if app.is_quit_pending() {
        "working... quitting when done"
    } else if app.is_busy() {
        "working... [q] Quit when done"
    } else {
        app.scene().handler().hints()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::Gray)))
            .block(Block::default().borders(Borders::TOP)),
        chunks[3],
    );
}

fn flag(label: &str, ok: bool) -> Span<'static> {
    let color = if ok { Color::Green } else { Color::Red };
    Span::styled(format!(" {} ", label), Style::default().fg(Color::Black).bg(color))
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "Infrastructure Catalog",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(app.scene().title(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        flag("AWS", app.env.aws_ok),
        Span::raw(" "),
        flag("Vault", app.env.vault_ok),
        Span::raw(" "),
    ];
    match &app.git {
        GitIndicator::Known(status) => {
            let color = if status.dirty { Color::Yellow } else { Color::Green };
            let mark = if status.dirty { "*" } else { "" };
            spans.push(Span::styled(
                format!(" git:{}{} ", status.branch, mark),
                Style::default().fg(Color::Black).bg(color),
            ));
        }
        GitIndicator::Error => spans.push(flag("git:?", false)),
        GitIndicator::Unknown => {}
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_launcher(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let rows: Vec<Row> = app
        .deployments
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.name.clone()),
                Cell::from(d.description.clone()),
                Cell::from(Span::styled(d.state.as_str(), state_style(d.state))),
                Cell::from(d.last_action.clone()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(38),
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Length(17),
        ],
    )
    .header(
        Row::new(vec!["Name", "Description", "State", "Last Action"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
    .block(Block::default().borders(Borders::ALL).title("Deployments"));

    let mut state = TableState::default();
    if !app.deployments.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(table, cols[0], &mut state);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(info) = app.selected_deployment() {
        lines.push(Line::from(Span::styled(
            info.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("modified {}", info.last_modified)));
        lines.push(Line::from(""));
    }
    for (label, value) in &app.details {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(value.clone()),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from("(no deployments)"));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Details")),
        cols[1],
    );
}

fn state_style(state: crate::model::LifecycleState) -> Style {
    use crate::model::LifecycleState;
    let color = match state {
        LifecycleState::Deployed => Color::Green,
        LifecycleState::Ready | LifecycleState::Initialized => Color::Yellow,
        LifecycleState::Destroyed => Color::Red,
        LifecycleState::Unknown => Color::Gray,
    };
    Style::default().fg(color)
}

/// Renders one field per line and places the terminal cursor on the
/// focused text field.
fn draw_form(
    frame: &mut ratatui::Frame,
    app: &App,
    form: &Form,
    preamble: Vec<Line<'static>>,
    title: String,
    area: Rect,
) {
    let mut lines = preamble;
    let first_field_row = lines.len();
    for (idx, field) in form.fields.iter().enumerate() {
        let label = app.catalog.label(&field.key);
        let focused = idx == form.focus;
        let style = if focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let marker = if focused { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<width$}", marker, label, width = LABEL_WIDTH), style),
            Span::raw(" "),
            Span::raw(field.input.buf.clone()),
        ]));
    }

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if let Some(field) = form.focused() {
        let x = inner.x as usize + 2 + LABEL_WIDTH + 1 + field.input.cursor_col();
        let y = inner.y as usize + first_field_row + form.focus;
        if x < (inner.x + inner.width) as usize && y < (inner.y + inner.height) as usize {
            frame.set_cursor_position(Position::new(x as u16, y as u16));
        }
    }
}

fn draw_create_form(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let preset = app
        .active_preset()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "(none)".to_string());
    let mut top = vec![
        Span::styled(format!("[Preset: {}]", preset), Style::default().fg(Color::Cyan)),
        Span::styled(" (F2/F3 to switch)", Style::default().fg(Color::Gray)),
    ];
    if app.is_fetching() {
        top.push(Span::styled(
            "  fetching templates...",
            Style::default().fg(Color::Yellow),
        ));
    }
    let preamble = vec![Line::from(top), Line::from("")];
    draw_form(
        frame,
        app,
        &app.create,
        preamble,
        Scene::CreateForm.title().to_string(),
        area,
    );
}

fn draw_edit_form(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = format!("Edit {}", app.edit_target());
    draw_form(frame, app, &app.edit, Vec::new(), title, area);
}

fn draw_confirm_destroy(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let name = app
        .pending_destroy()
        .map(|d| d.name.clone())
        .unwrap_or_default();
    let bucket = &app.settings().s3_bucket;
    let lines = vec![
        Line::from(Span::styled(
            format!("Destroy '{}'?", name),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("This will:"),
        Line::from("  1) run terraform destroy"),
        Line::from(format!("  2) delete remote state under s3://{}/{}/", bucket, name)),
        Line::from(format!("  3) remove the {} directory", name)),
        Line::from(""),
        Line::from("Continue?"),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(Scene::ConfirmDestroy.title()),
        ),
        area,
    );
}

fn draw_placeholder(frame: &mut ratatui::Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new("Not available yet.")
            .block(Block::default().borders(Borders::ALL).title(Scene::EditTable.title())),
        area,
    );
}

fn draw_tooltip(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    let focused = match app.scene() {
        Scene::CreateForm => app.create.focused_key(),
        Scene::EditForm => app.edit.focused_key(),
        _ => None,
    };
    if let Some(key) = focused {
        let help = app.catalog.help(key);
        if !help.is_empty() {
            lines.push(Line::from(Span::styled(
                help.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
    }
    if let Some(status) = app.status() {
        let style = match status.kind {
            StatusKind::Info => Style::default().fg(Color::White),
            StatusKind::Error => Style::default().fg(Color::Red),
        };
        lines.push(Line::from(Span::styled(status.text.clone(), style)));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP)),
        area,
    );
}
