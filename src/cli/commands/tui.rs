//! Interactive property browser

use anyhow::Result;
use clap::Args;
use crossterm::{
    event::{self, Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use is_terminal::IsTerminal;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Instant;

use crate::api::{EntityDetails, ResourceKind};
use crate::cli::ui::with_spinner;
use crate::config::Config;
use crate::notify::ToastQueue;
use crate::tui::apps::custom_properties::{
    configure_launch, CustomPropertiesApp, ExtensionUpdateHandler, LaunchParams, UpdateFuture,
};
use crate::tui::{Runtime, Theme, ThemeVariant};

#[derive(Args)]
pub struct TuiCommands {
    /// Entity type (e.g., "table", "dashboard")
    pub entity_type: String,
    /// Fully qualified entity name
    pub fqn: String,
    /// Disable the update capability regardless of granted permissions
    #[arg(long)]
    pub read_only: bool,
}

pub async fn tui_command(args: TuiCommands) -> Result<()> {
    if !io::stdout().is_terminal() {
        anyhow::bail!("The property browser requires an interactive terminal");
    }

    let config = Config::load()?;
    let theme = Theme::new(ThemeVariant::from_name(&config.get_settings().theme));
    let (catalog_name, client) = super::current_client(&config)?;

    // The browser itself re-checks the type permission; this preflight only
    // decides the externally granted view/edit flags it starts with.
    let permission = with_spinner("Checking permissions...", async {
        client
            .resource_permission(ResourceKind::Type, &args.entity_type)
            .await
    })
    .await?;

    let toasts = ToastQueue::new();
    let has_edit_access = permission.edit_all && !args.read_only;

    let update_client = client.clone();
    let update_type = args.entity_type.clone();
    let update_toasts = toasts.clone();
    let on_update: ExtensionUpdateHandler = Arc::new(move |entity: EntityDetails| -> UpdateFuture {
        let client = update_client.clone();
        let entity_type = update_type.clone();
        let toasts = update_toasts.clone();
        Box::pin(async move {
            match client.update_extension(&entity_type, &entity).await {
                Ok(updated) => Ok(updated),
                Err(e) => {
                    use crate::notify::Notifier;
                    toasts.error(format!("Update failed: {}", e));
                    Err(e.to_string())
                }
            }
        })
    });

    configure_launch(LaunchParams {
        entity_type: args.entity_type.clone(),
        fqn: args.fqn.clone(),
        catalog_name,
        has_view_access: permission.can_view(),
        has_edit_access,
        provider: Arc::new(client),
        notifier: Arc::new(toasts.clone()),
        on_update: Some(on_update),
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runtime: Runtime<CustomPropertiesApp> = Runtime::new(theme.clone());

    // Run the TUI loop
    let result = run_tui(&mut terminal, &mut runtime, &theme, &toasts).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    runtime: &mut Runtime<CustomPropertiesApp>,
    theme: &Theme,
    toasts: &ToastQueue,
) -> Result<()> {
    // Event deduplication state to prevent double-registration on Windows
    let mut last_key_event: Option<(KeyEvent, Instant)> = None;
    const DEDUP_WINDOW_MS: u128 = 10;

    loop {
        let frame_start = std::time::Instant::now();

        // Process all pending events first for minimal input latency
        let mut should_quit = false;
        while event::poll(std::time::Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Deduplicate only non-character keys; deduping chars breaks paste
                if !matches!(key.code, crossterm::event::KeyCode::Char(_)) {
                    if let Some((last_key, last_time)) = last_key_event {
                        let elapsed = frame_start.duration_since(last_time).as_millis();
                        if elapsed < DEDUP_WINDOW_MS
                            && last_key.code == key.code
                            && last_key.modifiers == key.modifiers
                        {
                            log::debug!(
                                "Skipping duplicate key event: {:?} ({}ms since last)",
                                key.code,
                                elapsed
                            );
                            continue;
                        }
                    }
                }
                last_key_event = Some((key, frame_start));

                if key.code == crossterm::event::KeyCode::Char('c')
                    && key
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::CONTROL)
                {
                    should_quit = true;
                    break;
                }

                if !runtime.handle_key(key)? {
                    should_quit = true;
                    break;
                }
            }
        }

        if should_quit {
            break;
        }

        runtime.poll_timers()?;
        runtime.poll_async().await?;

        // Topics are delivered inside the runtime; the shell just records them
        for (topic, _) in runtime.take_publishes() {
            log::debug!("Event published on '{}'", topic);
        }

        terminal.draw(|frame| {
            let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
                .split(frame.area());
            runtime.render(frame, chunks[0]);
            frame.render_widget(status_bar(runtime, theme, toasts), chunks[1]);
        })?;

        // Sleep for remainder of 16ms frame (60 FPS)
        let elapsed = frame_start.elapsed();
        if let Some(remaining) = std::time::Duration::from_millis(16).checked_sub(elapsed) {
            tokio::time::sleep(remaining).await;
        }
    }

    Ok(())
}

fn status_bar(
    runtime: &Runtime<CustomPropertiesApp>,
    theme: &Theme,
    toasts: &ToastQueue,
) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        format!(" {} ", runtime.title()),
        Style::default()
            .fg(theme.lavender)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(status) = runtime.status_line() {
        spans.push(Span::raw(" "));
        spans.extend(status.spans);
    }

    if let Some(toast) = toasts.latest() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(toast, theme.error_style()));
    }

    spans.push(Span::raw("  "));
    for (key, description) in runtime.key_bindings() {
        spans.push(Span::styled(
            format!(" {} ", key_label(key)),
            Style::default().fg(theme.sky),
        ));
        spans.push(Span::styled(
            description,
            Style::default().fg(theme.overlay1),
        ));
    }

    Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.mantle))
}

fn key_label(key: crossterm::event::KeyCode) -> String {
    use crossterm::event::KeyCode;
    match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Enter => "enter".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}
