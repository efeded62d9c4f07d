//! Interactive TUI for browsing stored analyses

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io;

use crate::models::{ComplexityRating, DifficultyRating, StoredAnalysis};

pub struct App {
    analyses: Vec<StoredAnalysis>,
    list_state: ListState,
    /// Detail pane takes the whole screen and scrolls
    show_detail: bool,
    scroll: u16,
}

impl App {
    pub fn new(analyses: Vec<StoredAnalysis>) -> Self {
        let mut list_state = ListState::default();
        if !analyses.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            analyses,
            list_state,
            show_detail: false,
            scroll: 0,
        }
    }

    fn next(&mut self) {
        if self.analyses.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.analyses.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.scroll = 0;
    }

    fn previous(&mut self) {
        if self.analyses.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) => self.analyses.len() - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.list_state.select(Some(i));
        self.scroll = 0;
    }

    fn selected_analysis(&self) -> Option<&StoredAnalysis> {
        self.list_state.selected().and_then(|i| self.analyses.get(i))
    }
}

pub fn run(analyses: Vec<StoredAnalysis>) -> Result<()> {
    if analyses.is_empty() {
        println!("No stored analyses. Run `eudalens analyze <FILE>` first.");
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(analyses);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc if !app.show_detail => return Ok(()),
                KeyCode::Esc | KeyCode::Char('q') => {
                    app.show_detail = false;
                    app.scroll = 0;
                }
                KeyCode::Enter => app.show_detail = !app.show_detail,
                KeyCode::Down | KeyCode::Char('j') => {
                    if app.show_detail {
                        app.scroll = app.scroll.saturating_add(1);
                    } else {
                        app.next();
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if app.show_detail {
                        app.scroll = app.scroll.saturating_sub(1);
                    } else {
                        app.previous();
                    }
                }
                KeyCode::PageDown => {
                    if app.show_detail {
                        app.scroll = app.scroll.saturating_add(10);
                    } else {
                        for _ in 0..10 {
                            app.next();
                        }
                    }
                }
                KeyCode::PageUp => {
                    if app.show_detail {
                        app.scroll = app.scroll.saturating_sub(10);
                    } else {
                        for _ in 0..10 {
                            app.previous();
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let selected = app.list_state.selected().unwrap_or(0) + 1;
    let header = Paragraph::new(format!(
        " eudalens | {} analyses | {}/{}",
        app.analyses.len(),
        selected,
        app.analyses.len()
    ))
    .style(Style::default().fg(Color::Cyan).bold())
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if app.show_detail {
        if let Some(analysis) = app.selected_analysis() {
            render_detail(f, chunks[1], analysis, app.scroll);
        }
    } else {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        render_list(f, main_chunks[0], app);
        if let Some(analysis) = app.selected_analysis() {
            render_detail(f, main_chunks[1], analysis, 0);
        }
    }

    let help = if app.show_detail {
        " j/k:Scroll  Enter/Esc:Back  "
    } else {
        " j/k:Navigate  Enter:Expand  q:Quit"
    };
    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, chunks[2]);
}

fn complexity_color(rating: ComplexityRating) -> Color {
    match rating {
        ComplexityRating::Simple => Color::Green,
        ComplexityRating::Basic => Color::Green,
        ComplexityRating::Moderate => Color::Blue,
        ComplexityRating::Complex => Color::Yellow,
        ComplexityRating::VeryComplex => Color::Red,
    }
}

fn difficulty_color(rating: DifficultyRating) -> Color {
    match rating {
        DifficultyRating::Easy => Color::Green,
        DifficultyRating::Moderate => Color::Blue,
        DifficultyRating::Difficult => Color::Yellow,
        DifficultyRating::VeryDifficult => Color::Red,
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .analyses
        .iter()
        .map(|a| {
            let complexity = &a.report.complexity;
            let line = Line::from(vec![
                Span::styled(format!("{:>4} ", a.id), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("[{:>3.0}] ", complexity.score),
                    Style::default().fg(complexity_color(complexity.rating)).bold(),
                ),
                Span::raw(&a.file_name),
                Span::styled(
                    format!("  {}", a.created_at.format("%Y-%m-%d")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Analyses "))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().bold()))
}

fn detail_lines(analysis: &StoredAnalysis) -> Vec<Line<'_>> {
    let report = &analysis.report;
    let snap = &report.snapshot;

    let mut text = vec![
        Line::from(vec![
            Span::styled("File: ", Style::default().bold()),
            Span::raw(&analysis.file_name),
        ]),
        Line::from(vec![
            Span::styled("Analyzed: ", Style::default().bold()),
            Span::raw(analysis.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ]),
        Line::from(vec![
            Span::styled("Complexity: ", Style::default().bold()),
            Span::styled(
                format!("{:.1} ({})", report.complexity.score, report.complexity.rating),
                Style::default().fg(complexity_color(report.complexity.rating)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Difficulty: ", Style::default().bold()),
            Span::styled(
                format!("{:.1} ({})", report.difficulty.score, report.difficulty.rating),
                Style::default().fg(difficulty_color(report.difficulty.rating)),
            ),
        ]),
        Line::from(format!(
            "{} sheets, {} formulas, {} VBA modules, {} connections",
            snap.sheet_count(),
            snap.formula_count(),
            snap.vba_module_count(),
            snap.connection_count()
        )),
        Line::from(""),
    ];

    if !report.difficulty.reasons.is_empty() {
        text.push(heading("Why:"));
        for reason in &report.difficulty.reasons {
            text.push(Line::from(format!("  - {}", reason)));
        }
        text.push(Line::from(""));
    }

    if !report.data_sources.is_empty() {
        text.push(heading("Data sources:"));
        for source in &report.data_sources {
            text.push(Line::from(format!("  - {}", source)));
        }
        text.push(Line::from(""));
    }

    if !report.data_model.entities.is_empty() {
        text.push(heading("Entities:"));
        for entity in &report.data_model.entities {
            text.push(Line::from(format!("  - {} (from {})", entity.name, entity.source)));
        }
        for rel in &report.data_model.relationships {
            text.push(Line::from(Span::styled(
                format!("    {} -> {} ({})", rel.from, rel.to, rel.kind),
                Style::default().fg(Color::DarkGray),
            )));
        }
        text.push(Line::from(""));
    }

    text.push(heading("Summary:"));
    match analysis.summary() {
        Some(summary) => {
            for line in summary.lines() {
                text.push(Line::from(format!("  {}", line)));
            }
        }
        None => text.push(Line::from(Span::styled(
            "  (none, run `eudalens summarize <ID>`)",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    text
}

fn render_detail(f: &mut Frame, area: Rect, analysis: &StoredAnalysis, scroll: u16) {
    let paragraph = Paragraph::new(detail_lines(analysis))
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;
    use chrono::Utc;

    fn stored(id: u64) -> StoredAnalysis {
        let report = test_report();
        StoredAnalysis {
            id,
            file_name: report.file_name(),
            created_at: Utc::now(),
            report,
        }
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = App::new(vec![stored(3), stored(2), stored(1)]);
        assert_eq!(app.selected_analysis().map(|a| a.id), Some(3));
        app.previous();
        assert_eq!(app.selected_analysis().map(|a| a.id), Some(1));
        app.next();
        assert_eq!(app.selected_analysis().map(|a| a.id), Some(3));
    }

    #[test]
    fn test_empty_app_has_no_selection() {
        let mut app = App::new(Vec::new());
        app.next();
        assert!(app.selected_analysis().is_none());
    }

    #[test]
    fn test_detail_lines_include_sources_and_summary() {
        let analysis = stored(1);
        let rendered: Vec<String> = detail_lines(&analysis)
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(rendered.iter().any(|l| l.contains("Data sources:")));
        assert!(rendered.iter().any(|l| l.contains("hr-sql")));
        assert!(rendered.iter().any(|l| l == "Summary:"));
    }
}
