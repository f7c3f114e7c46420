use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::element::{Element, LayoutConstraint};
use crate::tui::theme::Theme;

/// Walks an element tree and paints it onto the frame.
pub struct Renderer;

impl Renderer {
    pub fn render<Msg>(frame: &mut Frame, theme: &Theme, element: &Element<Msg>, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        match element {
            Element::None => {}

            Element::Text { content, style } => {
                let style = style.unwrap_or_else(|| Style::default().fg(theme.text));
                let paragraph = Paragraph::new(content.as_str()).style(style);
                frame.render_widget(paragraph, area);
            }

            Element::StyledText { line, background } => {
                let mut paragraph = Paragraph::new(line.clone());
                if let Some(bg) = background {
                    paragraph = paragraph.style(*bg);
                }
                frame.render_widget(paragraph, area);
            }

            Element::Column { items, spacing } => {
                Self::render_stacked(frame, theme, items, *spacing, area, Direction::Vertical);
            }

            Element::Row { items, spacing } => {
                Self::render_stacked(frame, theme, items, *spacing, area, Direction::Horizontal);
            }

            Element::Container { child, padding } => {
                let inner = Self::pad(area, *padding);
                Self::render(frame, theme, child, inner);
            }

            Element::Panel { child, title } => {
                let mut block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.overlay0));
                if let Some(title) = title {
                    block = block.title(
                        ratatui::text::Span::styled(
                            title.clone(),
                            Style::default().fg(theme.lavender),
                        ),
                    );
                }
                let inner = block.inner(area);
                frame.render_widget(block, area);
                Self::render(frame, theme, child, inner);
            }

            Element::_Phantom(never, _) => match *never {},
        }
    }

    /// Split the area per the constraints (interleaving gaps when spacing is
    /// nonzero) and recurse into each child.
    fn render_stacked<Msg>(
        frame: &mut Frame,
        theme: &Theme,
        items: &[(LayoutConstraint, Element<Msg>)],
        spacing: u16,
        area: Rect,
        direction: Direction,
    ) {
        if items.is_empty() {
            return;
        }

        let mut constraints = Vec::with_capacity(items.len() * 2);
        for (i, (constraint, _)) in items.iter().enumerate() {
            if spacing > 0 && i > 0 {
                constraints.push(Constraint::Length(spacing));
            }
            constraints.push(Self::to_constraint(*constraint));
        }

        let chunks = Layout::default()
            .direction(direction)
            .constraints(constraints)
            .split(area);

        for (i, (_, child)) in items.iter().enumerate() {
            let chunk_index = if spacing > 0 { i * 2 } else { i };
            if let Some(chunk) = chunks.get(chunk_index) {
                Self::render(frame, theme, child, *chunk);
            }
        }
    }

    fn to_constraint(constraint: LayoutConstraint) -> Constraint {
        match constraint {
            LayoutConstraint::Length(n) => Constraint::Length(n),
            LayoutConstraint::Min(n) => Constraint::Min(n),
            LayoutConstraint::Fill(weight) => Constraint::Fill(weight),
        }
    }

    fn pad(area: Rect, padding: u16) -> Rect {
        let double = padding.saturating_mul(2);
        Rect {
            x: area.x.saturating_add(padding),
            y: area.y.saturating_add(padding),
            width: area.width.saturating_sub(double),
            height: area.height.saturating_sub(double),
        }
    }
}
