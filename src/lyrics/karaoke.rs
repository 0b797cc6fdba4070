use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use super::LyricsDocument;
use crate::colors::{Theme, ThemeStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRole {
    Sung,
    Active,
    Upcoming,
}

impl LineRole {
    pub fn of(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            std::cmp::Ordering::Less => LineRole::Sung,
            std::cmp::Ordering::Equal => LineRole::Active,
            std::cmp::Ordering::Greater => LineRole::Upcoming,
        }
    }

    pub fn style(self, theme: &Theme) -> Style {
        match self {
            LineRole::Active => {
                let style = Style::default()
                    .fg(theme.colors.primary.to_terminal())
                    .add_modifier(Modifier::BOLD);
                // neon themes glow on the active line
                if theme.style == ThemeStyle::Neon {
                    style.add_modifier(Modifier::UNDERLINED)
                } else {
                    style
                }
            }
            LineRole::Sung => Style::default()
                .fg(theme.colors.secondary.to_terminal())
                .add_modifier(Modifier::DIM),
            LineRole::Upcoming => Style::default().fg(Color::White).add_modifier(Modifier::DIM),
        }
    }
}

/// Karaoke panel: heading, a window of lines around the active one, and
/// lyric progress.
pub struct KaraokeView<'a> {
    document: Option<&'a LyricsDocument>,
    current: usize,
    theme: &'a Theme,
    loading: bool,
}

impl<'a> KaraokeView<'a> {
    pub fn new(document: Option<&'a LyricsDocument>, current: usize, theme: &'a Theme) -> Self {
        Self {
            document,
            current,
            theme,
            loading: false,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Fraction of lines reached, `(current + 1) / N`.
    pub fn progress(&self) -> f64 {
        match self.document {
            Some(doc) if !doc.is_empty() => {
                ((self.current + 1) as f64 / doc.line_count() as f64).min(1.0)
            }
            _ => 0.0,
        }
    }

    /// First line to show so the active line stays inside `rows`.
    fn first_visible(&self, rows: usize, total: usize) -> usize {
        if rows == 0 || total <= rows {
            return 0;
        }
        let above = rows / 3;
        self.current.saturating_sub(above).min(total - rows)
    }
}

impl Widget for KaraokeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = self
            .document
            .and_then(|doc| doc.heading())
            .unwrap_or_else(|| "Karaoke Mode".to_string());
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        if self.loading {
            Paragraph::new("Detecting Lyrics...")
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let Some(doc) = self.document.filter(|doc| !doc.is_empty()) else {
            Paragraph::new(vec![
                Line::from("No lyrics found for this song."),
                Line::from("Please select a song with lyrics or upload one.").dim(),
            ])
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        };

        let lyric_rows = inner.height.saturating_sub(1) as usize;
        let first = self.first_visible(lyric_rows, doc.line_count());
        let lines: Vec<Line> = doc
            .lines()
            .iter()
            .enumerate()
            .skip(first)
            .take(lyric_rows)
            .map(|(index, text)| {
                let role = LineRole::of(index, self.current);
                Line::from(Span::styled(text.as_str(), role.style(self.theme)))
            })
            .collect();
        let lyrics_area = Rect {
            height: lyric_rows as u16,
            ..inner
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(lyrics_area, buf);

        let gauge_area = Rect {
            y: inner.y + inner.height - 1,
            height: 1,
            ..inner
        };
        Gauge::default()
            .gauge_style(Style::default().fg(self.theme.colors.primary.to_terminal()))
            .ratio(self.progress())
            .label("")
            .render(gauge_area, buf);
    }
}
