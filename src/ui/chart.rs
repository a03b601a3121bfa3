use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType};

use crate::sampling::SamplingBuffer;

/// One line chart over a sampling buffer.
pub struct ChartView<'a> {
    pub title: &'a str,
    pub y_label: &'a str,
    pub unit: &'a str,
    pub y_max: f64,
    pub color: Color,
    pub buffer: &'a SamplingBuffer,
}

pub fn render(frame: &mut Frame, area: Rect, view: &ChartView<'_>) {
    let points = view.buffer.points();
    let [x_min, x_max] = view.buffer.index_bounds();
    let y_max = if view.y_max > 0.0 { view.y_max } else { 1.0 };

    let title = match view.buffer.latest() {
        Some(value) => format!(" {} {value:.1}{} ", view.title, view.unit),
        None => format!(" {} ", view.title),
    };

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(view.color))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(view.color)
                        .add_modifier(Modifier::BOLD),
                )),
        )
        .x_axis(
            Axis::default()
                .title("Sample")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(vec![format!("{x_min:.0}"), format!("{x_max:.0}")]),
        )
        .y_axis(
            Axis::default()
                .title(view.y_label)
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![
                    "0".to_string(),
                    format!("{:.0}", y_max / 2.0),
                    format!("{y_max:.0}"),
                ]),
        );

    frame.render_widget(chart, area);
}
