pub mod chart;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::sampling::{ChartStream, LiveCharts};
use crate::ui::chart::ChartView;

/// Draws the CPU chart above the memory chart, with a key hint below.
pub fn draw(frame: &mut Frame, charts: &LiveCharts) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
            Constraint::Length(1),
        ])
        .split(frame.area());

    chart::render(
        frame,
        chunks[0],
        &ChartView {
            title: "CPU",
            y_label: "CPU Utilization (%)",
            unit: "%",
            y_max: 100.0,
            color: Color::Cyan,
            buffer: charts.stream(ChartStream::Cpu),
        },
    );
    chart::render(
        frame,
        chunks[1],
        &ChartView {
            title: "Memory",
            y_label: "Memory (GB)",
            unit: " GB",
            y_max: charts.memory_total_gb,
            color: Color::Magenta,
            buffer: charts.stream(ChartStream::Memory),
        },
    );

    let hint = Line::from(" q / Esc / Ctrl+C: back to menu");
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}
