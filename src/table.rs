use unicode_width::UnicodeWidthStr;

use crate::format::{format_bytes, truncate_unicode};
use crate::system::{ConnectionRecord, DiskUsage, ProcessSnapshot};

const MAX_CELL_WIDTH: usize = 48;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Headers plus rows of already-formatted cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = vec![Align::Left; headers.len()];
        Self {
            headers,
            align,
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.align.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Missing cells render empty; extra cells are dropped.
    pub fn push_row(&mut self, row: Vec<String>) {
        let mut row = row;
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let headers: Vec<String> = self
            .headers
            .iter()
            .map(|h| truncate_unicode(h, MAX_CELL_WIDTH))
            .collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| truncate_unicode(c, MAX_CELL_WIDTH))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }

        let mut lines = Vec::with_capacity(rows.len() + 4);
        lines.push(self.rule(&widths, '┌', '┬', '┐'));
        lines.push(self.line(&headers, &widths));
        lines.push(self.rule(&widths, '├', '┼', '┤'));
        for row in &rows {
            lines.push(self.line(row, &widths));
        }
        lines.push(self.rule(&widths, '└', '┴', '┘'));
        lines.join("\n")
    }

    fn rule(&self, widths: &[usize], left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        let sep = mid.to_string();
        format!("{left}{}{right}", segments.join(sep.as_str()))
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, &w), align)| {
                let fill = " ".repeat(w.saturating_sub(cell.width()));
                match align {
                    Align::Left => format!(" {cell}{fill} "),
                    Align::Right => format!(" {fill}{cell} "),
                }
            })
            .collect();
        format!("│{}│", padded.join("│"))
    }
}

pub fn process_table(processes: &[ProcessSnapshot]) -> Table {
    let mut table = Table::new(["PID", "NAME", "MEMORY USAGE", "STATUS"])
        .align(0, Align::Right)
        .align(2, Align::Right);
    for p in processes {
        table.push_row(vec![
            p.pid.to_string(),
            p.name.clone(),
            format_bytes(p.memory_bytes),
            p.status.to_string(),
        ]);
    }
    table
}

pub fn status_table(processes: &[ProcessSnapshot]) -> Table {
    let mut table = Table::new(["PID", "NAME", "STATUS"]).align(0, Align::Right);
    for p in processes {
        table.push_row(vec![p.pid.to_string(), p.name.clone(), p.status.to_string()]);
    }
    table
}

pub fn memory_table(processes: &[ProcessSnapshot]) -> Table {
    let mut table = Table::new(["PID", "NAME", "MEMORY USAGE"])
        .align(0, Align::Right)
        .align(2, Align::Right);
    for p in processes {
        table.push_row(vec![
            p.pid.to_string(),
            p.name.clone(),
            format_bytes(p.memory_bytes),
        ]);
    }
    table
}

pub fn cpu_table(processes: &[ProcessSnapshot]) -> Table {
    let mut table = Table::new(["PID", "NAME", "CPU_PERCENT(%)"])
        .align(0, Align::Right)
        .align(2, Align::Right);
    for p in processes {
        table.push_row(vec![
            p.pid.to_string(),
            p.name.clone(),
            format!("{:.1}", p.cpu_percent),
        ]);
    }
    table
}

pub fn search_table(processes: &[ProcessSnapshot]) -> Table {
    let mut table = Table::new(["PID", "NAME", "USER", "STATUS"]).align(0, Align::Right);
    for p in processes {
        table.push_row(vec![
            p.pid.to_string(),
            p.name.clone(),
            p.owner.clone(),
            p.status.to_string(),
        ]);
    }
    table
}

pub fn disk_table(disks: &[DiskUsage]) -> Table {
    let mut table = Table::new(["Device", "Total Space", "Used", "Free"])
        .align(1, Align::Right)
        .align(2, Align::Right)
        .align(3, Align::Right);
    for d in disks {
        table.push_row(vec![
            d.device.clone(),
            format_bytes(d.total),
            format_bytes(d.used),
            format_bytes(d.free),
        ]);
    }
    table
}

pub fn connection_table(connections: &[ConnectionRecord]) -> Table {
    let mut table = Table::new([
        "PID",
        "NAME",
        "STATUS",
        "PROTOCOL",
        "LOCAL ADDRESS",
        "REMOTE ADDRESS",
    ])
    .align(0, Align::Right);
    for c in connections {
        table.push_row(vec![
            c.pid.to_string(),
            c.process_name.clone(),
            c.status.to_string(),
            c.protocol.label().to_string(),
            c.local_address.to_string(),
            c.remote_address
                .map(|a| a.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ]);
    }
    table
}
