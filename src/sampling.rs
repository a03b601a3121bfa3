use std::collections::VecDeque;
use std::time::Duration;

use crate::system::SystemProbe;

pub const DEFAULT_WINDOW: usize = 20;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub index: u64,
    pub value: f64,
}

/// Fixed-capacity sliding window over one metric stream. Each buffer owns
/// its own tick counter, so indices are monotonic per stream and never
/// shared between charts.
#[derive(Clone, Debug)]
pub struct SamplingBuffer {
    series: VecDeque<SamplePoint>,
    capacity: usize,
    next_index: u64,
}

impl SamplingBuffer {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sampling buffer capacity must be positive");
        Self {
            series: VecDeque::with_capacity(capacity),
            capacity,
            next_index: 0,
        }
    }

    pub fn append(&mut self, value: f64) {
        if self.series.len() == self.capacity {
            self.series.pop_front();
        }
        self.series.push_back(SamplePoint {
            index: self.next_index,
            value,
        });
        self.next_index += 1;
    }

    pub fn snapshot(&self) -> Vec<SamplePoint> {
        self.series.iter().copied().collect()
    }

    /// `(index, value)` pairs in the shape chart datasets take.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.series
            .iter()
            .map(|p| (p.index as f64, p.value))
            .collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.series.back().map(|p| p.value)
    }

    /// Index range the window currently spans, padded to full capacity so
    /// the x-axis does not jump while the buffer is filling.
    pub fn index_bounds(&self) -> [f64; 2] {
        let first = self.series.front().map(|p| p.index).unwrap_or(0);
        [first as f64, (first + self.capacity as u64 - 1) as f64]
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SamplingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartStream {
    Cpu,
    Memory,
}

/// The two live charts: CPU utilisation in percent and memory used in GiB.
#[derive(Clone, Debug)]
pub struct LiveCharts {
    pub cpu: SamplingBuffer,
    pub memory: SamplingBuffer,
    pub memory_total_gb: f64,
}

impl LiveCharts {
    pub fn new(window: usize) -> Self {
        Self {
            cpu: SamplingBuffer::new(window),
            memory: SamplingBuffer::new(window),
            memory_total_gb: 0.0,
        }
    }

    pub fn stream(&self, stream: ChartStream) -> &SamplingBuffer {
        match stream {
            ChartStream::Cpu => &self.cpu,
            ChartStream::Memory => &self.memory,
        }
    }

    /// One tick: wait out a CPU measurement window, then append one sample to
    /// each stream so both charts advance at the same cadence.
    pub async fn tick<P: SystemProbe>(&mut self, probe: &mut P, window: Duration) {
        probe.mark_cpu_window();
        if !window.is_zero() {
            tokio::time::sleep(window).await;
        }
        let cpu = probe.global_cpu_percent();
        let memory = probe.host_memory();

        self.memory_total_gb = memory.total as f64 / GIB;
        self.cpu.append(f64::from(cpu));
        self.memory.append(memory.used as f64 / GIB);
    }
}

impl Default for LiveCharts {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_of_twenty_keeps_last_twenty() {
        let mut buffer = SamplingBuffer::new(20);
        for v in 0..30 {
            buffer.append(v as f64);
        }
        let values: Vec<f64> = buffer.snapshot().iter().map(|p| p.value).collect();
        let expected: Vec<f64> = (10..30).map(|v| v as f64).collect();
        assert_eq!(values, expected);
        assert_eq!(buffer.snapshot()[0].index, 10);
        assert_eq!(buffer.snapshot()[19].index, 29);
    }

    #[test]
    fn partial_window_is_not_padded() {
        let mut buffer = SamplingBuffer::new(5);
        buffer.append(1.5);
        buffer.append(2.5);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.latest(), Some(2.5));
        assert_eq!(buffer.points(), vec![(0.0, 1.5), (1.0, 2.5)]);
        assert_eq!(buffer.index_bounds(), [0.0, 4.0]);
    }

    #[test]
    fn streams_count_independently() {
        let mut charts = LiveCharts::new(3);
        charts.cpu.append(1.0);
        charts.cpu.append(2.0);
        charts.memory.append(9.0);
        assert_eq!(charts.stream(ChartStream::Cpu).snapshot()[1].index, 1);
        assert_eq!(charts.stream(ChartStream::Memory).snapshot()[0].index, 0);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_is_rejected() {
        let _ = SamplingBuffer::new(0);
    }

    proptest! {
        #[test]
        fn snapshot_holds_last_values_in_order(
            capacity in 1usize..40,
            values in proptest::collection::vec(-1000.0f64..1000.0, 0..120),
        ) {
            let mut buffer = SamplingBuffer::new(capacity);
            for &v in &values {
                buffer.append(v);
            }
            let snap = buffer.snapshot();
            prop_assert_eq!(snap.len(), values.len().min(capacity));

            let start = values.len().saturating_sub(capacity);
            let kept: Vec<f64> = snap.iter().map(|p| p.value).collect();
            prop_assert_eq!(kept, values[start..].to_vec());

            for pair in snap.windows(2) {
                prop_assert_eq!(pair[1].index, pair[0].index + 1);
            }
        }
    }
}
