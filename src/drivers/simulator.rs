use std::io;
use std::thread;
use std::time::{Duration, Instant};
use rand::Rng;
use crate::drivers::Transport;
/// Synthetic device producing `num_channels` phase-shifted sine waves as
/// comma-separated text lines, so the whole pipeline runs without hardware.
pub struct SimulatedTransport {
    num_channels: usize,
    line_period: Duration,
    timeout: Duration,
    phase: f64,
    next_line_at: Instant,
    pending: Vec<u8>,
}
impl SimulatedTransport {
    pub fn new(num_channels: usize, lines_per_second: f64, timeout: Duration) -> Self {
        let lines_per_second = if lines_per_second.is_finite() && lines_per_second > 0.0 {
            lines_per_second
        } else {
            250.0
        };
        Self {
            num_channels: num_channels.max(1),
            line_period: Duration::from_secs_f64(1.0 / lines_per_second),
            timeout,
            phase: 0.0,
            next_line_at: Instant::now(),
            pending: Vec::new(),
        }
    }
    fn emit_line(&mut self) {
        let mut rng = rand::thread_rng();
        self.phase += 0.05;
        let fields: Vec<String> = (0..self.num_channels)
            .map(|i| {
                let freq = 1.0 + i as f64 * 0.5;
                let value = (self.phase * freq).sin() + rng.gen_range(-0.05..0.05);
                format!("{value:.4}")
            })
            .collect();
        self.pending.extend_from_slice(fields.join(",").as_bytes());
        self.pending.push(b'\n');
    }
}
impl Transport for SimulatedTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            let now = Instant::now();
            if now < self.next_line_at {
                thread::sleep((self.next_line_at - now).min(self.timeout));
            }
            let now = Instant::now();
            while self.next_line_at <= now {
                self.emit_line();
                self.next_line_at += self.line_period;
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{decode_line, LineFramer};
    #[test]
    fn simulated_lines_decode_to_full_vectors() {
        let mut sim = SimulatedTransport::new(4, 1000.0, Duration::from_millis(20));
        let mut framer = LineFramer::new(1024);
        let mut buf = [0u8; 64];
        let mut decoded = Vec::new();
        while decoded.len() < 5 {
            let n = sim.read_chunk(&mut buf).unwrap();
            for line in framer.push_chunk(&buf[..n]) {
                decoded.push(decode_line(&line).expect("simulated line decodes"));
            }
        }
        assert!(decoded.iter().all(|v| v.len() == 4));
        assert!(decoded.iter().flatten().all(|v| v.abs() <= 1.1));
    }
}
