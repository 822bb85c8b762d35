use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingSma {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl RollingSma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        self.buf.push_back(value);
        self.sum += value;
        while self.buf.len() > self.window {
            if let Some(front) = self.buf.pop_front() {
                self.sum -= front;
            }
        }

        if self.buf.len() == self.window {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }
}

/// Running product of `1 + r` from the first bar on. The first call is the base
/// bar and never carries a return; after that, one absent factor leaves every
/// later value absent.
#[derive(Debug, Clone)]
pub struct CumulativeReturn {
    growth: f64,
    seen_base: bool,
    broken: bool,
}

impl Default for CumulativeReturn {
    fn default() -> Self {
        Self {
            growth: 1.0,
            seen_base: false,
            broken: false,
        }
    }
}

impl CumulativeReturn {
    pub fn update(&mut self, daily_return: Option<f64>) -> Option<f64> {
        if !self.seen_base {
            self.seen_base = true;
            return None;
        }
        if self.broken {
            return None;
        }
        let Some(ret) = daily_return else {
            self.broken = true;
            return None;
        };
        self.growth *= 1.0 + ret;
        Some(self.growth - 1.0).filter(|value| value.is_finite())
    }
}
