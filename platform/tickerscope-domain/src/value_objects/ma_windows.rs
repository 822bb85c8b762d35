use serde::Serialize;

/// Short/long moving-average window lengths. No ordering is enforced between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MaWindows {
    short: usize,
    long: usize,
}

impl MaWindows {
    pub fn new(short: usize, long: usize) -> Result<Self, String> {
        if short == 0 || long == 0 {
            return Err(format!(
                "moving-average windows must be >= 1 (short={short}, long={long})"
            ));
        }
        Ok(Self { short, long })
    }

    pub fn short(&self) -> usize {
        self.short
    }

    pub fn long(&self) -> usize {
        self.long
    }

    pub fn short_label(&self) -> String {
        format!("ma_{}", self.short)
    }

    pub fn long_label(&self) -> String {
        format!("ma_{}", self.long)
    }
}
