/// Display-only risk banding. The pass/fail decision is always per-step;
/// the score exists for the audit UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

/// Overall risk score in `[0, 100]`, derived from the fraud sub-scores.
/// Higher is safer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiskScore {
    pub ip_reputation: u8,
    pub behavior: u8,
}

impl Default for RiskScore {
    fn default() -> Self {
        // No fraud signal observed: neutral.
        Self {
            ip_reputation: 100,
            behavior: 100,
        }
    }
}

impl RiskScore {
    pub fn new(ip_reputation: u8, behavior: u8) -> Self {
        Self {
            ip_reputation: ip_reputation.min(100),
            behavior: behavior.min(100),
        }
    }

    #[must_use]
    pub fn overall(&self) -> u8 {
        ((u16::from(self.ip_reputation) + u16::from(self.behavior)) / 2) as u8
    }

    #[must_use]
    pub fn band(&self) -> RiskBand {
        match self.overall() {
            80..=100 => RiskBand::Low,
            60..=79 => RiskBand::Medium,
            _ => RiskBand::High,
        }
    }
}
