//! Evolution tiers unlocked by cumulative score. Purely visual.

/// Visual features a tier unlocks for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierCapabilities {
    pub scale_pattern: bool,
    pub trail_effect: bool,
    pub energy_aura: bool,
    pub golden_effect: bool,
    pub rainbow_effect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Basic,
    Skilled,
    Expert,
    Master,
    Legendary,
}

impl Tier {
    /// Ascending by minimum score
    pub const ALL: [Tier; 5] = [
        Tier::Basic,
        Tier::Skilled,
        Tier::Expert,
        Tier::Master,
        Tier::Legendary,
    ];

    pub fn min_score(&self) -> u32 {
        match self {
            Tier::Basic => 0,
            Tier::Skilled => 100,
            Tier::Expert => 250,
            Tier::Master => 500,
            Tier::Legendary => 1000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Basic => "Basic Snake",
            Tier::Skilled => "Skilled Snake",
            Tier::Expert => "Expert Snake",
            Tier::Master => "Master Snake",
            Tier::Legendary => "Legendary Snake",
        }
    }

    /// Body and accent colours as RGB
    pub fn palette(&self) -> [(u8, u8, u8); 2] {
        match self {
            Tier::Basic => [(0x66, 0xbb, 0x6a), (0x43, 0xa0, 0x47)],
            Tier::Skilled => [(0x42, 0xa5, 0xf5), (0x19, 0x76, 0xd2)],
            Tier::Expert => [(0xab, 0x47, 0xbc), (0x7b, 0x1f, 0xa2)],
            Tier::Master => [(0xff, 0xd7, 0x00), (0xff, 0xa5, 0x00)],
            Tier::Legendary => [(0xff, 0x40, 0x81), (0xc5, 0x11, 0x62)],
        }
    }

    /// Each tier keeps everything the previous one had
    pub fn capabilities(&self) -> TierCapabilities {
        let rank = *self as u8;
        TierCapabilities {
            scale_pattern: true,
            trail_effect: rank >= Tier::Skilled as u8,
            energy_aura: rank >= Tier::Expert as u8,
            golden_effect: rank >= Tier::Master as u8,
            rainbow_effect: rank >= Tier::Legendary as u8,
        }
    }

    /// Highest tier whose minimum score is reached
    pub fn for_score(score: u32) -> Tier {
        Tier::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| score >= tier.min_score())
            .unwrap_or(Tier::Basic)
    }
}

/// Maps score to tier, or pins everything to `Basic` when disabled.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionTracker {
    enabled: bool,
}

impl ProgressionTracker {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn tier_for(&self, score: u32) -> Tier {
        if self.enabled {
            Tier::for_score(score)
        } else {
            Tier::Basic
        }
    }

    /// The new tier if `score` moves away from `current`
    pub fn evaluate(&self, current: Tier, score: u32) -> Option<Tier> {
        let next = self.tier_for(score);
        (next != current).then_some(next)
    }
}
