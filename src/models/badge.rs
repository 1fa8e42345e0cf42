//! Achievement badges shown next to an agent.

use serde::{Deserialize, Serialize};

/// Kind of badge. The tag strings are a stable contract with the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeKind {
    Power,
    OnFire,
    Hot,
    Destroyer,
    Rocket,
    Crown,
    Revenue,
}

impl BadgeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            BadgeKind::Power => "power",
            BadgeKind::OnFire => "on-fire",
            BadgeKind::Hot => "hot",
            BadgeKind::Destroyer => "destroyer",
            BadgeKind::Rocket => "rocket",
            BadgeKind::Crown => "crown",
            BadgeKind::Revenue => "revenue",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BadgeKind::Power => "⚡",
            BadgeKind::OnFire => "🔥",
            BadgeKind::Hot => "🌶️",
            BadgeKind::Destroyer => "💀",
            BadgeKind::Rocket => "🚀",
            BadgeKind::Crown => "👑",
            BadgeKind::Revenue => "💰",
        }
    }
}

impl std::fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A badge awarded for the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub tag: String,
    pub icon: String,
    pub tooltip: String,
}

impl Badge {
    pub fn new(kind: BadgeKind, tooltip: impl Into<String>) -> Self {
        Self {
            kind,
            tag: kind.tag().to_string(),
            icon: kind.icon().to_string(),
            tooltip: tooltip.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_carries_tag_and_icon() {
        let badge = Badge::new(BadgeKind::OnFire, "ON FIRE – 5+ sales");
        assert_eq!(badge.tag, "on-fire");
        assert_eq!(badge.icon, "🔥");
        assert_eq!(badge.tooltip, "ON FIRE – 5+ sales");
    }

    #[test]
    fn test_badge_kind_serialization_matches_tag() {
        for kind in [
            BadgeKind::Power,
            BadgeKind::OnFire,
            BadgeKind::Hot,
            BadgeKind::Destroyer,
            BadgeKind::Rocket,
            BadgeKind::Crown,
            BadgeKind::Revenue,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.tag()));
        }
    }
}
