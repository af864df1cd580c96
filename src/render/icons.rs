use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IconColor {
    Black,
    Red,
    #[default]
    Yellow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    /// Biohazard
    Bio,
    /// Poison
    #[default]
    Poi,
    /// Radiation
    Rad,
    /// Shock
    Shk,
}

/// Marker pasted onto a floor plan at the client's position (20x20 px assets).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThreatIcon {
    #[serde(default)]
    pub color: IconColor,
    #[serde(default)]
    pub kind: IconKind,
}

impl ThreatIcon {
    pub fn file_name(&self) -> String {
        let kind = match self.kind {
            IconKind::Bio => "bio",
            IconKind::Poi => "poi",
            IconKind::Rad => "rad",
            IconKind::Shk => "shk",
        };
        let color = match self.color {
            IconColor::Black => "Black",
            IconColor::Red => "Red",
            IconColor::Yellow => "Yellow",
        };
        format!("{}{}.jpg", kind, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_file_names() {
        assert_eq!(ThreatIcon::default().file_name(), "poiYellow.jpg");
        let icon = ThreatIcon {
            color: IconColor::Black,
            kind: IconKind::Shk,
        };
        assert_eq!(icon.file_name(), "shkBlack.jpg");
    }
}
