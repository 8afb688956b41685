/// Badge color for a to-do label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColor {
    Green,
    Navy,
    Purple,
    HotPink,
    Red,
    Black,
}

impl LabelColor {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Navy => "navy",
            Self::Purple => "purple",
            Self::HotPink => "hotpink",
            Self::Red => "red",
            Self::Black => "black",
        }
    }

    /// 256-color terminal code, for the terminal front-end.
    pub fn ansi(&self) -> u8 {
        match self {
            Self::Green => 28,
            Self::Navy => 18,
            Self::Purple => 91,
            Self::HotPink => 205,
            Self::Red => 160,
            Self::Black => 16,
        }
    }
}

/// Map a label to its color. Case-insensitive; unknown labels are black.
pub fn label_color(label: &str) -> LabelColor {
    match label.trim().to_lowercase().as_str() {
        "home" => LabelColor::Green,
        "personal" => LabelColor::Navy,
        "work" => LabelColor::Purple,
        "social" => LabelColor::HotPink,
        "emergency" => LabelColor::Red,
        "loading" | "loading…" | "loading..." => LabelColor::Black,
        _ => LabelColor::Black,
    }
}
