//! Typed projector settings
//!
//! The device uses different codes to *select* a setting and to *report* it
//! (picture mode "Photo" is selected with 16 but reported as 14), so each
//! setting carries its select code and one or more report tables.

use serde::{Deserialize, Serialize};

use crate::decode::{CodeKey, CodeLabel, CodeTable};

/// Input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// HDMI 1
    Hdmi1,
    /// USB-A (Flash Drive)
    UsbA,
    /// SD Card
    SdCard,
    /// Android Home (USB-A/SD Card)
    AndroidHome,
}

impl InputSource {
    /// Every variant, in menu order
    pub const ALL: &'static [InputSource] = &[
        InputSource::Hdmi1,
        InputSource::UsbA,
        InputSource::SdCard,
        InputSource::AndroidHome,
    ];

    /// Reported by the source query. USB-A and SD card media both show up
    /// as the Android home source.
    pub const QUERY_TABLE: CodeTable<InputSource> = CodeTable::new(
        &[("7", InputSource::Hdmi1), ("20", InputSource::AndroidHome)],
        CodeKey::Whole,
    );

    /// Two-digit form used inside the system information record
    pub const SYSTEM_INFO_TABLE: CodeTable<InputSource> = CodeTable::new(
        &[("07", InputSource::Hdmi1), ("20", InputSource::AndroidHome)],
        CodeKey::Whole,
    );

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            InputSource::Hdmi1 => 1,
            InputSource::UsbA => 17,
            InputSource::SdCard => 31,
            InputSource::AndroidHome => 24,
        }
    }
}

impl CodeLabel for InputSource {
    fn label(&self) -> &'static str {
        match self {
            InputSource::Hdmi1 => "HDMI 1",
            InputSource::UsbA => "USB-A (Flash Drive)",
            InputSource::SdCard => "SD Card",
            InputSource::AndroidHome => "Android Home (USB-A/SD Card)",
        }
    }
}

/// Picture (display) mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PictureMode {
    /// Presentation (PC)
    Presentation,
    /// Bright
    Bright,
    /// Cinema
    Cinema,
    /// sRGB
    Srgb,
    /// Photo (Vivid)
    Photo,
    /// Eco
    Eco,
    /// 3D
    #[serde(rename = "3d")]
    ThreeD,
    /// Game
    Game,
    /// HDR
    Hdr,
    /// HLG
    Hlg,
    /// AI-PQ
    AiPq,
    /// WCG
    Wcg,
}

impl PictureMode {
    /// Every variant, in menu order
    pub const ALL: &'static [PictureMode] = &[
        PictureMode::Presentation,
        PictureMode::Bright,
        PictureMode::Cinema,
        PictureMode::Srgb,
        PictureMode::Photo,
        PictureMode::Eco,
        PictureMode::ThreeD,
        PictureMode::Game,
        PictureMode::Hdr,
        PictureMode::Hlg,
        PictureMode::AiPq,
        PictureMode::Wcg,
    ];

    /// Codes reported by the query
    pub const QUERY_TABLE: CodeTable<PictureMode> = CodeTable::new(
        &[
            ("1", PictureMode::Presentation),
            ("2", PictureMode::Bright),
            ("3", PictureMode::Cinema),
            ("4", PictureMode::Srgb),
            ("9", PictureMode::ThreeD),
            ("12", PictureMode::Game),
            ("14", PictureMode::Photo),
            ("21", PictureMode::Hdr),
            ("25", PictureMode::Hlg),
            ("41", PictureMode::AiPq),
            ("42", PictureMode::Wcg),
            ("43", PictureMode::Eco),
        ],
        CodeKey::Whole,
    );

    /// Two-digit codes inside the system information record
    pub const SYSTEM_INFO_TABLE: CodeTable<PictureMode> = CodeTable::new(
        &[
            ("01", PictureMode::Presentation),
            ("02", PictureMode::Bright),
            ("03", PictureMode::Cinema),
            ("04", PictureMode::Srgb),
            ("14", PictureMode::Photo),
            ("28", PictureMode::Eco),
        ],
        CodeKey::Whole,
    );

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            PictureMode::Presentation => 1,
            PictureMode::Bright => 2,
            PictureMode::Cinema => 3,
            PictureMode::Srgb => 4,
            PictureMode::Photo => 16,
            PictureMode::Eco => 44,
            PictureMode::ThreeD => 9,
            PictureMode::Game => 12,
            PictureMode::Hdr => 21,
            PictureMode::Hlg => 25,
            PictureMode::AiPq => 41,
            PictureMode::Wcg => 42,
        }
    }
}

impl CodeLabel for PictureMode {
    fn label(&self) -> &'static str {
        match self {
            PictureMode::Presentation => "Presentation (PC)",
            PictureMode::Bright => "Bright",
            PictureMode::Cinema => "Cinema",
            PictureMode::Srgb => "sRGB",
            PictureMode::Photo => "Photo (Vivid)",
            PictureMode::Eco => "Eco",
            PictureMode::ThreeD => "3D",
            PictureMode::Game => "Game",
            PictureMode::Hdr => "HDR",
            PictureMode::Hlg => "HLG",
            PictureMode::AiPq => "AI-PQ",
            PictureMode::Wcg => "WCG",
        }
    }
}

/// Projection orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Front-Desktop
    FrontDesktop,
    /// Rear-Desktop
    RearDesktop,
    /// Front-Ceiling
    FrontCeiling,
    /// Rear-Ceiling
    RearCeiling,
}

impl ProjectionMode {
    /// Every variant, in menu order
    pub const ALL: &'static [ProjectionMode] = &[
        ProjectionMode::FrontDesktop,
        ProjectionMode::RearDesktop,
        ProjectionMode::FrontCeiling,
        ProjectionMode::RearCeiling,
    ];

    /// Codes reported by the query
    pub const QUERY_TABLE: CodeTable<ProjectionMode> = CodeTable::new(
        &[
            ("0", ProjectionMode::FrontDesktop),
            ("1", ProjectionMode::RearDesktop),
            ("2", ProjectionMode::FrontCeiling),
            ("3", ProjectionMode::RearCeiling),
        ],
        CodeKey::FirstChar,
    );

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            ProjectionMode::FrontDesktop => 1,
            ProjectionMode::RearDesktop => 2,
            ProjectionMode::FrontCeiling => 3,
            ProjectionMode::RearCeiling => 4,
        }
    }
}

impl CodeLabel for ProjectionMode {
    fn label(&self) -> &'static str {
        match self {
            ProjectionMode::FrontDesktop => "Front-Desktop",
            ProjectionMode::RearDesktop => "Rear-Desktop",
            ProjectionMode::FrontCeiling => "Front-Ceiling",
            ProjectionMode::RearCeiling => "Rear-Ceiling",
        }
    }
}

/// Color temperature preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTemperature {
    /// Standard (D75)
    Standard,
    /// Cold (D83)
    Cold,
    /// Warm (D65)
    Warm,
}

impl ColorTemperature {
    /// Every variant, in menu order
    pub const ALL: &'static [ColorTemperature] = &[
        ColorTemperature::Standard,
        ColorTemperature::Cold,
        ColorTemperature::Warm,
    ];

    /// Codes reported by the query
    pub const QUERY_TABLE: CodeTable<ColorTemperature> = CodeTable::new(
        &[
            ("2", ColorTemperature::Standard),
            ("3", ColorTemperature::Warm),
            ("5", ColorTemperature::Cold),
        ],
        CodeKey::FirstChar,
    );

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            ColorTemperature::Standard => 1,
            ColorTemperature::Cold => 3,
            ColorTemperature::Warm => 4,
        }
    }
}

impl CodeLabel for ColorTemperature {
    fn label(&self) -> &'static str {
        match self {
            ColorTemperature::Standard => "Standard (D75)",
            ColorTemperature::Cold => "Cold (D83)",
            ColorTemperature::Warm => "Warm (D65)",
        }
    }
}

/// Aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 4:3
    #[serde(rename = "4:3")]
    FourThree,
    /// 16:9
    #[serde(rename = "16:9")]
    SixteenNine,
    /// 16:10
    #[serde(rename = "16:10")]
    SixteenTen,
    /// Auto
    Auto,
}

impl AspectRatio {
    /// Every variant, in menu order
    pub const ALL: &'static [AspectRatio] = &[
        AspectRatio::FourThree,
        AspectRatio::SixteenNine,
        AspectRatio::SixteenTen,
        AspectRatio::Auto,
    ];

    /// Codes reported by the query
    pub const QUERY_TABLE: CodeTable<AspectRatio> = CodeTable::new(
        &[
            ("1", AspectRatio::FourThree),
            ("2", AspectRatio::SixteenNine),
            ("3", AspectRatio::SixteenTen),
            ("7", AspectRatio::Auto),
        ],
        CodeKey::Whole,
    );

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            AspectRatio::FourThree => 1,
            AspectRatio::SixteenNine => 2,
            AspectRatio::SixteenTen => 3,
            AspectRatio::Auto => 7,
        }
    }
}

impl CodeLabel for AspectRatio {
    fn label(&self) -> &'static str {
        match self {
            AspectRatio::FourThree => "4:3",
            AspectRatio::SixteenNine => "16:9",
            AspectRatio::SixteenTen => "16:10",
            AspectRatio::Auto => "Auto",
        }
    }
}

/// Digital zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitalZoom {
    /// 50%
    #[serde(rename = "50%")]
    Percent50,
    /// 75%
    #[serde(rename = "75%")]
    Percent75,
    /// 100%
    #[serde(rename = "100%")]
    Percent100,
    /// 125%
    #[serde(rename = "125%")]
    Percent125,
    /// 150%
    #[serde(rename = "150%")]
    Percent150,
    /// 175%
    #[serde(rename = "175%")]
    Percent175,
    /// 200%
    #[serde(rename = "200%")]
    Percent200,
}

impl DigitalZoom {
    /// Levels in select-code order: level `n` is `ALL[n]`
    pub const ALL: &'static [DigitalZoom] = &[
        DigitalZoom::Percent50,
        DigitalZoom::Percent75,
        DigitalZoom::Percent100,
        DigitalZoom::Percent125,
        DigitalZoom::Percent150,
        DigitalZoom::Percent175,
        DigitalZoom::Percent200,
    ];

    /// Codes reported by the query
    pub const QUERY_TABLE: CodeTable<DigitalZoom> = CodeTable::new(
        &[
            ("0", DigitalZoom::Percent50),
            ("1", DigitalZoom::Percent75),
            ("2", DigitalZoom::Percent100),
            ("3", DigitalZoom::Percent125),
            ("4", DigitalZoom::Percent150),
            ("5", DigitalZoom::Percent175),
            ("6", DigitalZoom::Percent200),
        ],
        CodeKey::FirstChar,
    );

    /// Level 0-6 as sent on the wire
    pub fn level(&self) -> u16 {
        match self {
            DigitalZoom::Percent50 => 0,
            DigitalZoom::Percent75 => 1,
            DigitalZoom::Percent100 => 2,
            DigitalZoom::Percent125 => 3,
            DigitalZoom::Percent150 => 4,
            DigitalZoom::Percent175 => 5,
            DigitalZoom::Percent200 => 6,
        }
    }

    /// Inverse of [`DigitalZoom::level`]
    pub fn from_level(level: u16) -> Option<Self> {
        Self::ALL.get(level as usize).copied()
    }
}

impl CodeLabel for DigitalZoom {
    fn label(&self) -> &'static str {
        match self {
            DigitalZoom::Percent50 => "50%",
            DigitalZoom::Percent75 => "75%",
            DigitalZoom::Percent100 => "100%",
            DigitalZoom::Percent125 => "125%",
            DigitalZoom::Percent150 => "150%",
            DigitalZoom::Percent175 => "175%",
            DigitalZoom::Percent200 => "200%",
        }
    }
}

/// OSD language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English
    English,
    /// German
    German,
    /// French
    French,
    /// Italian
    Italian,
    /// Spanish
    Spanish,
    /// Portuguese
    Portuguese,
    /// Polish
    Polish,
    /// Dutch
    Dutch,
    /// Swedish
    Swedish,
    /// Russian
    Russian,
    /// Arabic
    Arabic,
    /// Turkish
    Turkish,
}

impl Language {
    /// Every variant, in menu order
    pub const ALL: &'static [Language] = &[
        Language::English,
        Language::German,
        Language::French,
        Language::Italian,
        Language::Spanish,
        Language::Portuguese,
        Language::Polish,
        Language::Dutch,
        Language::Swedish,
        Language::Russian,
        Language::Arabic,
        Language::Turkish,
    ];

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            Language::English => 1,
            Language::German => 2,
            Language::French => 3,
            Language::Italian => 4,
            Language::Spanish => 5,
            Language::Portuguese => 6,
            Language::Polish => 7,
            Language::Dutch => 8,
            Language::Swedish => 9,
            Language::Russian => 17,
            Language::Arabic => 20,
            Language::Turkish => 22,
        }
    }
}

impl CodeLabel for Language {
    fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "German",
            Language::French => "French",
            Language::Italian => "Italian",
            Language::Spanish => "Spanish",
            Language::Portuguese => "Portuguese",
            Language::Polish => "Polish",
            Language::Dutch => "Dutch",
            Language::Swedish => "Swedish",
            Language::Russian => "Russian",
            Language::Arabic => "Arabic",
            Language::Turkish => "Turkish",
        }
    }
}

/// Remote-control keys for OSD navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsdKey {
    /// Menu
    Menu,
    /// Up
    Up,
    /// Down
    Down,
    /// Left
    Left,
    /// Right
    Right,
    /// Enter
    Enter,
}

impl OsdKey {
    /// Every variant, in menu order
    pub const ALL: &'static [OsdKey] = &[
        OsdKey::Menu,
        OsdKey::Up,
        OsdKey::Down,
        OsdKey::Left,
        OsdKey::Right,
        OsdKey::Enter,
    ];

    /// Sub-code that selects this setting
    pub fn select_code(&self) -> u16 {
        match self {
            OsdKey::Menu => 20,
            OsdKey::Up => 10,
            OsdKey::Down => 14,
            OsdKey::Left => 11,
            OsdKey::Right => 13,
            OsdKey::Enter => 12,
        }
    }
}

impl CodeLabel for OsdKey {
    fn label(&self) -> &'static str {
        match self {
            OsdKey::Menu => "Menu",
            OsdKey::Up => "Up",
            OsdKey::Down => "Down",
            OsdKey::Left => "Left",
            OsdKey::Right => "Right",
            OsdKey::Enter => "Enter",
        }
    }
}
