use super::InvalidThemeIdentifier;
use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every theme the client can render, one light and one dark variant per [`Style`].
#[derive(Debug, Hash, EnumSetType, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeId {
	NeonDay,
	NeonNoir,
	SolarBloom,
	ForestCanopy,
	BrassCopper,
	VictorianNoir,
	MiamiSunrise,
	RetroNight,
	ArtDeco,
	NoirIndustrial,
	LabBright,
	ToxicGlow,
}

#[derive(Debug, Hash, EnumSetType, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
	Cyberpunk,
	Solarpunk,
	Steampunk,
	Vaporwave,
	Dieselpunk,
	Biopunk,
}

#[derive(Debug, Hash, EnumSetType, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	Light,
	Dark,
}

impl Default for ThemeId {
	fn default() -> Self {
		Self::NeonNoir
	}
}

impl ThemeId {
	pub fn all() -> impl Iterator<Item = ThemeId> {
		EnumSet::<ThemeId>::all().into_iter()
	}

	/// The identifier written to storage and to the document root.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::NeonDay => "neon-day",
			Self::NeonNoir => "neon-noir",
			Self::SolarBloom => "solar-bloom",
			Self::ForestCanopy => "forest-canopy",
			Self::BrassCopper => "brass-copper",
			Self::VictorianNoir => "victorian-noir",
			Self::MiamiSunrise => "miami-sunrise",
			Self::RetroNight => "retro-night",
			Self::ArtDeco => "art-deco",
			Self::NoirIndustrial => "noir-industrial",
			Self::LabBright => "lab-bright",
			Self::ToxicGlow => "toxic-glow",
		}
	}

	pub fn style(&self) -> Style {
		match self {
			Self::NeonDay | Self::NeonNoir => Style::Cyberpunk,
			Self::SolarBloom | Self::ForestCanopy => Style::Solarpunk,
			Self::BrassCopper | Self::VictorianNoir => Style::Steampunk,
			Self::MiamiSunrise | Self::RetroNight => Style::Vaporwave,
			Self::ArtDeco | Self::NoirIndustrial => Style::Dieselpunk,
			Self::LabBright | Self::ToxicGlow => Style::Biopunk,
		}
	}

	pub fn mode(&self) -> Mode {
		match self {
			Self::NeonDay
			| Self::SolarBloom
			| Self::BrassCopper
			| Self::MiamiSunrise
			| Self::ArtDeco
			| Self::LabBright => Mode::Light,
			_ => Mode::Dark,
		}
	}

	pub fn from_parts(style: Style, mode: Mode) -> Self {
		match (style, mode) {
			(Style::Cyberpunk, Mode::Light) => Self::NeonDay,
			(Style::Cyberpunk, Mode::Dark) => Self::NeonNoir,
			(Style::Solarpunk, Mode::Light) => Self::SolarBloom,
			(Style::Solarpunk, Mode::Dark) => Self::ForestCanopy,
			(Style::Steampunk, Mode::Light) => Self::BrassCopper,
			(Style::Steampunk, Mode::Dark) => Self::VictorianNoir,
			(Style::Vaporwave, Mode::Light) => Self::MiamiSunrise,
			(Style::Vaporwave, Mode::Dark) => Self::RetroNight,
			(Style::Dieselpunk, Mode::Light) => Self::ArtDeco,
			(Style::Dieselpunk, Mode::Dark) => Self::NoirIndustrial,
			(Style::Biopunk, Mode::Light) => Self::LabBright,
			(Style::Biopunk, Mode::Dark) => Self::ToxicGlow,
		}
	}

	/// e.g. "Solarpunk Light"
	pub fn label(&self) -> String {
		format!("{} {}", self.style().as_display_name(), self.mode().as_display_name())
	}

	/// Parses a stored value. Older builds wrote the identifier JSON-encoded (`"\"neon-day\""`),
	/// so a quoted value is accepted as well.
	pub fn from_stored(value: &str) -> Result<Self, InvalidThemeIdentifier> {
		if let Ok(theme) = value.parse::<Self>() {
			return Ok(theme);
		}
		match serde_json::from_str::<String>(value) {
			Ok(unquoted) => unquoted.parse::<Self>(),
			Err(_) => Err(InvalidThemeIdentifier(value.to_owned())),
		}
	}
}

impl FromStr for ThemeId {
	type Err = InvalidThemeIdentifier;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.find(|theme| theme.as_str() == s)
			.ok_or_else(|| InvalidThemeIdentifier(s.to_owned()))
	}
}

impl std::fmt::Display for ThemeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Style {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Cyberpunk => "cyberpunk",
			Self::Solarpunk => "solarpunk",
			Self::Steampunk => "steampunk",
			Self::Vaporwave => "vaporwave",
			Self::Dieselpunk => "dieselpunk",
			Self::Biopunk => "biopunk",
		}
	}

	pub fn as_display_name(&self) -> &'static str {
		match self {
			Self::Cyberpunk => "Cyberpunk",
			Self::Solarpunk => "Solarpunk",
			Self::Steampunk => "Steampunk",
			Self::Vaporwave => "Vaporwave",
			Self::Dieselpunk => "Dieselpunk",
			Self::Biopunk => "Biopunk",
		}
	}
}

impl Mode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Light => "light",
			Self::Dark => "dark",
		}
	}

	pub fn as_display_name(&self) -> &'static str {
		match self {
			Self::Light => "Light",
			Self::Dark => "Dark",
		}
	}

	pub fn as_icon_name(&self) -> &'static str {
		match self {
			Self::Light => "bi-sun-fill",
			Self::Dark => "bi-moon-fill",
		}
	}
}
